//! Program-Specific Information: common section header and the PAT/PMT/EIT parsers built on it.

pub mod descriptor;
pub mod eit;
pub mod pat;
pub mod pmt;

use crate::error::{Error, Result};
use crate::slice_reader::SliceReader;
use modular_bitfield_msb::prelude::*;

/// Common 3-byte PSI section header, present (after the pointer field) at the start of
/// every PAT/PMT/EIT section.
#[bitfield]
#[derive(Debug)]
pub struct PsiHeader {
    pub table_id: B8,
    pub section_syntax_indicator: bool,
    pub private_bit: bool,
    pub reserved_bits: B2,
    pub section_length: B12,
}

/// 5-byte table syntax section shared by PAT/PMT/EIT: an identifier, version/current-next,
/// and section numbering.
#[bitfield]
#[derive(Debug)]
pub struct PsiTableSyntax {
    pub table_id_extension: B16,
    pub reserved_bits: B2,
    pub version: B5,
    pub current_next_indicator: bool,
    pub section_num: B8,
    pub last_section_num: B8,
}

/// Fixed 8-byte header (common header + table syntax) plus a reader positioned at the
/// start of the table-specific body, truncated to exclude the trailing 4-byte CRC.
pub(crate) struct CommonHeader {
    pub header: PsiHeader,
    pub table_syntax: PsiTableSyntax,
    pub crc: [u8; 4],
}

/// Skip the pointer field and its padding, then parse the common header and table syntax,
/// returning a body reader truncated to `SectionLength - 5 - 4` bytes (body only, CRC
/// excluded) and the captured trailing CRC.
///
/// `SectionLength` names the number of bytes following the common header (including
/// the CRC), so the table-syntax and body together occupy `SectionLength` bytes and
/// the body alone occupies `SectionLength - 5 - 4`.
pub(crate) fn parse_common_header<'a>(
    section_bytes: &'a [u8],
) -> Result<(CommonHeader, SliceReader<'a>)> {
    let mut reader = SliceReader::new(section_bytes);
    if reader.remaining_len() < 1 {
        return Err(Error::BadCommonHeader);
    }
    let pointer_field = reader.read_u8()? as usize;
    reader.skip(pointer_field)?;

    if reader.remaining_len() < 3 {
        return Err(Error::BadCommonHeader);
    }
    let header = read_bitfield!(reader, PsiHeader);
    let section_length = header.section_length() as usize;

    if section_length < 5 + 4 {
        return Err(Error::TruncatedSection);
    }
    if reader.remaining_len() < section_length {
        return Err(Error::TruncatedSection);
    }

    let mut table_reader = reader.new_sub_reader(section_length)?;
    let table_syntax = read_bitfield!(table_reader, PsiTableSyntax);

    let body_length = section_length - 5 - 4;
    let body_reader = table_reader.new_sub_reader(body_length)?;
    let crc = *table_reader.read_array_ref::<4>()?;

    Ok((
        CommonHeader {
            header,
            table_syntax,
            crc,
        },
        body_reader,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_section(table_id: u8, body: &[u8]) -> Vec<u8> {
        let section_length = 5 + body.len() + 4;
        let mut bytes = vec![0u8]; // pointer field, no padding
        bytes.push(table_id);
        bytes.push(0x80 | (((section_length >> 8) & 0x0F) as u8));
        bytes.push((section_length & 0xff) as u8);
        bytes.extend_from_slice(&[0, 0, 0x01, 0, 0]); // table syntax: id_ext=0, version/cn, sec_num, last_sec_num
        bytes.extend_from_slice(body);
        bytes.extend_from_slice(&[0, 0, 0, 0]); // CRC placeholder
        bytes
    }

    #[test]
    fn parses_twelve_bit_section_length() {
        let body = [0xAAu8; 10];
        let section = build_section(0x02, &body);
        let (common, mut body_reader) = parse_common_header(&section).unwrap();
        assert_eq!(common.header.table_id(), 0x02);
        assert_eq!(body_reader.remaining_len(), 10);
        assert_eq!(body_reader.read(10).unwrap(), &body[..]);
    }

    #[test]
    fn section_length_above_ten_bits_is_supported() {
        // section_length = 1200 requires the 12th bit to be meaningful (10-bit max is 1023)
        let body = vec![0xBBu8; 1200 - 5 - 4];
        let section = build_section(0x02, &body);
        let (_common, body_reader) = parse_common_header(&section).unwrap();
        assert_eq!(body_reader.remaining_len(), body.len());
    }

    #[test]
    fn rejects_truncated_section() {
        let mut section = build_section(0x02, &[0xAAu8; 10]);
        section.truncate(section.len() - 1);
        match parse_common_header(&section) {
            Err(Error::TruncatedSection) => {}
            other => panic!("expected TruncatedSection, got {:?}", other),
        }
    }
}
