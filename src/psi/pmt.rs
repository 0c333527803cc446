//! Program Map Table.

use super::descriptor::Descriptor;
use super::parse_common_header;
use crate::error::{Error, Result};
use modular_bitfield_msb::prelude::*;
use smallvec::SmallVec;

/// Fixed 4-byte header preceding a PMT's program descriptor loop.
#[bitfield]
#[derive(Debug)]
pub struct PmtHeader {
    pub reserved: B3,
    pub pcr_pid: B13,
    pub reserved2: B4,
    pub program_info_length: B12,
}

/// Fixed 5-byte header preceding one elementary stream's ES descriptor loop.
#[bitfield]
#[derive(Debug)]
pub struct ElementaryStreamInfoHeader {
    pub stream_type: B8,
    pub reserved: B3,
    pub elementary_pid: B13,
    pub reserved2: B4,
    pub es_info_length: B12,
}

/// One entry of the PMT's elementary stream loop (ISO/IEC 13818-1 §2.4.4.8).
#[derive(Debug)]
pub struct ElementaryStreamInfo {
    /// Stream type, PID and descriptor-loop length for this elementary stream.
    pub header: ElementaryStreamInfoHeader,
    /// This elementary stream's own descriptor loop.
    pub es_descriptors: SmallVec<[Descriptor; 4]>,
}

/// Parsed Program Map Table.
#[derive(Debug)]
pub struct Pmt {
    /// Program this PMT describes.
    pub program_number: u16,
    /// Table version, incremented whenever the PMT's contents change.
    pub version: u8,
    /// Whether this section is currently applicable (vs. a future version).
    pub current_next_indicator: bool,
    /// This section's index within a multi-section PMT.
    pub section_number: u8,
    /// Index of the final section of this PMT.
    pub last_section_number: u8,
    /// PCR PID and program-descriptor-loop length.
    pub header: PmtHeader,
    /// Program-level descriptor loop.
    pub program_descriptors: Vec<Descriptor>,
    /// One entry per elementary stream carried by this program.
    pub es_infos: Vec<ElementaryStreamInfo>,
    /// Trailing CRC-32, not independently verified.
    pub crc: [u8; 4],
}

impl Pmt {
    pub(crate) fn parse(section_bytes: &[u8]) -> Result<Self> {
        let (common, mut body) = parse_common_header(section_bytes)?;
        let header = read_bitfield!(body, PmtHeader);

        let mut program_descriptors = Vec::new();
        let mut info_reader = body
            .new_sub_reader(header.program_info_length() as usize)
            .map_err(|_| Error::TruncatedSection)?;
        while info_reader.remaining_len() > 0 {
            program_descriptors.push(Descriptor::new_from_reader(&mut info_reader)?);
        }

        // Elementary stream loop runs until the (already CRC-truncated) body reader is
        // exhausted, which structurally prevents reading into the CRC region.
        let mut es_infos = Vec::new();
        while body.remaining_len() > 0 {
            let es_header = read_bitfield!(body, ElementaryStreamInfoHeader);
            let mut es_reader = body
                .new_sub_reader(es_header.es_info_length() as usize)
                .map_err(|_| Error::TruncatedSection)?;
            let mut es_descriptors = SmallVec::new();
            while es_reader.remaining_len() > 0 {
                es_descriptors.push(Descriptor::new_from_reader(&mut es_reader)?);
            }
            es_infos.push(ElementaryStreamInfo {
                header: es_header,
                es_descriptors,
            });
        }

        Ok(Pmt {
            program_number: common.table_syntax.table_id_extension(),
            version: common.table_syntax.version(),
            current_next_indicator: common.table_syntax.current_next_indicator(),
            section_number: common.table_syntax.section_num(),
            last_section_number: common.table_syntax.last_section_num(),
            header,
            program_descriptors,
            es_infos,
            crc: common.crc,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_pmt_section(pcr_pid: u16, es: &[(u8, u16)]) -> Vec<u8> {
        let mut body = Vec::new();
        body.push(0xE0 | ((pcr_pid >> 8) as u8 & 0x1F));
        body.push((pcr_pid & 0xff) as u8);
        body.push(0xF0); // program_info_length = 0
        body.push(0x00);
        for (stream_type, pid) in es {
            body.push(*stream_type);
            body.push(0xE0 | ((pid >> 8) as u8 & 0x1F));
            body.push((pid & 0xff) as u8);
            body.push(0xF0); // es_info_length = 0
            body.push(0x00);
        }

        let section_length = 5 + body.len() + 4;
        let mut bytes = vec![0u8];
        bytes.push(0x02); // table_id = PMT
        bytes.push(0x80 | (((section_length >> 8) & 0x0F) as u8));
        bytes.push((section_length & 0xff) as u8);
        bytes.extend_from_slice(&[0x00, 0x01]); // program_number
        bytes.push(0x01);
        bytes.push(0x00);
        bytes.push(0x00);
        bytes.extend_from_slice(&body);
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        bytes
    }

    #[test]
    fn parses_elementary_stream_loop() {
        let section = build_pmt_section(0x0101, &[(0x02, 0x0102), (0x0F, 0x0103)]);
        let pmt = Pmt::parse(&section).unwrap();
        assert_eq!(pmt.header.pcr_pid(), 0x0101);
        assert_eq!(pmt.es_infos.len(), 2);
        assert_eq!(pmt.es_infos[0].header.stream_type(), 0x02);
        assert_eq!(pmt.es_infos[0].header.elementary_pid(), 0x0102);
        assert_eq!(pmt.es_infos[1].header.elementary_pid(), 0x0103);
    }

    #[test]
    fn does_not_overread_into_crc() {
        let section = build_pmt_section(0x0101, &[(0x02, 0x0102)]);
        let pmt = Pmt::parse(&section).unwrap();
        assert_eq!(pmt.crc, [0, 0, 0, 0]);
    }

    #[test]
    fn oversized_program_info_length_is_truncated_section() {
        // program_info_length declares 10 bytes but the body only carries 0.
        let mut body = vec![0xE0, 0x01, 0xF0 | 0x00, 0x0A];
        let section_length = 5 + body.len() + 4;
        let mut bytes = vec![0u8];
        bytes.push(0x02);
        bytes.push(0x80 | (((section_length >> 8) & 0x0F) as u8));
        bytes.push((section_length & 0xff) as u8);
        bytes.extend_from_slice(&[0x00, 0x01]);
        bytes.push(0x01);
        bytes.push(0x00);
        bytes.push(0x00);
        bytes.append(&mut body);
        bytes.extend_from_slice(&[0, 0, 0, 0]);

        match Pmt::parse(&bytes) {
            Err(Error::TruncatedSection) => {}
            other => panic!("expected TruncatedSection, got {:?}", other),
        }
    }
}
