//! Program Association Table.

use super::parse_common_header;
use crate::error::Result;
use crate::slice_reader::SliceReader;
use modular_bitfield_msb::prelude::*;

/// One program association: a program number and the PID carrying its PMT (or, for
/// program number 0, the network information PID).
#[bitfield]
#[derive(Debug, Clone, Copy)]
pub struct PatEntry {
    pub program_num: B16,
    pub reserved: B3,
    pub program_map_pid: B13,
}

/// Parsed Program Association Table.
#[derive(Debug)]
pub struct Pat {
    /// Identifies the transport stream this PAT describes.
    pub transport_stream_id: u16,
    /// Table version, incremented whenever the PAT's contents change.
    pub version: u8,
    /// Whether this section is currently applicable (vs. a future version).
    pub current_next_indicator: bool,
    /// This section's index within a multi-section PAT.
    pub section_number: u8,
    /// Index of the final section of this PAT.
    pub last_section_number: u8,
    /// Program associations carried by this section.
    pub entries: Vec<PatEntry>,
    /// Trailing CRC-32, not independently verified.
    pub crc: [u8; 4],
}

impl Pat {
    /// Parse a reassembled PAT section.
    ///
    /// For every program association with a non-zero program number, its PID is pushed
    /// to `new_pmt_pids` so the caller (the dispatch table) can register it as a PMT
    /// parser. Program number 0 names the network PID and is never registered.
    pub(crate) fn parse(section_bytes: &[u8], new_pmt_pids: &mut Vec<u16>) -> Result<Self> {
        let (common, mut body) = parse_common_header(section_bytes)?;
        let mut entries = Vec::with_capacity(body.remaining_len() / 4);
        while body.remaining_len() >= 4 {
            let entry = read_bitfield!(body, PatEntry);
            if entry.program_num() != 0 {
                new_pmt_pids.push(entry.program_map_pid());
            }
            entries.push(entry);
        }

        Ok(Pat {
            transport_stream_id: common.table_syntax.table_id_extension(),
            version: common.table_syntax.version(),
            current_next_indicator: common.table_syntax.current_next_indicator(),
            section_number: common.table_syntax.section_num(),
            last_section_number: common.table_syntax.last_section_num(),
            entries,
            crc: common.crc,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_pat_section(entries: &[(u16, u16)]) -> Vec<u8> {
        let body_len = entries.len() * 4;
        let section_length = 5 + body_len + 4;
        let mut bytes = vec![0u8]; // pointer field
        bytes.push(0x00); // table_id = PAT
        bytes.push(0x80 | (((section_length >> 8) & 0x0F) as u8));
        bytes.push((section_length & 0xff) as u8);
        bytes.extend_from_slice(&[0x00, 0x01]); // transport_stream_id
        bytes.push(0x01); // version/current_next
        bytes.push(0x00); // section_num
        bytes.push(0x00); // last_section_num
        for (program_number, pid) in entries {
            bytes.push((program_number >> 8) as u8);
            bytes.push((program_number & 0xff) as u8);
            bytes.push(0xE0 | ((pid >> 8) as u8 & 0x1F));
            bytes.push((pid & 0xff) as u8);
        }
        bytes.extend_from_slice(&[0, 0, 0, 0]); // CRC
        bytes
    }

    #[test]
    fn registers_nonzero_program_pids() {
        let section = build_pat_section(&[(0x0000, 0x0010), (0x0001, 0x0100)]);
        let mut new_pids = Vec::new();
        let pat = Pat::parse(&section, &mut new_pids).unwrap();
        assert_eq!(pat.entries.len(), 2);
        assert_eq!(new_pids, vec![0x0100]);
        assert_eq!(pat.transport_stream_id, 0x0001);
    }
}
