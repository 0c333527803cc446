//! Link-layer packet header parsing.

use crate::error::{Error, Result};
use crate::slice_reader::SliceReader;
use modular_bitfield_msb::prelude::*;

/// TSC field found in a packet header.
#[repr(u8)]
#[derive(Debug, Eq, PartialEq, BitfieldSpecifier)]
#[bits = 2]
pub enum TransportScramblingControl {
    /// Not scrambled.
    NotScrambled,
    /// Do not use.
    Reserved,
    /// Scrambled with even key.
    ScrambledEvenKey,
    /// Scrambled with odd key.
    ScrambledOddKey,
}

/// Link-layer header found at the start of every 188-byte transport stream packet.
#[bitfield]
#[derive(Debug)]
pub struct PacketHeader {
    pub sync_byte: B8,
    pub tei: bool,
    pub pusi: bool,
    pub priority: bool,
    pub pid: B13,
    pub tsc: TransportScramblingControl,
    pub has_adaptation_field: bool,
    pub has_payload: bool,
    pub continuity_counter: B4,
}

/// Describes the adaptation field present at the front of the payload region, if any.
///
/// Only the length and flags byte are retained; PCR/OPCR extraction is out of scope.
#[bitfield]
#[derive(Debug)]
pub struct AdaptationFieldHeader {
    pub length: B8,
    pub discontinuity: bool,
    pub random_access: bool,
    pub priority: bool,
    pub has_pcr: bool,
    pub has_opcr: bool,
    pub has_splice_countdown: bool,
    pub has_transport_private_data: bool,
    pub has_adaptation_field_extension: bool,
}

/// Fully parsed packet: header plus whatever payload bytes follow the optional
/// adaptation field.
#[derive(Debug)]
pub struct Packet<'a> {
    /// Packet link-layer header.
    pub header: PacketHeader,
    /// Adaptation field's length and flags byte, if the packet carries one.
    pub adaptation_field_header: Option<AdaptationFieldHeader>,
    /// Payload bytes following the header and any adaptation field.
    pub payload: Option<&'a [u8]>,
}

/// Parse a single 188-byte transport stream packet.
///
/// Fails with [`Error::BadPacketSize`] if `packet` is not 188 bytes. The sync byte is
/// preserved in [`PacketHeader::sync_byte`] but not validated.
pub fn decode_packet(packet: &[u8]) -> Result<Packet<'_>> {
    if packet.len() != 188 {
        return Err(Error::BadPacketSize(packet.len()));
    }

    let mut reader = SliceReader::new(packet);
    let header = read_bitfield!(reader, PacketHeader);

    let mut adaptation_field_header = None;
    if header.has_adaptation_field() {
        let length = reader.read_u8()? as usize;
        if length > 0 {
            let mut af_reader = reader.new_sub_reader(length)?;
            let flags_byte = af_reader.read_u8()?;
            adaptation_field_header = Some(AdaptationFieldHeader::from_bytes([
                length as u8,
                flags_byte,
            ]));
            // Remaining adaptation-field bytes (PCR/OPCR/splice/private data/extension)
            // are out of scope and already skipped by new_sub_reader's advance of `length`.
        }
    }

    let payload = if header.has_payload() {
        Some(reader.read_to_end()?)
    } else {
        None
    };

    Ok(Packet {
        header,
        adaptation_field_header,
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packet_with(pid: u16, pusi: bool, payload_byte: u8) -> [u8; 188] {
        let mut p = [0xffu8; 188];
        p[0] = 0x47;
        p[1] = ((pusi as u8) << 6) | ((pid >> 8) as u8 & 0x1f);
        p[2] = (pid & 0xff) as u8;
        p[3] = 0x10; // no adaptation field, has payload, cc=0
        for b in p[4..].iter_mut() {
            *b = payload_byte;
        }
        p
    }

    #[test]
    fn roundtrips_header_fields() {
        let packet = packet_with(0x0100, true, 0xAB);
        let parsed = decode_packet(&packet).unwrap();
        assert_eq!(parsed.header.sync_byte(), 0x47);
        assert_eq!(parsed.header.pid(), 0x0100);
        assert!(parsed.header.pusi());
        assert!(parsed.header.has_payload());
        assert!(!parsed.header.has_adaptation_field());
        assert_eq!(parsed.payload.unwrap().len(), 184);
        assert_eq!(parsed.payload.unwrap()[0], 0xAB);
    }

    #[test]
    fn rejects_wrong_size() {
        let short = [0u8; 100];
        match decode_packet(&short) {
            Err(Error::BadPacketSize(100)) => {}
            other => panic!("expected BadPacketSize, got {:?}", other),
        }
    }

    #[test]
    fn skips_adaptation_field() {
        let mut p = [0xffu8; 188];
        p[0] = 0x47;
        p[1] = 0x01;
        p[2] = 0x00;
        p[3] = 0x30; // has_adaptation_field | has_payload
        p[4] = 5; // adaptation field length
        p[5] = 0x80; // discontinuity flag set
        let parsed = decode_packet(&p).unwrap();
        assert!(parsed.header.has_adaptation_field());
        let af = parsed.adaptation_field_header.unwrap();
        assert_eq!(af.length(), 5);
        assert!(af.discontinuity());
        // payload starts after length byte (1) + 5 adaptation bytes = 6 bytes consumed
        assert_eq!(parsed.payload.unwrap().len(), 188 - 4 - 6);
    }
}
