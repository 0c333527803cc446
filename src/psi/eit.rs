//! Event Information Table.

use super::descriptor::EitDescriptor;
use super::parse_common_header;
use crate::error::{Error, Result};
use crate::slice_reader::SliceReader;
use crate::time::{decode_duration, decode_start_time};
use chrono::{DateTime, Duration, FixedOffset};
use modular_bitfield_msb::prelude::*;

/// Fixed 2-byte header preceding one event's descriptor loop.
#[bitfield]
#[derive(Debug)]
pub struct EitEventHeader {
    pub event_id: B16,
}

/// 2-byte running-status/free-CA/descriptors-loop-length field that trails an event's
/// start time and duration.
#[bitfield]
#[derive(Debug)]
pub struct EitEventTrailer {
    pub running_status: B3,
    pub free_ca_mode: bool,
    pub descriptors_loop_length: B12,
}

/// One broadcast event inside an EIT section.
#[derive(Debug)]
pub struct EitEvent {
    /// Identifies this event within its service.
    pub event_id: u16,
    /// Broadcast start time, decoded from MJD/BCD and anchored to JST.
    pub start_time: DateTime<FixedOffset>,
    /// Scheduled event duration; zero if the original field was "unknown" (`0xFF` x3).
    pub duration: Duration,
    /// Running status of the event (not-running, starts-in-a-few-seconds, pausing, running, ...).
    pub running_status: u8,
    /// Whether the event is scrambled under a conditional-access system.
    pub free_ca_mode: bool,
    /// This event's descriptor loop.
    pub descriptors: Vec<EitDescriptor>,
}

/// Parsed Event Information Table section.
#[derive(Debug)]
pub struct Eit {
    /// Service (channel) this EIT section describes.
    pub service_id: u16,
    /// Table version, incremented whenever the section's contents change.
    pub version: u8,
    /// Whether this section is currently applicable (vs. a future version).
    pub current_next_indicator: bool,
    /// This section's index within the table.
    pub section_number: u8,
    /// Index of the final section carrying this service/table combination.
    pub last_section_number: u8,
    /// Transport stream carrying the service.
    pub transport_stream_id: u16,
    /// Network originating the service.
    pub original_network_id: u16,
    /// Index of the final section within this segment (three-hour EIT p/f window, or
    /// schedule segment).
    pub segment_last_section_number: u8,
    /// Table id of the last table needed to complete the full schedule.
    pub last_table_id: u8,
    /// Events carried by this section.
    pub events: Vec<EitEvent>,
    /// Trailing CRC-32, not independently verified.
    pub crc: [u8; 4],
}

impl Eit {
    pub(crate) fn parse(section_bytes: &[u8]) -> Result<Self> {
        let (common, mut body) = parse_common_header(section_bytes)?;

        let transport_stream_id = body.read_be_u16()?;
        let original_network_id = body.read_be_u16()?;
        let segment_last_section_number = body.read_u8()?;
        let last_table_id = body.read_u8()?;

        let mut events = Vec::new();
        while body.remaining_len() > 0 {
            events.push(parse_event(&mut body)?);
        }

        Ok(Eit {
            service_id: common.table_syntax.table_id_extension(),
            version: common.table_syntax.version(),
            current_next_indicator: common.table_syntax.current_next_indicator(),
            section_number: common.table_syntax.section_num(),
            last_section_number: common.table_syntax.last_section_num(),
            transport_stream_id,
            original_network_id,
            segment_last_section_number,
            last_table_id,
            events,
            crc: common.crc,
        })
    }
}

fn parse_event(body: &mut SliceReader) -> Result<EitEvent> {
    let header = read_bitfield!(body, EitEventHeader);
    let start_time_bytes = *body.read_array_ref::<5>()?;
    let duration_bytes = *body.read_array_ref::<3>()?;
    let trailer = read_bitfield!(body, EitEventTrailer);

    let mut descriptor_reader = body
        .new_sub_reader(trailer.descriptors_loop_length() as usize)
        .map_err(|_| Error::TruncatedSection)?;
    let mut descriptors = Vec::new();
    while descriptor_reader.remaining_len() > 0 {
        descriptors.push(EitDescriptor::new_from_reader(&mut descriptor_reader)?);
    }

    Ok(EitEvent {
        event_id: header.event_id(),
        start_time: decode_start_time(&start_time_bytes)?,
        duration: decode_duration(&duration_bytes),
        running_status: trailer.running_status(),
        free_ca_mode: trailer.free_ca_mode(),
        descriptors,
    })
}
