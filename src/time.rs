//! Modified Julian Date / BCD time and duration decoding for EIT events.

use crate::error::{Error, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};

/// UTC+9, the broadcast locale every decoded time is anchored to.
fn jst() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).expect("9 hours is a valid fixed offset")
}

fn bcd_to_decimal(byte: u8) -> u32 {
    ((byte >> 4) as u32) * 10 + (byte & 0x0F) as u32
}

/// Decode the 5-byte broadcast start time: 16-bit Modified Julian Date followed by
/// hour/minute/second BCD bytes.
pub fn decode_start_time(bytes: &[u8; 5]) -> Result<DateTime<FixedOffset>> {
    let mjd = u16::from_be_bytes([bytes[0], bytes[1]]) as f64;

    let y_prime = ((mjd - 15078.2) / 365.25).floor();
    let m_prime = ((mjd - 14956.1 - (y_prime * 365.25).floor()) / 30.6001).floor();
    let d = mjd - 14956.0 - (y_prime * 365.25).floor() - (m_prime * 30.6001).floor();
    let k = if m_prime == 14.0 || m_prime == 15.0 { 1.0 } else { 0.0 };
    let year = 1900.0 + y_prime + k;
    let month = m_prime - 1.0 - 12.0 * k;

    let date =
        NaiveDate::from_ymd_opt(year as i32, month as u32, d as u32).ok_or(Error::BadTime)?;

    let hour = bcd_to_decimal(bytes[2]);
    let minute = bcd_to_decimal(bytes[3]);
    let second = bcd_to_decimal(bytes[4]);
    let time = NaiveTime::from_hms_opt(hour, minute, second).ok_or(Error::BadTime)?;

    jst()
        .from_local_datetime(&date.and_time(time))
        .single()
        .ok_or(Error::BadTime)
}

/// Decode the 3-byte BCD duration; all-`0xFF` means "unknown" and resolves to zero.
pub fn decode_duration(bytes: &[u8; 3]) -> chrono::Duration {
    if *bytes == [0xFF, 0xFF, 0xFF] {
        return chrono::Duration::zero();
    }
    let hours = bcd_to_decimal(bytes[0]) as i64;
    let minutes = bcd_to_decimal(bytes[1]) as i64;
    let seconds = bcd_to_decimal(bytes[2]) as i64;
    chrono::Duration::seconds(hours * 3600 + minutes * 60 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_reference_timestamp() {
        // MJD 0xC958 = 51544 -> 2000-01-01, BCD 12:34:56
        let decoded = decode_start_time(&[0xC9, 0x58, 0x12, 0x34, 0x56]).unwrap();
        assert_eq!(decoded.naive_local().to_string(), "2000-01-01 12:34:56");
    }

    #[test]
    fn duration_ff_is_zero() {
        assert_eq!(decode_duration(&[0xFF, 0xFF, 0xFF]), chrono::Duration::zero());
    }

    #[test]
    fn duration_decodes_bcd() {
        assert_eq!(
            decode_duration(&[0x01, 0x30, 0x00]),
            chrono::Duration::hours(1) + chrono::Duration::minutes(30)
        );
    }
}
