//! Clients send and display send times as `"YYYY-MM-DD HH:mm:ss"` strings in
//! Korea Standard Time. KST is a fixed +9h offset from UTC with no DST, so no
//! timezone database is consulted; all conversions between the civil strings
//! and absolute instants happen in this module to keep the local-time
//! contract auditable in one place.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

pub const KST_UTC_OFFSET_MILLIS: i64 = 9 * 60 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("Invalid KST datetime string: `{0}`")]
    InvalidDateTime(String),
}

/// Parses a KST civil time string into UTC epoch milliseconds.
///
/// The input must match `YYYY-MM-DD HH:mm:ss` exactly (a `T` separator is
/// also accepted): zero-padded fields, 19 characters, and every field within
/// calendar/clock range. `"2025-13-40 99:99:99"` is a `FormatError`, never a
/// silently wrong instant.
pub fn parse_kst_string(datetime: &str) -> Result<i64, FormatError> {
    let invalid = || FormatError::InvalidDateTime(datetime.to_string());

    if !has_kst_shape(datetime) {
        return Err(invalid());
    }

    let year = datetime[0..4].parse::<i32>().map_err(|_| invalid())?;
    let month = datetime[5..7].parse::<u32>().map_err(|_| invalid())?;
    let day = datetime[8..10].parse::<u32>().map_err(|_| invalid())?;
    let hour = datetime[11..13].parse::<u32>().map_err(|_| invalid())?;
    let minute = datetime[14..16].parse::<u32>().map_err(|_| invalid())?;
    let second = datetime[17..19].parse::<u32>().map_err(|_| invalid())?;

    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;
    let time = NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(invalid)?;
    let civil = NaiveDateTime::new(date, time);

    Ok(civil.and_utc().timestamp_millis() - KST_UTC_OFFSET_MILLIS)
}

/// Formats UTC epoch milliseconds as a KST civil time string, the inverse of
/// [`parse_kst_string`] at second resolution. Fields are always zero-padded.
pub fn format_kst_string(ts_millis: i64) -> String {
    let kst = chrono::DateTime::from_timestamp_millis(ts_millis + KST_UTC_OFFSET_MILLIS)
        .expect("timestamp within chrono range");
    kst.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn has_kst_shape(datetime: &str) -> bool {
    let bytes = datetime.as_bytes();
    if bytes.len() != 19 {
        return false;
    }
    bytes.iter().enumerate().all(|(i, &c)| match i {
        4 | 7 => c == b'-',
        10 => c == b' ' || c == b'T',
        13 | 16 => c == b':',
        _ => c.is_ascii_digit(),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn converts_kst_civil_time_to_utc_instant() {
        // 08:00 KST is 23:00 UTC the previous day
        let expected = Utc
            .with_ymd_and_hms(2025, 2, 28, 23, 0, 0)
            .unwrap()
            .timestamp_millis();
        assert_eq!(parse_kst_string("2025-03-01 08:00:00"), Ok(expected));
    }

    #[test]
    fn accepts_t_separated_strings() {
        assert_eq!(
            parse_kst_string("2025-03-01T08:00:00"),
            parse_kst_string("2025-03-01 08:00:00")
        );
    }

    #[test]
    fn round_trips_valid_strings() {
        let strings = vec![
            "2025-08-10 15:20:54",
            "2025-01-01 00:00:00",
            "2024-02-29 23:59:59",
            "1999-12-31 09:05:01",
        ];
        for s in strings {
            let instant = parse_kst_string(s).unwrap();
            assert_eq!(format_kst_string(instant), s);
        }
    }

    #[test]
    fn round_trips_instants_at_second_resolution() {
        let instant = Utc
            .with_ymd_and_hms(2025, 8, 10, 6, 20, 54)
            .unwrap()
            .timestamp_millis();
        assert_eq!(parse_kst_string(&format_kst_string(instant)), Ok(instant));
    }

    #[test]
    fn rejects_out_of_range_fields() {
        let malformed = vec![
            "2025-13-40 99:99:99",
            "2025-00-01 08:00:00",
            "2025-02-30 08:00:00",
            "2025-03-01 24:00:00",
            "2025-03-01 08:60:00",
        ];
        for s in malformed {
            assert_eq!(
                parse_kst_string(s),
                Err(FormatError::InvalidDateTime(s.to_string()))
            );
        }
    }

    #[test]
    fn rejects_malformed_strings() {
        let malformed = vec![
            "not-a-date",
            "",
            "2025-03-01",
            "2025-3-1 08:00:00",
            "2025-03-01 08:00",
            "2025-03-01 08:00:00.000",
            "2025/03/01 08:00:00",
            "2025-03-01_08:00:00",
        ];
        for s in malformed {
            assert!(parse_kst_string(s).is_err(), "accepted: {}", s);
        }
    }

    #[test]
    fn formats_with_zero_padded_fields() {
        let instant = parse_kst_string("2025-01-02 03:04:05").unwrap();
        assert_eq!(format_kst_string(instant), "2025-01-02 03:04:05");
    }
}
