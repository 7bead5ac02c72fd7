//! UTC ↔ ephemeris-time conversion for the analytical provider.
//!
//! ET is approximated as TT (TDB − TT stays below 2 ms); UTC → TT uses the
//! leap-second table below plus the fixed 32.184 s TT − TAI offset.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::EphemerisError;

const TT_MINUS_TAI_S: f64 = 32.184;
/// Unix timestamp of 2000-01-01T12:00:00 UTC.
const J2000_UNIX_S: i64 = 946_728_000;

/// (year, month, TAI − UTC) effective from the first day of that month.
const LEAP_SECONDS: &[(i32, u32, f64)] = &[
    (1972, 1, 10.0),
    (1972, 7, 11.0),
    (1973, 1, 12.0),
    (1974, 1, 13.0),
    (1975, 1, 14.0),
    (1976, 1, 15.0),
    (1977, 1, 16.0),
    (1978, 1, 17.0),
    (1979, 1, 18.0),
    (1980, 1, 19.0),
    (1981, 7, 20.0),
    (1982, 7, 21.0),
    (1983, 7, 22.0),
    (1985, 7, 23.0),
    (1988, 1, 24.0),
    (1990, 1, 25.0),
    (1991, 1, 26.0),
    (1992, 7, 27.0),
    (1993, 7, 28.0),
    (1994, 7, 29.0),
    (1996, 1, 30.0),
    (1997, 7, 31.0),
    (1999, 1, 32.0),
    (2006, 1, 33.0),
    (2009, 1, 34.0),
    (2012, 7, 35.0),
    (2015, 7, 36.0),
    (2017, 1, 37.0),
];

const PARSE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"];

fn tai_minus_utc(utc: &NaiveDateTime) -> Option<f64> {
    let date = utc.date();
    LEAP_SECONDS
        .iter()
        .rev()
        .find(|(year, month, _)| {
            NaiveDate::from_ymd_opt(*year, *month, 1).is_some_and(|start| date >= start)
        })
        .map(|(_, _, offset)| *offset)
}

fn utc_seconds_past_j2000(utc: &NaiveDateTime) -> f64 {
    let stamp = utc.and_utc();
    (stamp.timestamp() - J2000_UNIX_S) as f64 + f64::from(stamp.timestamp_subsec_nanos()) * 1e-9
}

/// Parse an already-normalised `YYYY-MM-DD HH:MM[:SS[.fff]]` (or bare date) UTC string.
pub fn parse_utc(text: &str) -> Result<NaiveDateTime, EphemerisError> {
    let text = text.trim();
    for format in PARSE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(parsed);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| EphemerisError::InvalidEpoch {
            epoch: text.to_string(),
        })
}

/// Convert a UTC calendar instant to ephemeris seconds past J2000.
pub fn utc_to_et(utc: &NaiveDateTime) -> Result<f64, EphemerisError> {
    let leap = tai_minus_utc(utc).ok_or_else(|| EphemerisError::InvalidEpoch {
        epoch: format!("{utc} (UTC before 1972 is not supported)"),
    })?;
    Ok(utc_seconds_past_j2000(utc) + leap + TT_MINUS_TAI_S)
}

/// Convert ephemeris seconds past J2000 back to a UTC calendar instant.
pub fn et_to_utc(et: f64) -> Result<NaiveDateTime, EphemerisError> {
    let invalid = || EphemerisError::InvalidEpoch {
        epoch: format!("ET {et}"),
    };
    if !et.is_finite() {
        return Err(invalid());
    }
    // Two passes settle the leap-second lookup near boundaries.
    let mut offset = 37.0 + TT_MINUS_TAI_S;
    let mut utc = from_utc_seconds(et - offset).ok_or_else(invalid)?;
    for _ in 0..2 {
        offset = tai_minus_utc(&utc).ok_or_else(invalid)? + TT_MINUS_TAI_S;
        utc = from_utc_seconds(et - offset).ok_or_else(invalid)?;
    }
    Ok(utc)
}

/// UTC seconds past J2000 (UT1 ≈ UTC) for an ephemeris time.
pub fn et_to_utc_seconds(et: f64) -> Result<f64, EphemerisError> {
    et_to_utc(et).map(|utc| utc_seconds_past_j2000(&utc))
}

/// ISO-8601 calendar string with millisecond precision (`YYYY-MM-DDTHH:MM:SS.sss`).
pub fn format_iso(et: f64) -> Result<String, EphemerisError> {
    Ok(et_to_utc(et)?.format("%Y-%m-%dT%H:%M:%S%.3f").to_string())
}

fn from_utc_seconds(seconds: f64) -> Option<NaiveDateTime> {
    // Microsecond rounding absorbs the float residue left by the ET offset.
    let micros = (seconds * 1e6).round();
    if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_micros(micros as i64 + J2000_UNIX_S * 1_000_000)
        .map(|dt| dt.naive_utc())
}
