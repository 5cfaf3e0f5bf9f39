//! Reading IGC flight logs into tracks
//!
//! IGC files are line-oriented ASCII. Only two record types matter for
//! conversion: the `HFDTE` header carrying the flight date, and `B` records
//! carrying one GPS fix each:
//!
//! ```text
//! B HHMMSS DDMMmmm[NS] DDDMMmmm[EW] V PPPPP GGGGG
//! ```
//!
//! where `MMmmm` is minutes in thousandths, `V` is `A` for a 3D fix, and
//! the two five-digit groups are pressure and GPS altitude in meters.
//! Everything else (task declarations, extensions, the security record) is
//! skipped.

use chrono::{Duration, NaiveDate, NaiveTime};
use thiserror::Error;

use crate::track::{Track, TrackFix};

#[derive(Error, Debug)]
pub enum IgcError {
    #[error("No HFDTE date header before the first fix")]
    MissingDateHeader,
    #[error("Malformed date header on line {line}")]
    InvalidDateHeader { line: usize },
    #[error("Malformed B record on line {line}")]
    InvalidRecord { line: usize },
}

/// Parses an IGC log into a track.
///
/// Fix times are combined with the header date; a time-of-day earlier than
/// its predecessor's means the flight crossed UTC midnight and rolls the
/// date forward. The track distance is the cumulative great-circle length
/// of the fix sequence.
pub fn parse_igc(text: &str) -> Result<Track, IgcError> {
    let mut date: Option<NaiveDate> = None;
    let mut day_offset: i64 = 0;
    let mut previous_time: Option<NaiveTime> = None;
    let mut fixes: Vec<TrackFix> = Vec::new();

    for (index, raw_line) in text.lines().enumerate() {
        let line_number = index + 1;
        let line = raw_line.trim_end_matches('\r');
        if line.starts_with("HFDTE") {
            date = Some(parse_date_header(line, line_number)?);
        } else if line.starts_with('B') {
            let flight_date = date.ok_or(IgcError::MissingDateHeader)?;
            let (time, latitude, longitude, gps_altitude) = parse_b_record(line, line_number)?;
            if previous_time.is_some_and(|previous| time < previous) {
                day_offset += 1;
            }
            previous_time = Some(time);
            let fix_date = flight_date + Duration::days(day_offset);
            fixes.push(TrackFix {
                time: fix_date.and_time(time).and_utc(),
                latitude,
                longitude,
                gps_altitude,
            });
        }
    }

    let date = date.ok_or(IgcError::MissingDateHeader)?;
    let distance = cumulative_distance(&fixes);
    Ok(Track {
        date,
        distance: Some(distance),
        fixes,
    })
}

/// Accepts both header shapes seen in the wild: `HFDTEddmmyy` and
/// `HFDTEDATE:ddmmyy,nn`.
fn parse_date_header(line: &str, line_number: usize) -> Result<NaiveDate, IgcError> {
    let invalid = || IgcError::InvalidDateHeader { line: line_number };
    let rest = &line[5..];
    let rest = rest.strip_prefix("DATE:").unwrap_or(rest);
    let digits = rest
        .get(..6)
        .filter(|digits| digits.bytes().all(|byte| byte.is_ascii_digit()))
        .ok_or_else(invalid)?;
    let day = parse_number(&digits[..2]).ok_or_else(invalid)?;
    let month = parse_number(&digits[2..4]).ok_or_else(invalid)?;
    let two_digit_year = parse_number(&digits[4..6]).ok_or_else(invalid)?;
    // GPS loggers postdate 1990, so a two-digit year pivots there
    let year = if two_digit_year >= 90 {
        1900 + two_digit_year
    } else {
        2000 + two_digit_year
    };
    NaiveDate::from_ymd_opt(year as i32, month, day).ok_or_else(invalid)
}

type ParsedFix = (NaiveTime, f64, f64, Option<f64>);

fn parse_b_record(line: &str, line_number: usize) -> Result<ParsedFix, IgcError> {
    let invalid = || IgcError::InvalidRecord { line: line_number };
    if !line.is_ascii() || line.len() < 35 {
        return Err(invalid());
    }

    let hours = parse_number(&line[1..3]).ok_or_else(invalid)?;
    let minutes = parse_number(&line[3..5]).ok_or_else(invalid)?;
    let seconds = parse_number(&line[5..7]).ok_or_else(invalid)?;
    let time = NaiveTime::from_hms_opt(hours, minutes, seconds).ok_or_else(invalid)?;

    let lat_degrees = parse_number(&line[7..9]).ok_or_else(invalid)?;
    let lat_milliminutes = parse_number(&line[9..14]).ok_or_else(invalid)?;
    let mut latitude = lat_degrees as f64 + lat_milliminutes as f64 / 1000.0 / 60.0;
    match &line[14..15] {
        "N" => {}
        "S" => latitude = -latitude,
        _ => return Err(invalid()),
    }

    let lon_degrees = parse_number(&line[15..18]).ok_or_else(invalid)?;
    let lon_milliminutes = parse_number(&line[18..23]).ok_or_else(invalid)?;
    let mut longitude = lon_degrees as f64 + lon_milliminutes as f64 / 1000.0 / 60.0;
    match &line[23..24] {
        "E" => {}
        "W" => longitude = -longitude,
        _ => return Err(invalid()),
    }

    let has_3d_fix = match &line[24..25] {
        "A" => true,
        "V" => false,
        _ => return Err(invalid()),
    };
    // pressure altitude in 25..30 is ignored; GPS altitude follows it
    let gps_altitude_meters: i32 = line[30..35].trim_start().parse().map_err(|_| invalid())?;
    let gps_altitude = has_3d_fix.then_some(gps_altitude_meters as f64);

    Ok((time, latitude, longitude, gps_altitude))
}

fn parse_number(digits: &str) -> Option<u32> {
    if digits.bytes().all(|byte| byte.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}

/// Sum of great-circle legs between consecutive fixes, in meters.
fn cumulative_distance(fixes: &[TrackFix]) -> f64 {
    fixes
        .windows(2)
        .map(|pair| {
            haversine_distance(
                pair[0].latitude,
                pair[0].longitude,
                pair[1].latitude,
                pair[1].longitude,
            )
        })
        .sum()
}

fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_METERS: f64 = 6_371_000.0;
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_METERS * c
}
