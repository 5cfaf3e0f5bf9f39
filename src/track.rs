//! Track data produced by log readers and consumed by the encoder

use chrono::{DateTime, NaiveDate, Utc};

/// One GPS sample from a flight log.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackFix {
    pub time: DateTime<Utc>,
    /// WGS84 latitude in decimal degrees, north positive.
    pub latitude: f64,
    /// WGS84 longitude in decimal degrees, east positive.
    pub longitude: f64,
    /// GPS altitude in meters; absent when the recorder had no 3D fix.
    pub gps_altitude: Option<f64>,
}

/// A complete flight: the fix sequence plus flight-level metadata.
///
/// Fixes are expected in ascending timestamp order; the encoder rejects
/// tracks that violate this.
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    /// Nominal flight date from the log header.
    pub date: NaiveDate,
    /// Total track distance in meters, when the reader computed one.
    pub distance: Option<f64>,
    pub fixes: Vec<TrackFix>,
}
