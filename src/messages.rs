//! Construction of the FIT message sequence for one flight
//!
//! Builds plain values only; the binary layout of each message lives in
//! [`crate::fit::writer`], so the sequence here can be inspected and tested
//! without any wire concerns.

use thiserror::Error;

use crate::{
    coordinates::{to_semicircles, CoordinateError},
    magic_numbers::{
        FILE_TYPE_ACTIVITY, MANUFACTURER_DEVELOPMENT, PLACEHOLDER_PRODUCT,
        PLACEHOLDER_SERIAL_NUMBER, SPORT_FLYING, SUB_SPORT_FLY_PARAGLIDE,
    },
    time::{to_fit_timestamp, TimestampError},
    track::Track,
};

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Track has no fixes")]
    EmptyTrack,
    #[error("Fix timestamps are not in ascending order")]
    FixesOutOfOrder,
    #[error(transparent)]
    Timestamp(#[from] TimestampError),
    #[error(transparent)]
    Coordinate(#[from] CoordinateError),
}

#[derive(Clone, Debug, PartialEq)]
pub struct FileId {
    pub file_type: u8,
    pub manufacturer: u16,
    pub product: u16,
    pub serial_number: u32,
    pub time_created: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Activity {
    pub timestamp: u32,
    /// Seconds, scaled to milliseconds on the wire.
    pub total_timer_time: f64,
    pub num_sessions: u16,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub message_index: u16,
    pub timestamp: u32,
    pub start_time: u32,
    pub total_elapsed_time: f64,
    pub total_timer_time: f64,
    /// Meters, scaled to centimeters on the wire.
    pub total_distance: f64,
    pub sport: u8,
    pub sub_sport: u8,
    pub first_lap_index: u16,
    pub num_laps: u16,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Lap {
    pub timestamp: u32,
    pub start_time: u32,
    pub total_elapsed_time: f64,
    pub total_distance: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub timestamp: u32,
    pub position_lat: i32,
    pub position_long: i32,
    /// Meters above mean sea level.
    pub altitude: f64,
}

/// One FIT message of the minimal activity-file set.
#[derive(Clone, Debug, PartialEq)]
pub enum FitMessage {
    FileId(FileId),
    Activity(Activity),
    Session(Session),
    Lap(Lap),
    Record(Record),
}

/// Transforms a track into the fixed message sequence of an activity file:
/// file_id, activity, session, lap, then one record per fix.
///
/// Readers resolve the session/lap bookkeeping from the file-scope messages,
/// so this order is part of the encoder's contract.
pub fn build_messages(track: &Track) -> Result<Vec<FitMessage>, BuildError> {
    let first = track.fixes.first().ok_or(BuildError::EmptyTrack)?;
    let last = track.fixes.last().ok_or(BuildError::EmptyTrack)?;
    if track.fixes.windows(2).any(|pair| pair[1].time < pair[0].time) {
        return Err(BuildError::FixesOutOfOrder);
    }

    let start_time = to_fit_timestamp(first.time)?;
    let end_time = to_fit_timestamp(last.time)?;
    let elapsed_seconds = (last.time - first.time).num_milliseconds() as f64 / 1000.0;
    let total_distance = track.distance.unwrap_or(0.0);

    let mut messages = Vec::with_capacity(track.fixes.len() + 4);
    messages.push(FitMessage::FileId(FileId {
        file_type: FILE_TYPE_ACTIVITY,
        manufacturer: MANUFACTURER_DEVELOPMENT,
        product: PLACEHOLDER_PRODUCT,
        serial_number: PLACEHOLDER_SERIAL_NUMBER,
        time_created: start_time,
    }));
    messages.push(FitMessage::Activity(Activity {
        timestamp: end_time,
        total_timer_time: elapsed_seconds,
        num_sessions: 1,
    }));
    messages.push(FitMessage::Session(Session {
        message_index: 0,
        timestamp: end_time,
        start_time,
        total_elapsed_time: elapsed_seconds,
        total_timer_time: elapsed_seconds,
        total_distance,
        sport: SPORT_FLYING,
        sub_sport: SUB_SPORT_FLY_PARAGLIDE,
        first_lap_index: 0,
        num_laps: 1,
    }));
    messages.push(FitMessage::Lap(Lap {
        timestamp: end_time,
        start_time,
        total_elapsed_time: elapsed_seconds,
        total_distance,
    }));
    for fix in &track.fixes {
        messages.push(FitMessage::Record(Record {
            timestamp: to_fit_timestamp(fix.time)?,
            position_lat: to_semicircles(fix.latitude)?,
            position_long: to_semicircles(fix.longitude)?,
            altitude: fix.gps_altitude.unwrap_or(0.0),
        }));
    }
    Ok(messages)
}
