//! Interface for encoding tracks as FIT activity files

use thiserror::Error;

use crate::{
    fit::writer::{EncodingError, FitOutputStream},
    messages::{build_messages, BuildError},
    track::Track,
};

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Track has no fixes")]
    EmptyTrack,
    #[error("Invalid track value: {0}")]
    Domain(String),
    #[error("Unencodable field value: {0}")]
    Encoding(String),
}

impl From<BuildError> for EncodeError {
    fn from(e: BuildError) -> Self {
        match e {
            BuildError::EmptyTrack => EncodeError::EmptyTrack,
            _ => EncodeError::Domain(e.to_string()),
        }
    }
}

impl From<EncodingError> for EncodeError {
    fn from(e: EncodingError) -> Self {
        EncodeError::Encoding(e.to_string())
    }
}

/// Converts a parsed track into a complete FIT activity file.
///
/// All-or-nothing: any failure aborts the conversion and yields no bytes,
/// so callers never see a partially written file.
pub fn convert_track_to_fit(track: &Track) -> Result<Vec<u8>, EncodeError> {
    let messages = build_messages(track)?;
    let mut stream = FitOutputStream::new();
    for message in &messages {
        stream.write_message(message)?;
    }
    Ok(stream.finalize())
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use crate::fit::reader::{read_fit, FieldValue};
    use crate::igc::parse_igc;
    use crate::test_resources::SAMPLE_FLIGHT_IGC;
    use crate::track::{Track, TrackFix};

    use super::{convert_track_to_fit, EncodeError};

    fn scenario_track() -> Track {
        Track {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            distance: None,
            fixes: vec![
                TrackFix {
                    time: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
                    latitude: 46.0,
                    longitude: 7.0,
                    gps_altitude: Some(1000.0),
                },
                TrackFix {
                    time: Utc.with_ymd_and_hms(2024, 1, 1, 10, 5, 0).unwrap(),
                    latitude: 46.01,
                    longitude: 7.01,
                    gps_altitude: Some(1100.0),
                },
            ],
        }
    }

    #[test]
    fn two_fix_flight_round_trips() {
        let bytes = convert_track_to_fit(&scenario_track()).unwrap();
        let messages = read_fit(&bytes).unwrap();

        // file_id, activity, session, lap, then one record per fix
        assert_eq!(
            vec![0u16, 34, 18, 19, 20, 20],
            messages
                .iter()
                .map(|message| message.global_mesg_num)
                .collect::<Vec<_>>()
        );

        let session = &messages[2];
        // 300 seconds, scaled to milliseconds on the wire
        assert_eq!(Some(FieldValue::Uint32(300_000)), session.field(7));
        assert_eq!(Some(FieldValue::Uint32(300_000)), session.field(8));
        assert_eq!(Some(FieldValue::Uint32(1_073_037_600)), session.field(2));
        assert_eq!(Some(FieldValue::Enum(20)), session.field(5));
        assert_eq!(Some(FieldValue::Enum(111)), session.field(6));
        assert_eq!(Some(FieldValue::Uint32(0)), session.field(9));

        let first_record = &messages[4];
        assert_eq!(
            Some(FieldValue::Sint32(548_801_377)),
            first_record.field(0)
        );
        assert_eq!(
            Some(FieldValue::Uint32(1_073_037_600)),
            first_record.field(253)
        );
        // 1000 m encodes as (1000 + 500) * 5
        assert_eq!(Some(FieldValue::Uint16(7_500)), first_record.field(2));
    }

    #[test]
    fn empty_track_produces_no_bytes() {
        let mut track = scenario_track();
        track.fixes.clear();
        assert!(matches!(
            convert_track_to_fit(&track),
            Err(EncodeError::EmptyTrack)
        ));
    }

    #[test]
    fn unsorted_track_is_a_domain_error() {
        let mut track = scenario_track();
        track.fixes.reverse();
        assert!(matches!(
            convert_track_to_fit(&track),
            Err(EncodeError::Domain(_))
        ));
    }

    #[test]
    fn pre_epoch_track_is_a_domain_error() {
        let mut track = scenario_track();
        track.fixes[0].time = Utc.with_ymd_and_hms(1985, 6, 1, 12, 0, 0).unwrap();
        track.fixes.truncate(1);
        assert!(matches!(
            convert_track_to_fit(&track),
            Err(EncodeError::Domain(_))
        ));
    }

    #[test]
    fn sample_igc_converts_end_to_end() {
        let track = parse_igc(SAMPLE_FLIGHT_IGC).unwrap();
        let bytes = convert_track_to_fit(&track).unwrap();
        let messages = read_fit(&bytes).unwrap();
        assert_eq!(4 + track.fixes.len(), messages.len());

        let session = &messages[2];
        let Some(FieldValue::Uint32(distance_cm)) = session.field(9) else {
            panic!("expected a session distance");
        };
        let expected_cm = (track.distance.unwrap() * 100.0).round() as u32;
        assert_eq!(expected_cm, distance_cm);
    }
}
