//! Conversion from calendar time to FIT timestamps

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Seconds between the Unix epoch and the FIT epoch (1989-12-31T00:00:00Z).
pub const FIT_EPOCH_OFFSET: i64 = 631_065_600;

#[derive(Error, Debug)]
pub enum TimestampError {
    #[error("Instant {0} predates the FIT epoch (1989-12-31T00:00:00Z)")]
    BeforeFitEpoch(DateTime<Utc>),
    #[error("Instant {0} is beyond the range of a FIT timestamp")]
    BeyondRepresentableRange(DateTime<Utc>),
}

/// Converts an absolute instant into whole seconds since the FIT epoch.
///
/// Sub-second precision is floored away; FIT timestamps are unsigned on the
/// wire, so instants before the epoch are rejected rather than encoded as
/// negative values.
pub fn to_fit_timestamp(instant: DateTime<Utc>) -> Result<u32, TimestampError> {
    let offset = instant.timestamp() - FIT_EPOCH_OFFSET;
    if offset < 0 {
        return Err(TimestampError::BeforeFitEpoch(instant));
    }
    u32::try_from(offset).map_err(|_| TimestampError::BeyondRepresentableRange(instant))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{to_fit_timestamp, TimestampError};

    #[test]
    fn fit_epoch_maps_to_zero() {
        let epoch = Utc.with_ymd_and_hms(1989, 12, 31, 0, 0, 0).unwrap();
        assert_eq!(0, to_fit_timestamp(epoch).unwrap());
    }

    #[test]
    fn pre_epoch_instant_is_rejected() {
        let instant = Utc.with_ymd_and_hms(1989, 12, 30, 23, 59, 59).unwrap();
        assert!(matches!(
            to_fit_timestamp(instant),
            Err(TimestampError::BeforeFitEpoch(_))
        ));
    }

    #[test]
    fn known_instant_converts() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        assert_eq!(1_073_037_600, to_fit_timestamp(instant).unwrap());
    }

    #[test]
    fn conversion_is_monotonic() {
        let instants = [
            Utc.with_ymd_and_hms(1989, 12, 31, 0, 0, 1).unwrap(),
            Utc.with_ymd_and_hms(1999, 6, 1, 12, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 1).unwrap(),
        ];
        let converted: Vec<_> = instants
            .iter()
            .map(|&instant| to_fit_timestamp(instant).unwrap())
            .collect();
        assert!(converted.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn sub_second_precision_floors() {
        let instant = Utc
            .with_ymd_and_hms(2024, 1, 1, 10, 0, 0)
            .unwrap()
            .checked_add_signed(chrono::Duration::milliseconds(900))
            .unwrap();
        assert_eq!(1_073_037_600, to_fit_timestamp(instant).unwrap());
    }
}
