// Four-fix flight near Sion, Switzerland, in the shape written by common
// paraglider flight recorders (header records, one extension record, fixes,
// a comment, and a security record).
pub const SAMPLE_FLIGHT_IGC: &str = include_str!("./sample-flight.igc");
