#![doc = include_str!("../readme.md")]
pub mod coordinates;
pub mod encode;
pub mod fit;
pub mod igc;
pub mod messages;
pub mod time;
pub mod track;

mod buffer_util;
mod crc;
mod magic_numbers;

#[cfg(test)]
mod test_resources;

pub use encode::convert_track_to_fit;
pub use igc::parse_igc;
pub use track::{Track, TrackFix};
