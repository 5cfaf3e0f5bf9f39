//! Serialization of FIT messages into the binary container
//!
//! A stream moves through header placeholder, interleaved definition and
//! data records, and a finalization step that patches the header and
//! appends the file checksum. `finalize` consumes the stream, so writing
//! after finalization does not compile.

use bytes::BufMut;
use thiserror::Error;

use crate::{
    crc,
    magic_numbers::{
        FILE_HEADER_SIZE, MESG_NUM_ACTIVITY, MESG_NUM_FILE_ID, MESG_NUM_LAP, MESG_NUM_RECORD,
        MESG_NUM_SESSION,
    },
    messages::FitMessage,
};

use super::{header::FitFileHeader, BaseType, FieldDef};

#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("Field {field} value {value} does not fit its declared wire type")]
    ValueOutOfRange { field: &'static str, value: f64 },
}

const DEFINITION_FLAG: u8 = 0x40;
const ARCHITECTURE_LITTLE_ENDIAN: u8 = 0;

// each message kind keeps its own local message type, so one definition
// record per kind covers the whole file
const LOCAL_FILE_ID: u8 = 0;
const LOCAL_ACTIVITY: u8 = 1;
const LOCAL_SESSION: u8 = 2;
const LOCAL_LAP: u8 = 3;
const LOCAL_RECORD: u8 = 4;
const NUM_LOCAL_TYPES: usize = 5;

// scale/offset pairs from the activity-file profile
const SECONDS_TO_MILLISECONDS: f64 = 1000.0;
const METERS_TO_CENTIMETERS: f64 = 100.0;
const ALTITUDE_SCALE: f64 = 5.0;
const ALTITUDE_OFFSET: f64 = 500.0;

const FILE_ID_LAYOUT: &[FieldDef] = &[
    FieldDef { number: 0, base_type: BaseType::Enum },    // type
    FieldDef { number: 1, base_type: BaseType::Uint16 },  // manufacturer
    FieldDef { number: 2, base_type: BaseType::Uint16 },  // product
    FieldDef { number: 3, base_type: BaseType::Uint32z }, // serial_number
    FieldDef { number: 4, base_type: BaseType::Uint32 },  // time_created
];

const ACTIVITY_LAYOUT: &[FieldDef] = &[
    FieldDef { number: 253, base_type: BaseType::Uint32 }, // timestamp
    FieldDef { number: 0, base_type: BaseType::Uint32 },   // total_timer_time
    FieldDef { number: 1, base_type: BaseType::Uint16 },   // num_sessions
];

const SESSION_LAYOUT: &[FieldDef] = &[
    FieldDef { number: 254, base_type: BaseType::Uint16 }, // message_index
    FieldDef { number: 253, base_type: BaseType::Uint32 }, // timestamp
    FieldDef { number: 2, base_type: BaseType::Uint32 },   // start_time
    FieldDef { number: 7, base_type: BaseType::Uint32 },   // total_elapsed_time
    FieldDef { number: 8, base_type: BaseType::Uint32 },   // total_timer_time
    FieldDef { number: 9, base_type: BaseType::Uint32 },   // total_distance
    FieldDef { number: 5, base_type: BaseType::Enum },     // sport
    FieldDef { number: 6, base_type: BaseType::Enum },     // sub_sport
    FieldDef { number: 25, base_type: BaseType::Uint16 },  // first_lap_index
    FieldDef { number: 26, base_type: BaseType::Uint16 },  // num_laps
];

const LAP_LAYOUT: &[FieldDef] = &[
    FieldDef { number: 253, base_type: BaseType::Uint32 }, // timestamp
    FieldDef { number: 2, base_type: BaseType::Uint32 },   // start_time
    FieldDef { number: 7, base_type: BaseType::Uint32 },   // total_elapsed_time
    FieldDef { number: 9, base_type: BaseType::Uint32 },   // total_distance
];

const RECORD_LAYOUT: &[FieldDef] = &[
    FieldDef { number: 253, base_type: BaseType::Uint32 }, // timestamp
    FieldDef { number: 0, base_type: BaseType::Sint32 },   // position_lat
    FieldDef { number: 1, base_type: BaseType::Sint32 },   // position_long
    FieldDef { number: 2, base_type: BaseType::Uint16 },   // altitude
];

fn wire_shape(message: &FitMessage) -> (u16, u8, &'static [FieldDef]) {
    match message {
        FitMessage::FileId(_) => (MESG_NUM_FILE_ID, LOCAL_FILE_ID, FILE_ID_LAYOUT),
        FitMessage::Activity(_) => (MESG_NUM_ACTIVITY, LOCAL_ACTIVITY, ACTIVITY_LAYOUT),
        FitMessage::Session(_) => (MESG_NUM_SESSION, LOCAL_SESSION, SESSION_LAYOUT),
        FitMessage::Lap(_) => (MESG_NUM_LAP, LOCAL_LAP, LAP_LAYOUT),
        FitMessage::Record(_) => (MESG_NUM_RECORD, LOCAL_RECORD, RECORD_LAYOUT),
    }
}

fn data_length(layout: &[FieldDef]) -> usize {
    layout
        .iter()
        .map(|field| field.base_type.size() as usize)
        .sum()
}

fn scaled_u32(field: &'static str, value: f64, scale: f64) -> Result<u32, EncodingError> {
    let scaled = (value * scale).round();
    if scaled.is_finite() && (0.0..=u32::MAX as f64).contains(&scaled) {
        Ok(scaled as u32)
    } else {
        Err(EncodingError::ValueOutOfRange { field, value })
    }
}

fn scaled_altitude(field: &'static str, meters: f64) -> Result<u16, EncodingError> {
    let scaled = ((meters + ALTITUDE_OFFSET) * ALTITUDE_SCALE).round();
    if scaled.is_finite() && (0.0..=u16::MAX as f64).contains(&scaled) {
        Ok(scaled as u16)
    } else {
        Err(EncodingError::ValueOutOfRange {
            field,
            value: meters,
        })
    }
}

/// Writes field values in the exact order the matching layout declares.
/// Scaled values are range-checked before anything is written, so a failed
/// message leaves the record body untouched.
fn put_data_fields(message: &FitMessage, buffer: &mut Vec<u8>) -> Result<(), EncodingError> {
    match message {
        FitMessage::FileId(file_id) => {
            buffer.put_u8(file_id.file_type);
            buffer.put_u16_le(file_id.manufacturer);
            buffer.put_u16_le(file_id.product);
            buffer.put_u32_le(file_id.serial_number);
            buffer.put_u32_le(file_id.time_created);
        }
        FitMessage::Activity(activity) => {
            let timer_time = scaled_u32(
                "activity.total_timer_time",
                activity.total_timer_time,
                SECONDS_TO_MILLISECONDS,
            )?;
            buffer.put_u32_le(activity.timestamp);
            buffer.put_u32_le(timer_time);
            buffer.put_u16_le(activity.num_sessions);
        }
        FitMessage::Session(session) => {
            let elapsed_time = scaled_u32(
                "session.total_elapsed_time",
                session.total_elapsed_time,
                SECONDS_TO_MILLISECONDS,
            )?;
            let timer_time = scaled_u32(
                "session.total_timer_time",
                session.total_timer_time,
                SECONDS_TO_MILLISECONDS,
            )?;
            let distance = scaled_u32(
                "session.total_distance",
                session.total_distance,
                METERS_TO_CENTIMETERS,
            )?;
            buffer.put_u16_le(session.message_index);
            buffer.put_u32_le(session.timestamp);
            buffer.put_u32_le(session.start_time);
            buffer.put_u32_le(elapsed_time);
            buffer.put_u32_le(timer_time);
            buffer.put_u32_le(distance);
            buffer.put_u8(session.sport);
            buffer.put_u8(session.sub_sport);
            buffer.put_u16_le(session.first_lap_index);
            buffer.put_u16_le(session.num_laps);
        }
        FitMessage::Lap(lap) => {
            let elapsed_time = scaled_u32(
                "lap.total_elapsed_time",
                lap.total_elapsed_time,
                SECONDS_TO_MILLISECONDS,
            )?;
            let distance = scaled_u32(
                "lap.total_distance",
                lap.total_distance,
                METERS_TO_CENTIMETERS,
            )?;
            buffer.put_u32_le(lap.timestamp);
            buffer.put_u32_le(lap.start_time);
            buffer.put_u32_le(elapsed_time);
            buffer.put_u32_le(distance);
        }
        FitMessage::Record(record) => {
            let altitude = scaled_altitude("record.altitude", record.altitude)?;
            buffer.put_u32_le(record.timestamp);
            buffer.put_i32_le(record.position_lat);
            buffer.put_i32_le(record.position_long);
            buffer.put_u16_le(altitude);
        }
    }
    Ok(())
}

/// An in-memory FIT file under construction.
pub struct FitOutputStream {
    buffer: Vec<u8>,
    defined: [bool; NUM_LOCAL_TYPES],
}

impl FitOutputStream {
    /// Opens a stream with a placeholder header; the real data size is
    /// patched in by [`FitOutputStream::finalize`].
    pub fn new() -> Self {
        let mut buffer = Vec::with_capacity(1024);
        FitFileHeader::with_data_size(0).write_to_buf(&mut buffer);
        Self {
            buffer,
            defined: [false; NUM_LOCAL_TYPES],
        }
    }

    /// Appends one message, preceded by a definition record the first time
    /// its kind appears. The message builder never changes a kind's field
    /// layout within one file, so a single definition per kind is enough.
    pub fn write_message(&mut self, message: &FitMessage) -> Result<(), EncodingError> {
        let (global_mesg_num, local_type, layout) = wire_shape(message);
        if !self.defined[local_type as usize] {
            self.put_definition(local_type, global_mesg_num, layout);
            self.defined[local_type as usize] = true;
        }
        self.buffer.put_u8(local_type);
        let body_start = self.buffer.len();
        put_data_fields(message, &mut self.buffer)?;
        debug_assert_eq!(data_length(layout), self.buffer.len() - body_start);
        Ok(())
    }

    fn put_definition(&mut self, local_type: u8, global_mesg_num: u16, layout: &[FieldDef]) {
        self.buffer.put_u8(DEFINITION_FLAG | local_type);
        self.buffer.put_u8(0); // reserved
        self.buffer.put_u8(ARCHITECTURE_LITTLE_ENDIAN);
        self.buffer.put_u16_le(global_mesg_num);
        self.buffer.put_u8(layout.len() as u8);
        for field in layout {
            self.buffer.put_u8(field.number);
            self.buffer.put_u8(field.base_type.size());
            self.buffer.put_u8(field.base_type.wire_id());
        }
    }

    /// Patches the header with the final data size and appends the file
    /// checksum, returning the finished byte sequence.
    pub fn finalize(mut self) -> Vec<u8> {
        let data_size = (self.buffer.len() - FILE_HEADER_SIZE as usize) as u32;
        let mut header_slot = &mut self.buffer[..FILE_HEADER_SIZE as usize];
        FitFileHeader::with_data_size(data_size).write_to_buf(&mut header_slot);
        let file_crc = crc::checksum(&self.buffer);
        self.buffer.put_u16_le(file_crc);
        self.buffer
    }
}

impl Default for FitOutputStream {
    fn default() -> Self {
        Self::new()
    }
}
