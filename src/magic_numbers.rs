use four_cc::FourCC;

pub const FIT_SIGNATURE: FourCC = FourCC(*b".FIT");
pub const FILE_HEADER_SIZE: u8 = 14;
pub const PROTOCOL_VERSION: u8 = 0x20;
pub const PROFILE_VERSION: u16 = 2194;

// global message numbers from the activity-file profile
pub const MESG_NUM_FILE_ID: u16 = 0;
pub const MESG_NUM_SESSION: u16 = 18;
pub const MESG_NUM_LAP: u16 = 19;
pub const MESG_NUM_RECORD: u16 = 20;
pub const MESG_NUM_ACTIVITY: u16 = 34;

pub const FILE_TYPE_ACTIVITY: u8 = 4;
pub const MANUFACTURER_DEVELOPMENT: u16 = 255;
pub const SPORT_FLYING: u8 = 20;
pub const SUB_SPORT_FLY_PARAGLIDE: u8 = 111;

// identifiers written into file_id until a registered manufacturer/product
// pair exists for this converter
pub const PLACEHOLDER_PRODUCT: u16 = 0;
pub const PLACEHOLDER_SERIAL_NUMBER: u32 = 1234;
