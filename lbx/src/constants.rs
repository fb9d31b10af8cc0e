pub const LBX_MAGIC: u16 = 0xfead;

// "SMK2" read as two little endian words
pub const SMACKER_COUNT: u16 = 0x4d53;
pub const SMACKER_MAGIC: u16 = 0x324b;

/// count + magic + reserved + first start
pub const ARCHIVE_HEADER_LENGTH: usize = 12;

pub const AUDIO_SIGNATURE: &[u8; 4] = b"RIFF";

pub const PALETTE_ENTRIES: usize = 256;
pub const PALETTE_SIZE: usize = PALETTE_ENTRIES * 4;

// image header flags
pub const FLAG_NOCOMPRESS: u16 = 0x0100;
pub const FLAG_FILLBG: u16 = 0x0400;
pub const FLAG_KEYCOLOR: u16 = 0x0800;
pub const FLAG_PALETTE: u16 = 0x1000;
pub const FLAG_JUNCTION: u16 = 0x2000;
pub const KNOWN_FLAGS: u16 =
    FLAG_NOCOMPRESS | FLAG_FILLBG | FLAG_KEYCOLOR | FLAG_PALETTE | FLAG_JUNCTION;

/// Fixed header fields plus the first frame start.
pub const IMAGE_HEADER_LENGTH: usize = 16;
/// Frame table bound check includes room for the palette segment descriptor.
pub const IMAGE_TABLE_SLACK: usize = 20;

pub const SPARSE_LINE_MARKER: u16 = 1;

pub const CURSOR_WIDTH: usize = 24;
pub const CURSOR_HEIGHT: usize = 480;
pub const CURSOR_MARKER: u8 = 1;
pub const CURSOR_ASSET_SIZE: usize = PALETTE_SIZE + CURSOR_WIDTH * CURSOR_HEIGHT;
