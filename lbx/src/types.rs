use std::{collections::BTreeSet, fmt, ops::Range};

use crate::constants::{
    CURSOR_HEIGHT, CURSOR_WIDTH, FLAG_FILLBG, FLAG_KEYCOLOR, FLAG_NOCOMPRESS, FLAG_PALETTE,
    PALETTE_ENTRIES, PALETTE_SIZE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetEntry {
    pub offset: u32,
    pub length: u32,
}

impl AssetEntry {
    pub fn end(&self) -> u64 {
        self.offset as u64 + self.length as u64
    }
}

/// 256 RGBA entries.
#[derive(Clone, PartialEq, Eq)]
pub struct Palette(pub [u8; PALETTE_SIZE]);

impl fmt::Debug for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let used = self.0.chunks_exact(4).filter(|c| c[3] != 0).count();

        f.debug_struct("Palette").field("opaque", &used).finish()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl Palette {
    pub fn zeroed() -> Self {
        Self([0u8; PALETTE_SIZE])
    }

    /// Truncates or zero pads to exactly 256 entries.
    pub fn from_bytes(i: &[u8]) -> Self {
        let mut res = Self::zeroed();
        let length = i.len().min(PALETTE_SIZE);

        res.0[..length].copy_from_slice(&i[..length]);

        res
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn color(&self, index: u8) -> [u8; 4] {
        let offset = index as usize * 4;

        [
            self.0[offset],
            self.0[offset + 1],
            self.0[offset + 2],
            self.0[offset + 3],
        ]
    }

    pub(crate) fn set_color(&mut self, index: usize, color: [u8; 4]) {
        self.0[index * 4..index * 4 + 4].copy_from_slice(&color);
    }

    pub fn colors(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        (0..PALETTE_ENTRIES).map(|index| self.color(index as u8))
    }
}

/// Partial palette update carried inside an image asset.
///
/// `data` holds `size` groups of 4 bytes, `[_, r, g, b]` with 6 bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteSegment<'a> {
    pub start: u16,
    pub size: u16,
    pub data: &'a [u8],
}

impl PaletteSegment<'_> {
    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.start as usize + self.size as usize
    }

    /// Colors converted to 8 bit channels, in segment order.
    pub fn rgb(&self) -> Vec<[u8; 3]> {
        self.data
            .chunks_exact(4)
            .map(|c| [c[1] << 2, c[2] << 2, c[3] << 2])
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    pub width: u16,
    pub height: u16,
    pub frame_count: u16,
    pub frame_time: u16,
    pub flags: u16,
}

impl ImageHeader {
    pub fn has_palette(&self) -> bool {
        self.flags & FLAG_PALETTE != 0
    }

    pub fn is_raw(&self) -> bool {
        self.flags & FLAG_NOCOMPRESS != 0
    }

    pub fn reset_per_frame(&self) -> bool {
        self.flags & FLAG_FILLBG != 0
    }

    pub fn transparent_zero(&self) -> bool {
        self.flags & FLAG_KEYCOLOR != 0
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Structurally validated image asset, frames not decoded yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLayout<'a> {
    pub header: ImageHeader,
    /// `(start, end)` byte ranges relative to the asset start.
    pub frames: Vec<(usize, usize)>,
    pub palette_segment: Option<PaletteSegment<'a>>,
}

/// One palette index per pixel, `width * height` long.
pub type FrameImage = Vec<u8>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorUsage {
    pub all_colors: BTreeSet<u8>,
    /// Indices not covered by the image's own palette segment.
    pub external_colors: BTreeSet<u8>,
}

#[derive(Debug, Clone)]
pub struct LbxImage {
    pub header: ImageHeader,
    pub palette: Palette,
    /// `(start, size)` of the embedded palette segment
    pub palette_segment: Option<(u16, u16)>,
    pub frames: Vec<FrameImage>,
    /// Only meaningful for sparse images, raw ones cover the whole frame.
    pub realsize: BoundingBox,
    pub colors: ColorUsage,
}

#[derive(Debug, Clone)]
pub struct CursorImage {
    pub palette: Palette,
    pub frame: FrameImage,
}

#[derive(Debug, Clone)]
pub enum DecodedImage {
    Image(LbxImage),
    Cursor(CursorImage),
}

impl DecodedImage {
    pub fn width(&self) -> usize {
        match self {
            Self::Image(image) => image.header.width as usize,
            Self::Cursor(_) => CURSOR_WIDTH,
        }
    }

    pub fn height(&self) -> usize {
        match self {
            Self::Image(image) => image.header.height as usize,
            Self::Cursor(_) => CURSOR_HEIGHT,
        }
    }

    pub fn palette(&self) -> &Palette {
        match self {
            Self::Image(image) => &image.palette,
            Self::Cursor(cursor) => &cursor.palette,
        }
    }

    pub fn frames(&self) -> &[FrameImage] {
        match self {
            Self::Image(image) => &image.frames,
            Self::Cursor(cursor) => std::slice::from_ref(&cursor.frame),
        }
    }

    /// Cursors are still images and report 0.
    pub fn frame_time(&self) -> u16 {
        match self {
            Self::Image(image) => image.header.frame_time,
            Self::Cursor(_) => 0,
        }
    }

    pub fn into_palette(self) -> Palette {
        match self {
            Self::Image(image) => image.palette,
            Self::Cursor(cursor) => cursor.palette,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetKind<'a> {
    RawBlob,
    Audio,
    /// Payload without the terminator and padding.
    Text(&'a [u8]),
    Cursor,
    Image(ImageLayout<'a>),
    Unknown,
}

impl AssetKind<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RawBlob => "raw",
            Self::Audio => "audio",
            Self::Text(_) => "text",
            Self::Cursor => "cursor",
            Self::Image(_) => "image",
            Self::Unknown => "unknown",
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image(_) | Self::Cursor)
    }
}
