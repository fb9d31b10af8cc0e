//! Builders for synthetic archives and assets.

use byte_writer::ByteWriter;

use crate::constants::{FLAG_PALETTE, LBX_MAGIC};

/// Archive holding `assets` back to back right after the offset table.
pub fn archive_bytes(assets: &[&[u8]]) -> Vec<u8> {
    let mut writer = ByteWriter::new();
    let mut end = 12 + 4 * assets.len() as u32;

    writer
        .append_u16(assets.len() as u16)
        .append_u16(LBX_MAGIC)
        .append_u32(0)
        .append_u32(end);

    assets.iter().for_each(|asset| {
        end += asset.len() as u32;
        writer.append_u32(end);
    });

    assets.iter().for_each(|asset| {
        writer.append_u8_slice(asset);
    });

    writer.data
}

/// Sparse frame stream.
pub struct SparseFrame {
    writer: ByteWriter,
}

impl SparseFrame {
    pub fn new(first_row: u16) -> Self {
        let mut writer = ByteWriter::new();
        writer.append_u16(1).append_u16(first_row);

        Self { writer }
    }

    pub fn with_marker(marker: u16, first_row: u16) -> Self {
        let mut writer = ByteWriter::new();
        writer.append_u16(marker).append_u16(first_row);

        Self { writer }
    }

    pub fn run(mut self, skip: u16, pixels: &[u8]) -> Self {
        self.writer
            .append_u16(pixels.len() as u16)
            .append_u16(skip)
            .append_u8_slice(pixels);

        if pixels.len() % 2 == 1 {
            self.writer.append_u8(0xee);
        }

        self
    }

    pub fn end_line(mut self, skip: u16) -> Self {
        self.writer.append_u16(0).append_u16(skip);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.writer.data
    }
}

pub struct ImageBuilder {
    pub width: u16,
    pub height: u16,
    pub reserved: u16,
    pub frame_time: u16,
    pub flags: u16,
    pub palette: Option<(u16, Vec<[u8; 3]>)>,
    pub frames: Vec<Vec<u8>>,
}

impl ImageBuilder {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            reserved: 0,
            frame_time: 0,
            flags: 0,
            palette: None,
            frames: vec![],
        }
    }

    pub fn flags(mut self, flags: u16) -> Self {
        self.flags |= flags;
        self
    }

    pub fn frame_time(mut self, frame_time: u16) -> Self {
        self.frame_time = frame_time;
        self
    }

    /// 6 bit colors starting at entry `start`.
    pub fn palette(mut self, start: u16, colors: &[[u8; 3]]) -> Self {
        self.flags |= FLAG_PALETTE;
        self.palette = Some((start, colors.to_vec()));
        self
    }

    pub fn frame(mut self, frame: Vec<u8>) -> Self {
        self.frames.push(frame);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        let palette_length = self
            .palette
            .as_ref()
            .map(|(_, colors)| 4 + 4 * colors.len())
            .unwrap_or(0);
        let mut end = (16 + 4 * self.frames.len() + palette_length) as u32;

        writer
            .append_u16(self.width)
            .append_u16(self.height)
            .append_u16(self.reserved)
            .append_u16(self.frames.len() as u16)
            .append_u16(self.frame_time)
            .append_u16(self.flags)
            .append_u32(end);

        self.frames.iter().for_each(|frame| {
            end += frame.len() as u32;
            writer.append_u32(end);
        });

        if let Some((start, colors)) = &self.palette {
            writer.append_u16(*start).append_u16(colors.len() as u16);

            colors.iter().for_each(|[r, g, b]| {
                writer.append_u8_slice(&[0, *r, *g, *b]);
            });
        }

        self.frames.iter().for_each(|frame| {
            writer.append_u8_slice(frame);
        });

        writer.data
    }
}

/// Cursor asset with a grey ramp palette and pixels counting up.
pub fn cursor_bytes() -> Vec<u8> {
    let mut writer = ByteWriter::new();

    (0..256u32).for_each(|index| {
        let level = (index / 4) as u8;
        writer.append_u8_slice(&[1, level, level, level]);
    });

    (0..24 * 480u32).for_each(|index| {
        writer.append_u8((index % 256) as u8);
    });

    writer.data
}

/// Text asset holding `text` and its terminator.
pub fn text_bytes(text: &[u8]) -> Vec<u8> {
    let mut writer = ByteWriter::new();

    writer
        .append_u16(1)
        .append_u16(text.len() as u16 + 1)
        .append_u8_slice(text)
        .append_u8(0);

    writer.data
}
