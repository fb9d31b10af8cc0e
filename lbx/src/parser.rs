use nom::{
    bytes::complete::take,
    combinator::map,
    multi::count,
    number::complete::{le_u16, le_u32},
    IResult as _IResult, Parser,
};

use crate::types::{ImageHeader, PaletteSegment};

pub type IResult<'a, T> = _IResult<&'a [u8], T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveHeader {
    pub asset_count: u16,
    pub magic: u16,
    pub reserved: u32,
    pub first_start: u32,
}

pub fn parse_archive_header(i: &'_ [u8]) -> IResult<'_, ArchiveHeader> {
    map(
        (le_u16, le_u16, le_u32, le_u32),
        |(asset_count, magic, reserved, first_start)| ArchiveHeader {
            asset_count,
            magic,
            reserved,
            first_start,
        },
    )
    .parse(i)
}

pub fn parse_offset_table(i: &'_ [u8], length: usize) -> IResult<'_, Vec<u32>> {
    count(le_u32, length).parse(i)
}

/// Returns the header and the reserved word between height and frame count.
pub fn parse_image_header(i: &'_ [u8]) -> IResult<'_, (ImageHeader, u16)> {
    map(
        (le_u16, le_u16, le_u16, le_u16, le_u16, le_u16),
        |(width, height, reserved, frame_count, frame_time, flags)| {
            (
                ImageHeader {
                    width,
                    height,
                    frame_count,
                    frame_time,
                    flags,
                },
                reserved,
            )
        },
    )
    .parse(i)
}

/// First frame start followed by one end offset per frame.
pub fn parse_frame_table(i: &'_ [u8], frame_count: usize) -> IResult<'_, (u32, Vec<u32>)> {
    (le_u32, count(le_u32, frame_count)).parse(i)
}

pub fn parse_palette_segment(i: &'_ [u8]) -> IResult<'_, PaletteSegment<'_>> {
    let (i, (start, size)) = (le_u16, le_u16).parse(i)?;
    let (i, data) = take(size as usize * 4).parse(i)?;

    Ok((i, PaletteSegment { start, size, data }))
}

/// `(count, size)` words leading a text asset.
pub fn parse_text_header(i: &'_ [u8]) -> IResult<'_, (u16, u16)> {
    (le_u16, le_u16).parse(i)
}

/// Line marker and starting row of a sparse frame.
pub fn parse_sparse_start(i: &'_ [u8]) -> IResult<'_, (u16, u16)> {
    (le_u16, le_u16).parse(i)
}

/// `(size, skip)` of one run.
pub fn parse_sparse_run(i: &'_ [u8]) -> IResult<'_, (u16, u16)> {
    (le_u16, le_u16).parse(i)
}

/// Run pixels and the padding byte that keeps runs word aligned.
pub fn parse_run_pixels(i: &'_ [u8], size: usize) -> IResult<'_, &'_ [u8]> {
    let (i, pixels) = take(size).parse(i)?;
    let (i, _) = take(size % 2).parse(i)?;

    Ok((i, pixels))
}
