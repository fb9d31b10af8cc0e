use crate::{
    classify::is_cursor,
    constants::{CURSOR_ASSET_SIZE, PALETTE_SIZE},
    error::{LbxError, LbxResult},
    image::parse_image_layout,
    palette::build_palette,
    types::{CursorImage, DecodedImage, LbxImage, Palette},
};

impl CursorImage {
    /// Full 256 color palette followed by one 24x480 raw bitmap.
    pub fn open_from_bytes(data: &[u8]) -> LbxResult<Self> {
        if !is_cursor(data) {
            return Err(LbxError::invalid_asset(format!(
                "not a cursor: {} bytes, expected {CURSOR_ASSET_SIZE} with marked palette",
                data.len()
            )));
        }

        let (palette, pixels) = data.split_at(PALETTE_SIZE);
        let palette = build_palette(None, Some((0, palette)), false)?;

        Ok(Self {
            palette,
            frame: pixels.to_vec(),
        })
    }
}

impl DecodedImage {
    /// Decodes an asset already classified as an image or a cursor.
    pub fn open_from_bytes(data: &[u8], base_palette: Option<&Palette>) -> LbxResult<Self> {
        if is_cursor(data) {
            return CursorImage::open_from_bytes(data).map(Self::Cursor);
        }

        LbxImage::open_from_bytes(data, base_palette).map(Self::Image)
    }
}

/// Palette of an image or cursor asset without decoding its frames.
///
/// Returns the first entry index and the colors. Images without an embedded segment give
/// `None`.
pub fn embedded_palette(data: &[u8]) -> LbxResult<Option<(u16, Vec<[u8; 3]>)>> {
    if is_cursor(data) {
        let palette = CursorImage::open_from_bytes(data)?.palette;
        let colors = palette
            .colors()
            .map(|[r, g, b, _]| [r, g, b])
            .collect::<Vec<[u8; 3]>>();

        return Ok(Some((0, colors)));
    }

    let layout = parse_image_layout(data)?;

    Ok(layout
        .palette_segment
        .map(|segment| (segment.start, segment.rgb())))
}
