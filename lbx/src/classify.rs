use crate::{
    constants::{AUDIO_SIGNATURE, CURSOR_ASSET_SIZE, CURSOR_MARKER, PALETTE_SIZE},
    image::parse_image_layout,
    parser::parse_text_header,
    types::AssetKind,
};

/// Guesses what an asset is from its leading bytes.
///
/// The order of the checks matters. Some text and audio payloads happen to satisfy the
/// image header arithmetic, so they are ruled out first.
pub fn classify(data: &[u8]) -> AssetKind<'_> {
    if data.len() < 4 {
        return AssetKind::RawBlob;
    }

    if data.starts_with(AUDIO_SIGNATURE) {
        return AssetKind::Audio;
    }

    if let Some(text) = text_payload(data) {
        return AssetKind::Text(text);
    }

    if is_cursor(data) {
        return AssetKind::Cursor;
    }

    match parse_image_layout(data) {
        Ok(layout) => AssetKind::Image(layout),
        Err(err) => {
            log::trace!("not an image: {err}");
            AssetKind::Unknown
        }
    }
}

/// Text assets are `(1, length - 4)` followed by a NUL terminated string and NUL padding.
pub fn text_payload(data: &[u8]) -> Option<&[u8]> {
    let (body, (count, size)) = parse_text_header(data).ok()?;

    if count != 1 || size as usize != body.len() {
        return None;
    }

    let terminator = body.iter().position(|&c| c == 0)?;

    if body[terminator..].iter().all(|&c| c == 0) {
        Some(&body[..terminator])
    } else {
        None
    }
}

/// Cursors have a fixed size and every palette entry starts with the marker byte.
pub fn is_cursor(data: &[u8]) -> bool {
    data.len() == CURSOR_ASSET_SIZE
        && data[..PALETTE_SIZE]
            .iter()
            .step_by(4)
            .all(|&c| c == CURSOR_MARKER)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        constants::FLAG_NOCOMPRESS,
        fixture::{cursor_bytes, ImageBuilder},
    };

    #[test]
    fn tiny_blob() {
        assert_eq!(classify(b"abc"), AssetKind::RawBlob);
        assert_eq!(classify(b""), AssetKind::RawBlob);
    }

    #[test]
    fn riff_is_audio() {
        assert_eq!(classify(b"RIFF\x24\0\0\0WAVEfmt "), AssetKind::Audio);
        assert_eq!(classify(b"RIFF"), AssetKind::Audio);
    }

    #[test]
    fn nul_terminated_text() {
        let data = [1, 0, 4, 0, b'a', b'b', 0, 0];

        assert_eq!(classify(&data), AssetKind::Text(b"ab"));
    }

    #[test]
    fn text_with_garbage_after_terminator() {
        let data = [1, 0, 4, 0, b'a', 0, b'b', 0];

        assert_eq!(text_payload(&data), None);
        assert_ne!(classify(&data), AssetKind::Text(b"a"));
    }

    #[test]
    fn text_without_terminator() {
        let data = [1, 0, 2, 0, b'a', b'b'];

        assert_eq!(text_payload(&data), None);
    }

    #[test]
    fn text_size_mismatch() {
        let data = [1, 0, 5, 0, b'a', b'b', 0, 0];

        assert_eq!(text_payload(&data), None);
    }

    #[test]
    fn cursor_by_size_and_marker() {
        let data = cursor_bytes();

        assert_eq!(classify(&data), AssetKind::Cursor);
    }

    #[test]
    fn cursor_with_bad_marker() {
        let mut data = cursor_bytes();
        data[1020] = 0;

        assert!(!is_cursor(&data));
        assert_ne!(classify(&data), AssetKind::Cursor);
    }

    #[test]
    fn image_header() {
        let data = ImageBuilder::new(2, 2)
            .flags(FLAG_NOCOMPRESS)
            .frame(vec![0; 4])
            .build();

        assert!(matches!(classify(&data), AssetKind::Image(_)));
    }

    #[test]
    fn broken_image_is_unknown() {
        let mut data = ImageBuilder::new(2, 2)
            .flags(FLAG_NOCOMPRESS)
            .frame(vec![0; 4])
            .build();
        data.push(0);

        assert_eq!(classify(&data), AssetKind::Unknown);
    }
}
