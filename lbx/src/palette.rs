use crate::{
    constants::PALETTE_ENTRIES,
    error::{LbxError, LbxResult},
    types::Palette,
};

/// Palette channels are stored as 6 bit values.
fn six_to_eight_bit(value: u8) -> u8 {
    value << 2
}

/// Builds the palette for one image.
///
/// Starts from `base` (all zero when absent), overlays `segment` as `(start entry, raw bytes)`
/// where every 4 byte group is `[_, r, g, b]` and finally clears entry 0 when
/// `force_transparent_zero` is set.
///
/// Without `base` and `segment` there is nothing to build from and the call fails with
/// [`LbxError::MissingPalette`].
pub fn build_palette(
    base: Option<&[u8]>,
    segment: Option<(u16, &[u8])>,
    force_transparent_zero: bool,
) -> LbxResult<Palette> {
    let mut palette = match base {
        Some(base) => Palette::from_bytes(base),
        None if segment.is_none() => return Err(LbxError::MissingPalette),
        None => Palette::zeroed(),
    };

    if let Some((start, raw)) = segment {
        let start = start as usize;
        let size = raw.len() / 4;

        if start + size > PALETTE_ENTRIES {
            return Err(LbxError::invalid_asset(format!(
                "palette segment {start}+{size} overflows {PALETTE_ENTRIES} entries"
            )));
        }

        raw.chunks_exact(4).enumerate().for_each(|(offset, c)| {
            palette.set_color(
                start + offset,
                [
                    six_to_eight_bit(c[1]),
                    six_to_eight_bit(c[2]),
                    six_to_eight_bit(c[3]),
                    0xff,
                ],
            );
        });
    }

    if force_transparent_zero {
        palette.set_color(0, [0, 0, 0, 0]);
    }

    Ok(palette)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::constants::PALETTE_SIZE;

    #[test]
    fn six_bit_channels_are_scaled() {
        let palette = build_palette(None, Some((0, &[1u8, 10, 20, 30][..])), false).unwrap();

        assert_eq!(palette.color(0), [40, 80, 120, 255]);
        assert_eq!(palette.color(1), [0, 0, 0, 0]);
    }

    #[test]
    fn segment_overlays_base_at_offset() {
        let base = Palette::from_bytes(&[7u8; PALETTE_SIZE]);
        let palette =
            build_palette(Some(base.as_bytes()), Some((4, &[0u8, 1, 2, 3, 0, 4, 5, 6][..])), false)
                .unwrap();

        assert_eq!(palette.color(3), [7, 7, 7, 7]);
        assert_eq!(palette.color(4), [4, 8, 12, 255]);
        assert_eq!(palette.color(5), [16, 20, 24, 255]);
        assert_eq!(palette.color(6), [7, 7, 7, 7]);
    }

    #[test]
    fn short_base_is_padded() {
        let palette = build_palette(Some(&[1u8, 2, 3, 4, 5][..]), None, false).unwrap();

        assert_eq!(palette.color(0), [1, 2, 3, 4]);
        assert_eq!(palette.color(1), [5, 0, 0, 0]);
        assert_eq!(palette.color(255), [0, 0, 0, 0]);
    }

    #[test]
    fn long_base_is_truncated() {
        let mut base = vec![9u8; PALETTE_SIZE];
        base.extend([1, 2, 3, 4]);

        let palette = build_palette(Some(&base), None, false).unwrap();

        assert_eq!(palette.as_bytes(), &[9u8; PALETTE_SIZE][..]);
    }

    #[test]
    fn transparency_always_clears_first_entry() {
        let base = Palette::from_bytes(&[0xffu8; PALETTE_SIZE]);

        let palette = build_palette(Some(base.as_bytes()), None, true).unwrap();
        assert_eq!(palette.color(0), [0, 0, 0, 0]);
        assert_eq!(palette.color(1), [0xff; 4]);

        let palette = build_palette(None, Some((0, &[0u8, 63, 63, 63][..])), true).unwrap();
        assert_eq!(palette.color(0), [0, 0, 0, 0]);
    }

    #[test]
    fn nothing_to_build_from() {
        assert!(matches!(
            build_palette(None, None, true),
            Err(LbxError::MissingPalette)
        ));
    }

    #[test]
    fn segment_past_last_entry() {
        let raw = [0u8; 8];

        assert!(matches!(
            build_palette(None, Some((255, &raw[..])), false),
            Err(LbxError::InvalidAsset { .. })
        ));
        assert!(build_palette(None, Some((254, &raw[..])), false).is_ok());
    }
}
