//! LBX archive and image asset decoding.
//!
//! An archive is a flat offset table over opaque assets. Assets are classified by their
//! content with [`classify`] and images are decoded into palette indexed frames.
mod archive;
mod classify;
pub mod constants;
mod cursor;
pub mod error;
mod image;
mod palette;
mod parser;
mod types;

#[cfg(any(test, feature = "fixture"))]
pub mod fixture;

pub use archive::{Archive, ByteSource};
pub use classify::{classify, is_cursor, text_payload};
pub use cursor::embedded_palette;
pub use error::{LbxError, LbxResult};
pub use image::parse_image_layout;
pub use palette::build_palette;
pub use types::*;

#[cfg(test)]
mod test {
    use crate::{
        constants::{FLAG_KEYCOLOR, FLAG_NOCOMPRESS},
        fixture::{archive_bytes, cursor_bytes, ImageBuilder, SparseFrame},
        classify, Archive, AssetKind, DecodedImage, LbxError,
    };

    #[test]
    fn walk_archive_with_palette_chaining() {
        let palette_image = ImageBuilder::new(2, 1)
            .flags(FLAG_NOCOMPRESS)
            .palette(0, &[[0, 0, 0], [10, 20, 30], [63, 63, 63]])
            .frame(vec![1, 2])
            .build();
        let keyed_image = ImageBuilder::new(3, 2)
            .flags(FLAG_KEYCOLOR)
            .frame_time(50)
            .frame(SparseFrame::new(1).run(1, &[2, 1]).end_line(1).build())
            .build();
        let cursor = cursor_bytes();
        let text = [1, 0, 4, 0, b'h', b'i', 0, 0];

        let bytes = archive_bytes(&[
            &palette_image[..],
            &keyed_image[..],
            &b"RIFF...."[..],
            &text[..],
            &cursor[..],
            &b"??"[..],
        ]);
        let mut archive = Archive::open_from_bytes(bytes).unwrap();

        let assets = (0..archive.asset_count())
            .map(|index| archive.load_asset(index).unwrap())
            .collect::<Vec<Vec<u8>>>();

        let kinds = assets
            .iter()
            .map(|asset| classify(asset).name())
            .collect::<Vec<&str>>();

        assert_eq!(kinds, vec!["image", "image", "audio", "text", "cursor", "raw"]);

        // the keyed image has no palette of its own
        assert!(matches!(
            DecodedImage::open_from_bytes(&assets[1], None),
            Err(LbxError::MissingPalette)
        ));

        let first = DecodedImage::open_from_bytes(&assets[0], None).unwrap();
        let palette = first.into_palette();

        assert_eq!(palette.color(1), [40, 80, 120, 255]);

        let second = DecodedImage::open_from_bytes(&assets[1], Some(&palette)).unwrap();

        assert_eq!(second.frame_time(), 50);
        assert_eq!(second.palette().color(0), [0, 0, 0, 0]);
        assert_eq!(second.palette().color(2), [252, 252, 252, 255]);
        assert_eq!(second.frames()[0], vec![0, 0, 0, 0, 2, 1]);

        if let DecodedImage::Image(image) = &second {
            assert_eq!(image.colors.all_colors.len(), 2);
            assert!(image.colors.external_colors.is_empty());
        }

        assert!(matches!(classify(&assets[3]), AssetKind::Text(b"hi")));
    }

    #[test]
    fn mismatched_frame_span_yields_no_frames() {
        let mut image = ImageBuilder::new(2, 2)
            .flags(FLAG_NOCOMPRESS)
            .palette(0, &[[1, 1, 1]])
            .frame(vec![0; 4])
            .build();
        image.extend([0, 0]);

        let bytes = archive_bytes(&[&image[..]]);
        let mut archive = Archive::open_from_bytes(bytes).unwrap();
        let asset = archive.load_asset(0).unwrap();

        let res = DecodedImage::open_from_bytes(&asset, None);

        assert!(matches!(res, Err(LbxError::InvalidAsset { .. })));
        assert_eq!(classify(&asset), AssetKind::Unknown);
    }
}
