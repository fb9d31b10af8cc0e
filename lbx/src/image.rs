use std::ops::Range;

use crate::{
    constants::{IMAGE_HEADER_LENGTH, IMAGE_TABLE_SLACK, KNOWN_FLAGS, SPARSE_LINE_MARKER},
    error::{LbxError, LbxResult},
    palette::build_palette,
    parser::{
        parse_frame_table, parse_image_header, parse_palette_segment, parse_run_pixels,
        parse_sparse_run, parse_sparse_start,
    },
    types::{
        BoundingBox, ColorUsage, FrameImage, ImageHeader, ImageLayout, LbxImage, Palette,
    },
};

/// Validates the header, the frame table and the palette segment without decoding frames.
pub fn parse_image_layout(data: &[u8]) -> LbxResult<ImageLayout<'_>> {
    if data.len() < IMAGE_HEADER_LENGTH {
        return Err(LbxError::invalid_asset("asset is too short for an image"));
    }

    let (i, (header, reserved)) =
        parse_image_header(data).map_err(|_| LbxError::invalid_asset("truncated image header"))?;

    if reserved != 0 {
        return Err(LbxError::invalid_asset(format!(
            "unknown reserved header value {reserved}"
        )));
    }

    if header.width == 0 || header.height == 0 || header.frame_count == 0 {
        return Err(LbxError::invalid_asset(format!(
            "empty image {}x{} with {} frames",
            header.width, header.height, header.frame_count
        )));
    }

    if header.flags & !KNOWN_FLAGS != 0 {
        return Err(LbxError::invalid_asset(format!(
            "unknown image flags {:#06x}",
            header.flags
        )));
    }

    let frame_count = header.frame_count as usize;

    if IMAGE_TABLE_SLACK + 4 * frame_count > data.len() {
        return Err(LbxError::invalid_asset(
            "frame table does not fit in the asset",
        ));
    }

    let (i, (first_start, ends)) = parse_frame_table(i, frame_count)
        .map_err(|_| LbxError::invalid_asset("truncated frame table"))?;

    let mut start = first_start as usize;
    let mut frames = Vec::with_capacity(frame_count);

    for end in ends {
        let end = end as usize;

        if end < start {
            return Err(LbxError::invalid_asset(format!(
                "invalid frame offset {end} < {start}"
            )));
        }

        frames.push((start, end));
        start = end;
    }

    if start != data.len() {
        return Err(LbxError::invalid_asset(format!(
            "image data size mismatch: {} != {}",
            data.len(),
            start
        )));
    }

    if header.is_raw() {
        let length = header.pixel_count();

        if let Some((index, (frame_start, frame_end))) = frames
            .iter()
            .enumerate()
            .find(|(_, (frame_start, frame_end))| frame_end - frame_start < length)
        {
            return Err(LbxError::invalid_asset(format!(
                "raw frame {index} has {} bytes, expected {length}",
                frame_end - frame_start
            )));
        }
    }

    let palette_segment = if header.has_palette() {
        let (_, segment) = parse_palette_segment(i)
            .map_err(|_| LbxError::invalid_asset("palette segment exceeds asset size"))?;

        Some(segment)
    } else {
        None
    };

    Ok(ImageLayout {
        header,
        frames,
        palette_segment,
    })
}

#[derive(Default)]
struct BoundsTracker {
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
    touched: bool,
}

impl BoundsTracker {
    fn include(&mut self, x: Range<usize>, y: usize) {
        if !self.touched {
            *self = Self {
                min_x: x.start,
                min_y: y,
                max_x: x.end,
                max_y: y + 1,
                touched: true,
            };

            return;
        }

        self.min_x = self.min_x.min(x.start);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x.end);
        self.max_y = self.max_y.max(y + 1);
    }

    fn finish(&self) -> BoundingBox {
        if !self.touched {
            return BoundingBox::default();
        }

        BoundingBox {
            x: self.min_x,
            y: self.min_y,
            width: self.max_x - self.min_x,
            height: self.max_y - self.min_y,
        }
    }
}

struct FrameDecoder {
    header: ImageHeader,
    segment_range: Option<Range<usize>>,
    bounds: BoundsTracker,
    colors: ColorUsage,
}

impl FrameDecoder {
    fn record_colors(&mut self, pixels: &[u8]) {
        pixels.iter().for_each(|&index| {
            self.colors.all_colors.insert(index);

            if let Some(range) = &self.segment_range {
                if !range.contains(&(index as usize)) {
                    self.colors.external_colors.insert(index);
                }
            }
        });
    }

    /// Draws one frame onto `buffer` and hands the buffer back.
    fn decode_frame(&mut self, buffer: FrameImage, data: &[u8]) -> LbxResult<FrameImage> {
        if self.header.is_raw() {
            self.decode_raw(buffer, data)
        } else {
            self.decode_sparse(buffer, data)
        }
    }

    fn decode_raw(&mut self, mut buffer: FrameImage, data: &[u8]) -> LbxResult<FrameImage> {
        let length = self.header.pixel_count();

        let Some(pixels) = data.get(..length) else {
            return Err(LbxError::invalid_asset(format!(
                "raw frame has {} bytes, expected {}",
                data.len(),
                length
            )));
        };

        buffer.copy_from_slice(pixels);
        self.record_colors(pixels);

        Ok(buffer)
    }

    fn decode_sparse(&mut self, mut buffer: FrameImage, data: &[u8]) -> LbxResult<FrameImage> {
        let truncated = |_| LbxError::invalid_asset("sparse frame data ends prematurely");
        let width = self.header.width as usize;
        let height = self.header.height as usize;

        let (mut i, (marker, first_row)) = parse_sparse_start(data).map_err(truncated)?;

        if marker != SPARSE_LINE_MARKER {
            return Err(LbxError::invalid_asset(format!(
                "invalid frame start marker {marker}"
            )));
        }

        let mut y = first_row as usize;

        while y < height {
            let row = y * width;
            let mut x = 0;

            loop {
                let (rest, (size, skip)) = parse_sparse_run(i).map_err(truncated)?;
                let (size, skip) = (size as usize, skip as usize);

                if size == 0 {
                    i = rest;
                    y += skip;
                    break;
                }

                let run_start = x + skip;
                x = run_start + size;

                if x > width {
                    return Err(LbxError::ScanLineOverflow { x, y });
                }

                let (rest, pixels) = parse_run_pixels(rest, size).map_err(truncated)?;
                i = rest;

                buffer[row + run_start..row + x].copy_from_slice(pixels);
                self.record_colors(pixels);
                self.bounds.include(run_start..x, y);
            }
        }

        Ok(buffer)
    }
}

impl LbxImage {
    /// Decodes every frame of an image asset.
    ///
    /// `base_palette` is the palette of a previously decoded asset. Images without an embedded
    /// palette segment need it, the others overlay their segment on top of it.
    pub fn open_from_bytes(data: &[u8], base_palette: Option<&Palette>) -> LbxResult<Self> {
        let layout = parse_image_layout(data)?;
        let header = layout.header;

        let palette = build_palette(
            base_palette.map(Palette::as_bytes),
            layout
                .palette_segment
                .as_ref()
                .map(|segment| (segment.start, segment.data)),
            header.transparent_zero(),
        )?;

        let mut decoder = FrameDecoder {
            header,
            segment_range: layout.palette_segment.as_ref().map(|s| s.range()),
            bounds: BoundsTracker::default(),
            colors: ColorUsage::default(),
        };

        let mut buffer: FrameImage = vec![0; header.pixel_count()];
        let mut frames = Vec::with_capacity(layout.frames.len());

        for &(start, end) in &layout.frames {
            if header.reset_per_frame() {
                buffer = vec![0; header.pixel_count()];
            }

            buffer = decoder.decode_frame(buffer, &data[start..end])?;
            frames.push(buffer.clone());
        }

        let realsize = if header.is_raw() {
            BoundingBox {
                x: 0,
                y: 0,
                width: header.width as usize,
                height: header.height as usize,
            }
        } else {
            decoder.bounds.finish()
        };

        let mut colors = decoder.colors;

        // index 0 is "no color" in keyed images
        if header.transparent_zero() {
            colors.all_colors.remove(&0);
            colors.external_colors.remove(&0);
        }

        Ok(Self {
            header,
            palette,
            palette_segment: layout
                .palette_segment
                .map(|segment| (segment.start, segment.size)),
            frames,
            realsize,
            colors,
        })
    }

    pub fn width(&self) -> usize {
        self.header.width as usize
    }

    pub fn height(&self) -> usize {
        self.header.height as usize
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        constants::{FLAG_FILLBG, FLAG_JUNCTION, FLAG_KEYCOLOR, FLAG_NOCOMPRESS, PALETTE_SIZE},
        fixture::{ImageBuilder, SparseFrame},
    };

    fn grey_palette() -> Palette {
        let bytes = (0..PALETTE_SIZE).map(|i| (i / 4) as u8).collect::<Vec<u8>>();

        Palette::from_bytes(&bytes)
    }

    #[test]
    fn layout_of_simple_image() {
        let data = ImageBuilder::new(4, 2)
            .flags(FLAG_NOCOMPRESS)
            .frame_time(80)
            .frame(vec![1; 8])
            .frame(vec![2; 8])
            .build();

        let layout = parse_image_layout(&data).unwrap();

        assert_eq!(layout.header.width, 4);
        assert_eq!(layout.header.height, 2);
        assert_eq!(layout.header.frame_time, 80);
        assert_eq!(layout.frames, vec![(24, 32), (32, 40)]);
        assert!(layout.palette_segment.is_none());
    }

    #[test]
    fn layout_with_palette_segment() {
        let data = ImageBuilder::new(2, 1)
            .flags(FLAG_NOCOMPRESS)
            .palette(10, &[[1, 2, 3], [4, 5, 6]])
            .frame(vec![10, 11])
            .build();

        let layout = parse_image_layout(&data).unwrap();
        let segment = layout.palette_segment.unwrap();

        assert_eq!(segment.start, 10);
        assert_eq!(segment.size, 2);
        assert_eq!(segment.rgb(), vec![[4, 8, 12], [16, 20, 24]]);
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut data = ImageBuilder::new(2, 2)
            .flags(FLAG_NOCOMPRESS)
            .frame(vec![0; 4])
            .build();
        data.push(0);

        let res = LbxImage::open_from_bytes(&data, Some(&grey_palette()));

        assert!(matches!(res, Err(LbxError::InvalidAsset { .. })));
    }

    #[test]
    fn reserved_word_must_be_zero() {
        let mut builder = ImageBuilder::new(2, 2).flags(FLAG_NOCOMPRESS).frame(vec![0; 4]);
        builder.reserved = 3;

        assert!(matches!(
            parse_image_layout(&builder.build()),
            Err(LbxError::InvalidAsset { .. })
        ));
    }

    #[test]
    fn unknown_flags_are_rejected() {
        let data = ImageBuilder::new(2, 2)
            .flags(FLAG_NOCOMPRESS | 0x0001)
            .frame(vec![0; 4])
            .build();

        assert!(parse_image_layout(&data).is_err());

        let data = ImageBuilder::new(2, 2)
            .flags(FLAG_NOCOMPRESS | FLAG_JUNCTION)
            .frame(vec![0; 4])
            .build();

        assert!(parse_image_layout(&data).is_ok());
    }

    #[test]
    fn decreasing_frame_offsets() {
        let mut data = ImageBuilder::new(2, 2)
            .flags(FLAG_NOCOMPRESS)
            .frame(vec![0; 4])
            .frame(vec![0; 4])
            .build();

        // first frame end before its start
        data[16..20].copy_from_slice(&10u32.to_le_bytes());

        assert!(matches!(
            parse_image_layout(&data),
            Err(LbxError::InvalidAsset { .. })
        ));
    }

    #[test]
    fn frame_table_larger_than_asset() {
        let mut data = ImageBuilder::new(2, 2)
            .flags(FLAG_NOCOMPRESS)
            .frame(vec![0; 4])
            .build();

        data[6..8].copy_from_slice(&100u16.to_le_bytes());

        assert!(parse_image_layout(&data).is_err());
    }

    #[test]
    fn missing_palette() {
        let data = ImageBuilder::new(2, 2)
            .flags(FLAG_NOCOMPRESS)
            .frame(vec![0; 4])
            .build();

        assert!(matches!(
            LbxImage::open_from_bytes(&data, None),
            Err(LbxError::MissingPalette)
        ));
    }

    #[test]
    fn raw_frames_are_copied() {
        let data = ImageBuilder::new(3, 2)
            .flags(FLAG_NOCOMPRESS)
            .frame(vec![1, 2, 3, 4, 5, 6])
            .build();

        let image = LbxImage::open_from_bytes(&data, Some(&grey_palette())).unwrap();

        assert_eq!(image.frames, vec![vec![1, 2, 3, 4, 5, 6]]);
        assert_eq!(
            image.realsize,
            BoundingBox {
                x: 0,
                y: 0,
                width: 3,
                height: 2
            }
        );
        assert_eq!(image.colors.all_colors.len(), 6);
        assert!(image.colors.external_colors.is_empty());
    }

    #[test]
    fn short_raw_frame() {
        let data = ImageBuilder::new(3, 2)
            .flags(FLAG_NOCOMPRESS)
            .frame(vec![1, 2, 3])
            .build();

        assert!(matches!(
            LbxImage::open_from_bytes(&data, Some(&grey_palette())),
            Err(LbxError::InvalidAsset { .. })
        ));
    }

    #[test]
    fn short_raw_frame_fails_layout() {
        let data = ImageBuilder::new(4, 4)
            .flags(FLAG_NOCOMPRESS)
            .frame(vec![1; 8])
            .build();

        assert!(matches!(
            parse_image_layout(&data),
            Err(LbxError::InvalidAsset { .. })
        ));
    }

    #[test]
    fn huge_raw_image_is_rejected_before_decoding() {
        let data = ImageBuilder::new(u16::MAX, u16::MAX)
            .flags(FLAG_NOCOMPRESS)
            .frame(vec![0; 16])
            .frame(vec![0; 16])
            .build();

        assert!(matches!(
            LbxImage::open_from_bytes(&data, Some(&grey_palette())),
            Err(LbxError::InvalidAsset { .. })
        ));
    }

    #[test]
    fn sparse_bounding_box() {
        let frame = SparseFrame::new(2)
            .run(5, &[7, 8, 9])
            .end_line(8)
            .build();
        let data = ImageBuilder::new(10, 10).frame(frame).build();

        let image = LbxImage::open_from_bytes(&data, Some(&grey_palette())).unwrap();

        assert_eq!(
            image.realsize,
            BoundingBox {
                x: 5,
                y: 2,
                width: 3,
                height: 1
            }
        );
        assert_eq!(&image.frames[0][25..28], &[7, 8, 9]);
        assert_eq!(image.frames[0].iter().filter(|&&p| p != 0).count(), 3);
    }

    #[test]
    fn sparse_decoding_is_deterministic() {
        let frame = SparseFrame::new(0)
            .run(1, &[3, 4])
            .run(2, &[5])
            .end_line(2)
            .run(0, &[6, 6, 6, 6, 6, 6])
            .end_line(4)
            .build();
        let data = ImageBuilder::new(6, 4).frame(frame).build();

        let first = LbxImage::open_from_bytes(&data, Some(&grey_palette())).unwrap();
        let second = LbxImage::open_from_bytes(&data, Some(&grey_palette())).unwrap();

        assert_eq!(first.frames, second.frames);
        assert_eq!(first.realsize, second.realsize);
        assert_eq!(
            first.realsize,
            BoundingBox {
                x: 0,
                y: 0,
                width: 6,
                height: 3
            }
        );
        assert_eq!(&first.frames[0][..6], &[0, 3, 4, 0, 0, 5]);
        assert_eq!(&first.frames[0][12..18], &[6; 6]);
    }

    #[test]
    fn run_ending_at_width_is_allowed() {
        let frame = SparseFrame::new(0).run(2, &[1, 1]).end_line(1).build();
        let data = ImageBuilder::new(4, 1).frame(frame).build();

        let image = LbxImage::open_from_bytes(&data, Some(&grey_palette())).unwrap();

        assert_eq!(image.frames[0], vec![0, 0, 1, 1]);
    }

    #[test]
    fn scan_line_overflow() {
        let frame = SparseFrame::new(0).run(3, &[1, 1]).end_line(1).build();
        let data = ImageBuilder::new(4, 1).frame(frame).build();

        assert!(matches!(
            LbxImage::open_from_bytes(&data, Some(&grey_palette())),
            Err(LbxError::ScanLineOverflow { x: 5, y: 0 })
        ));
    }

    #[test]
    fn bad_line_marker() {
        let frame = SparseFrame::with_marker(2, 0).end_line(1).build();
        let data = ImageBuilder::new(4, 1).frame(frame).build();

        assert!(matches!(
            LbxImage::open_from_bytes(&data, Some(&grey_palette())),
            Err(LbxError::InvalidAsset { .. })
        ));
    }

    #[test]
    fn truncated_sparse_frame() {
        // row never terminates
        let frame = SparseFrame::new(0).run(0, &[1]).build();
        let data = ImageBuilder::new(4, 2).frame(frame).build();

        assert!(matches!(
            LbxImage::open_from_bytes(&data, Some(&grey_palette())),
            Err(LbxError::InvalidAsset { .. })
        ));
    }

    #[test]
    fn frames_draw_on_persistent_buffer() {
        let first = SparseFrame::new(0).run(0, &[1, 1]).end_line(1).build();
        let second = SparseFrame::new(0).run(2, &[2, 2]).end_line(1).build();
        let data = ImageBuilder::new(4, 1).frame(first).frame(second).build();

        let image = LbxImage::open_from_bytes(&data, Some(&grey_palette())).unwrap();

        assert_eq!(image.frames[0], vec![1, 1, 0, 0]);
        assert_eq!(image.frames[1], vec![1, 1, 2, 2]);
        assert_eq!(
            image.realsize,
            BoundingBox {
                x: 0,
                y: 0,
                width: 4,
                height: 1
            }
        );
    }

    #[test]
    fn frames_reset_per_frame() {
        let first = SparseFrame::new(0).run(0, &[1, 1]).end_line(1).build();
        let second = SparseFrame::new(0).run(2, &[2, 2]).end_line(1).build();
        let data = ImageBuilder::new(4, 1)
            .flags(FLAG_FILLBG)
            .frame(first)
            .frame(second)
            .build();

        let image = LbxImage::open_from_bytes(&data, Some(&grey_palette())).unwrap();

        assert_eq!(image.frames[1], vec![0, 0, 2, 2]);
    }

    #[test]
    fn external_colors_outside_segment() {
        let frame = SparseFrame::new(0)
            .run(0, &[0, 4, 5, 9])
            .end_line(1)
            .build();
        let data = ImageBuilder::new(4, 1)
            .palette(4, &[[1, 1, 1], [2, 2, 2]])
            .frame(frame)
            .build();

        let image = LbxImage::open_from_bytes(&data, None).unwrap();

        assert_eq!(image.palette_segment, Some((4, 2)));
        assert_eq!(
            image.colors.all_colors.iter().copied().collect::<Vec<u8>>(),
            vec![0, 4, 5, 9]
        );
        assert_eq!(
            image.colors.external_colors.iter().copied().collect::<Vec<u8>>(),
            vec![0, 9]
        );
        assert_eq!(image.palette.color(4), [4, 4, 4, 255]);
    }

    #[test]
    fn transparency_hides_index_zero() {
        let frame = SparseFrame::new(0)
            .run(0, &[0, 1, 2, 0])
            .end_line(1)
            .build();
        let data = ImageBuilder::new(4, 1)
            .flags(FLAG_KEYCOLOR)
            .palette(1, &[[1, 1, 1]])
            .frame(frame)
            .build();

        let image = LbxImage::open_from_bytes(&data, Some(&grey_palette())).unwrap();

        assert_eq!(image.palette.color(0), [0, 0, 0, 0]);
        assert!(!image.colors.all_colors.contains(&0));
        assert!(!image.colors.external_colors.contains(&0));
        assert!(image.colors.external_colors.contains(&2));
    }
}
