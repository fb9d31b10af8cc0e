use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use eyre::eyre;
use image::{
    codecs::gif::{GifEncoder, Repeat},
    Delay, Frame, ImageFormat, RgbaImage,
};
use lbx::{DecodedImage, Palette};

/// Used when the asset asks for something faster than the configured floor.
pub const DEFAULT_FRAME_TIME: u16 = 100;

pub fn frame_delay(frame_time: u16, min_frame_time: u16) -> u16 {
    if frame_time < min_frame_time {
        DEFAULT_FRAME_TIME
    } else {
        frame_time
    }
}

pub fn eight_bpp_to_rgba(
    frame: &[u8],
    palette: &Palette,
    width: usize,
    height: usize,
) -> eyre::Result<RgbaImage> {
    let buf = frame
        .iter()
        .flat_map(|&index| palette.color(index))
        .collect::<Vec<u8>>();

    RgbaImage::from_vec(width as u32, height as u32, buf)
        .ok_or_else(|| eyre!("Frame does not fit {width}x{height}"))
}

pub fn frames_to_rgba(image: &DecodedImage) -> eyre::Result<Vec<RgbaImage>> {
    image
        .frames()
        .iter()
        .map(|frame| eight_bpp_to_rgba(frame, image.palette(), image.width(), image.height()))
        .collect()
}

pub fn write_gif(
    path: impl AsRef<Path>,
    frames: Vec<RgbaImage>,
    frame_time: u16,
) -> eyre::Result<()> {
    let file = File::create(path.as_ref())?;
    let mut encoder = GifEncoder::new(BufWriter::new(file));

    encoder.set_repeat(Repeat::Infinite)?;
    encoder.encode_frames(frames.into_iter().map(|img| {
        Frame::from_parts(
            img,
            0,
            0,
            Delay::from_numer_denom_ms(frame_time as u32, 1),
        )
    }))?;

    Ok(())
}

/// Writes `<stem>.png` for a single frame or a looping `<stem>.gif` into `out_dir`.
///
/// Returns the written file.
pub fn write_decoded_image(
    out_dir: &Path,
    stem: &str,
    image: &DecodedImage,
    min_frame_time: u16,
) -> eyre::Result<PathBuf> {
    let mut frames = frames_to_rgba(image)?;

    if frames.len() > 1 {
        let out = out_dir.join(format!("{stem}.gif"));
        let delay = frame_delay(image.frame_time(), min_frame_time);

        write_gif(&out, frames, delay)?;

        return Ok(out);
    }

    let Some(frame) = frames.pop() else {
        return Err(eyre!("Image has no frames"));
    };

    let out = out_dir.join(format!("{stem}.png"));
    frame.save_with_format(&out, ImageFormat::Png)?;

    Ok(out)
}
