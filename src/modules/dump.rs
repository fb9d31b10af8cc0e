use std::{
    fs,
    path::{Path, PathBuf},
};

use eyre::eyre;
use lbx::{classify, Archive, AssetKind, DecodedImage, LbxError, Palette};

use crate::{
    config::{PaletteSource, MIN_FRAME_TIME},
    err,
    utils::{img_stuffs::write_decoded_image, misc::archive_base_name},
};

#[derive(Debug, Default)]
pub struct DumpReport {
    pub written: Vec<PathBuf>,
    /// Assets whose decoding failed but whose raw bytes were still written.
    pub skipped: Vec<usize>,
}

pub struct LbxDump {
    archive: PathBuf,
    output: Option<PathBuf>,
    palettes: Vec<PaletteSource>,
    min_frame_time: u16,
}

impl LbxDump {
    pub fn new(archive: impl AsRef<Path>) -> Self {
        Self {
            archive: archive.as_ref().to_path_buf(),
            output: None,
            palettes: vec![],
            min_frame_time: MIN_FRAME_TIME,
        }
    }

    /// Defaults to the current folder.
    pub fn output(&mut self, output: impl AsRef<Path>) -> &mut Self {
        self.output = Some(output.as_ref().to_path_buf());
        self
    }

    pub fn palette_source(&mut self, source: PaletteSource) -> &mut Self {
        self.palettes.push(source);
        self
    }

    pub fn palette_sources(&mut self, sources: impl IntoIterator<Item = PaletteSource>) -> &mut Self {
        self.palettes.extend(sources);
        self
    }

    pub fn min_frame_time(&mut self, min_frame_time: u16) -> &mut Self {
        self.min_frame_time = min_frame_time;
        self
    }

    /// Decodes every palette source in order, each on top of the previous one.
    fn load_default_palette(&self) -> eyre::Result<Option<Palette>> {
        let mut palette: Option<Palette> = None;

        for PaletteSource { archive, asset } in &self.palettes {
            let source_err =
                |err: LbxError| eyre!("Cannot read {}:{}: {}", archive.display(), asset, err);

            let mut source = Archive::open_from_file(archive).map_err(source_err)?;
            let data = source.load_asset(*asset).map_err(source_err)?;

            match DecodedImage::open_from_bytes(&data, palette.as_ref()) {
                Ok(image) => palette = Some(image.into_palette()),
                Err(LbxError::MissingPalette) => {
                    return err!(
                        "{}:{} does not have a palette",
                        archive.display(),
                        asset
                    )
                }
                Err(err) => {
                    return err!("{}:{} is not an image: {}", archive.display(), asset, err)
                }
            }

            log::debug!("palette from {}:{}", archive.display(), asset);
        }

        Ok(palette)
    }

    pub fn work(&self) -> eyre::Result<DumpReport> {
        let mut palette = self.load_default_palette()?;
        let mut archive = Archive::open_from_file(&self.archive)?;

        let out_dir = self.output.clone().unwrap_or_else(|| PathBuf::from("."));

        if !out_dir.exists() {
            fs::create_dir_all(&out_dir)?;
        }

        let name = archive_base_name(&self.archive);
        let mut report = DumpReport::default();

        log::info!(
            "dumping {} assets from {}",
            archive.asset_count(),
            self.archive.display()
        );

        for index in 0..archive.asset_count() {
            let data = archive.load_asset(index)?;
            let stem = format!("{name}-{index}");

            let mut write = |extension: &str, bytes: &[u8]| -> eyre::Result<()> {
                let path = out_dir.join(format!("{stem}.{extension}"));

                fs::write(&path, bytes)?;
                report.written.push(path);

                Ok(())
            };

            let kind = classify(&data);
            log::debug!("asset {index}: {}", kind.name());

            match kind {
                AssetKind::Audio => write("wav", &data)?,
                AssetKind::Text(text) => {
                    write("dat", &data)?;
                    write("txt", text)?;
                }
                AssetKind::RawBlob | AssetKind::Unknown => write("dat", &data)?,
                AssetKind::Image(_) | AssetKind::Cursor => {
                    write("dat", &data)?;

                    let image = match DecodedImage::open_from_bytes(&data, palette.as_ref()) {
                        Ok(image) => image,
                        Err(err) if err.is_recoverable() => {
                            log::warn!("asset {index}: {err}");

                            if matches!(err, LbxError::MissingPalette) {
                                log::warn!(
                                    "use --palette <archive>:<index> to provide a default palette"
                                );
                            }

                            report.skipped.push(index);
                            continue;
                        }
                        Err(err) => return Err(eyre!("asset {index}: {err}")),
                    };

                    let path = write_decoded_image(&out_dir, &stem, &image, self.min_frame_time)?;
                    report.written.push(path);

                    if palette.is_none() && matches!(image, DecodedImage::Image(_)) {
                        palette = Some(image.into_palette());
                    }
                }
            }
        }

        Ok(report)
    }
}
