//! Parses config file
use std::{
    env,
    fs::OpenOptions,
    io::Read,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::Deserialize;

/// Default frame time floor in milliseconds.
pub const MIN_FRAME_TIME: u16 = 10;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    /// Tried in order when an image has no palette of its own.
    pub palettes: Vec<PaletteSource>,
    pub output: Option<PathBuf>,
    pub min_frame_time: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            palettes: vec![],
            output: None,
            min_frame_time: MIN_FRAME_TIME,
        }
    }
}

/// Image asset inside an archive whose palette is borrowed by other archives.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PaletteSource {
    pub archive: PathBuf,
    pub asset: usize,
}

impl FromStr for PaletteSource {
    type Err = String;

    /// `path:index`, split on the last colon so drive letters survive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((archive, asset)) = s.rsplit_once(':') else {
            return Err(format!("expected <archive>:<index>, got \"{s}\""));
        };

        if archive.is_empty() {
            return Err(format!("missing archive path in \"{s}\""));
        }

        let asset = asset
            .parse::<usize>()
            .map_err(|err| format!("bad asset index \"{asset}\": {err}"))?;

        Ok(Self {
            archive: PathBuf::from(archive),
            asset,
        })
    }
}

pub static CONFIG_FILE_NAME: &str = "config.toml";

/// Parse `config.toml` in the same folder as the binary
///
/// A missing file is not an error.
pub fn parse_config() -> eyre::Result<Config> {
    let path = match env::current_exe() {
        Ok(path) => path
            .parent()
            .map(|parent| parent.join(CONFIG_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME)),
        Err(_) => PathBuf::from(CONFIG_FILE_NAME),
    };

    if !path.exists() {
        log::debug!("no config at {}", path.display());
        return Ok(Config::default());
    }

    parse_config_from_file(path.as_path())
}

pub fn parse_config_from_file(path: &Path) -> eyre::Result<Config> {
    let mut file = OpenOptions::new().read(true).open(path.as_os_str())?;
    let mut buffer = String::new();

    file.read_to_string(&mut buffer)?;

    let mut config: Config = toml::from_str(&buffer)?;

    let root = path.parent().unwrap_or(Path::new(""));
    let resolve = |p: PathBuf| if p.is_relative() { root.join(p) } else { p };

    config.palettes.iter_mut().for_each(|source| {
        source.archive = resolve(std::mem::take(&mut source.archive));
    });
    config.output = config.output.map(resolve);

    Ok(config)
}
