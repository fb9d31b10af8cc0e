use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{
    config::{parse_config, parse_config_from_file, PaletteSource},
    modules::dump::LbxDump,
};

use super::{Cli, CliRes};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct DumpCli {
    // This is just dummy command because we are already in the command
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extracts every asset of an archive
    Dump {
        /// Path to .lbx file
        archive: PathBuf,
        /// Default palette as <archive>:<index>
        ///
        /// Can be repeated, each palette is decoded on top of the previous one
        #[arg(short, long)]
        palette: Vec<PaletteSource>,
        /// Output folder
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Config file, defaults to config.toml next to the binary
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

pub struct Dump;
impl Cli for Dump {
    fn name(&self) -> &'static str {
        "dump"
    }

    fn cli(&self) -> CliRes {
        let cli = DumpCli::parse();

        let Commands::Dump {
            archive,
            palette,
            output,
            config,
        } = cli.command;

        let config = match config {
            Some(path) => parse_config_from_file(&path),
            None => parse_config(),
        };

        let config = match config {
            Ok(config) => config,
            Err(err) => {
                println!("Error parsing config.toml: {}", err);
                return CliRes::Err;
            }
        };

        let mut dump = LbxDump::new(archive);

        // command line palettes replace the configured ones
        if palette.is_empty() {
            dump.palette_sources(config.palettes);
        } else {
            dump.palette_sources(palette);
        }

        if let Some(output) = output.or(config.output) {
            dump.output(output);
        }

        dump.min_frame_time(config.min_frame_time);

        match dump.work() {
            Ok(report) => {
                println!(
                    "Wrote {} files, {} assets skipped",
                    report.written.len(),
                    report.skipped.len()
                );
                CliRes::Ok
            }
            Err(err) => {
                println!("{}", err);
                CliRes::Err
            }
        }
    }

    fn cli_help(&self) {
        // handled by clap
        unreachable!()
    }
}
