use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::modules::paldump::dump_palettes;

use super::{Cli, CliRes};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct PalDumpCli {
    // This is just dummy command because we are already in the command
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Prints the embedded palettes of image assets
    Paldump {
        /// Path to .lbx file
        archive: PathBuf,
        /// Asset indices
        #[arg(required = true)]
        indices: Vec<usize>,
    },
}

pub struct PalDump;
impl Cli for PalDump {
    fn name(&self) -> &'static str {
        "paldump"
    }

    fn cli(&self) -> CliRes {
        let cli = PalDumpCli::parse();

        let Commands::Paldump { archive, indices } = cli.command;

        match dump_palettes(&archive, &indices) {
            Ok(report) => {
                print!("{}", report);
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
