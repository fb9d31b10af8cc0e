use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::modules::scan::scan_archive;

use super::{Cli, CliRes};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct ScanCli {
    // This is just dummy command because we are already in the command
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Lists the assets of archives
    Scan {
        /// Paths to .lbx files
        #[arg(required = true)]
        archives: Vec<PathBuf>,
    },
}

pub struct Scan;
impl Cli for Scan {
    fn name(&self) -> &'static str {
        "scan"
    }

    fn cli(&self) -> CliRes {
        let cli = ScanCli::parse();

        let Commands::Scan { archives } = cli.command;

        let mut res = CliRes::Ok;

        for archive in archives {
            match scan_archive(&archive) {
                Ok(report) => println!("{}", report),
                Err(err) => {
                    println!("{}", err);
                    res = CliRes::Err;
                }
            }
        }

        res
    }

    fn cli_help(&self) {
        // handled by clap
        unreachable!()
    }
}
