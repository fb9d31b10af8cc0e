use self::{dump::Dump, paldump::PalDump, scan::Scan};

mod dump;
mod paldump;
mod scan;

pub enum CliRes {
    Ok,
    Err,
}

pub trait Cli {
    fn name(&self) -> &'static str;
    /// Each module has to handle the arguments by itself.
    fn cli(&self) -> CliRes;
    fn cli_help(&self);
}

/// Runs the module named by the first argument.
pub fn cli() -> CliRes {
    let args: Vec<String> = std::env::args().collect();

    // Add new modules here.
    let modules: &[&dyn Cli] = &[&Dump, &Scan, &PalDump];

    let help = || {
        println!(
            "\
lbxtool {}

Available modules:",
            env!("CARGO_PKG_VERSION")
        );
        for module in modules {
            println!("{}", module.name());
        }
    };

    if args.len() < 2 {
        help();
        return CliRes::Err;
    }

    for module in modules {
        if args[1] == module.name() {
            return module.cli();
        }
    }

    // In case nothing fits then prints this again.
    help();

    CliRes::Err
}
