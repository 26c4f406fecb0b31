mod commands;
mod config;
mod declaration;
mod diagnostics;
mod error;
mod grammar;
mod literal;
mod locator;
mod neutralizer;
mod record;
mod scripts;
mod staging;
mod types;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

use crate::commands::ConvertOptions;

/// Convert an old-style submod into a new-style submod bundle
/// (rpy header declaration to `header.json`).
#[derive(Parser)]
#[command(name = "mas-submod-converter", version, about = "Convert old style submods to new style")]
struct Cli {
    /// The submod directory (assets, the header file, and other scripts)
    submod_dir: PathBuf,
    /// The file defining the submod header, relative to the submod directory
    header_file: PathBuf,
    /// Only report what would happen; nothing on disk changes
    #[arg(short, long)]
    dry_run: bool,
    /// The directory to store the output bundle in
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// Only report warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
    /// Also report the parsed declaration and block boundaries
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let root = PathBuf::from(".");
    let config = match config::Config::load(&root) {
        Ok(c) => c,
        Err(e) => {
            diagnostics::print_error(&e);
            return ExitCode::FAILURE;
        },
    };

    let options = ConvertOptions {
        dry_run: cli.dry_run,
        header_file: cli.header_file,
        out_root: cli.out_dir,
        submod_dir: cli.submod_dir,
    };

    return match commands::convert(&options, &config) {
        Ok(outcome) => {
            match outcome.bundle_dir {
                Some(bundle) => println!("The output is stored in '{}'", bundle.display()),
                None => println!(
                    "Dry run: header with {} fields, nothing written",
                    outcome.record.fields().len()
                ),
            }
            ExitCode::SUCCESS
        },
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    };
}

/// Send progress events to stderr, filtered by `--quiet`/`--verbose`.
fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        Level::WARN
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
