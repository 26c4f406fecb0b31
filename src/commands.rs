//! The `convert` command: stage a copy of the submod, neutralize its old
//! declaration, convert scripts to modules, and write `header.json`.

use std::fs::{File, OpenOptions};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::declaration;
use crate::error::Error;
use crate::locator;
use crate::neutralizer;
use crate::record::SubmodRecord;
use crate::scripts;
use crate::staging;
use crate::types::ArgumentMapping;

/// Inputs of one conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Only report what would happen; nothing on disk changes.
    pub dry_run: bool,
    /// Header script, relative to `submod_dir`.
    pub header_file: PathBuf,
    /// Folder the output bundle is created in.
    pub out_root: PathBuf,
    /// Submod folder holding the assets, the header script, and other scripts.
    pub submod_dir: PathBuf,
}

/// Result of a conversion.
#[derive(Debug)]
pub struct ConvertOutcome {
    /// Final bundle folder; `None` on a dry run.
    pub bundle_dir: Option<PathBuf>,
    /// The header written (or that would be written) to the bundle.
    pub record: SubmodRecord,
}

/// Run a full conversion.
///
/// The submod folder is copied into a staging folder first and only the
/// copy is modified. If any step after staging fails, the staging folder
/// is removed so no partial bundle is left behind. On a dry run the
/// original folder is read but never written.
///
/// # Errors
///
/// Returns `Error::PathNotFound` for a missing submod folder or header,
/// `Error::DeclarationNotFound`, `Error::DeclarationSyntax`,
/// `Error::TooManyPositional`, or `Error::UnhashableKey` for a bad header,
/// `Error::MissingName` if the header declares no string name,
/// and `Error::Io`/`Error::Walk`/`Error::Json` for filesystem failures.
pub fn convert(options: &ConvertOptions, config: &Config) -> Result<ConvertOutcome, Error> {
    if !options.submod_dir.is_dir() {
        return Err(Error::PathNotFound {
            path: options.submod_dir.clone(),
        });
    }

    let timestamp = staging::unix_timestamp();
    let out_dir = staging::create_out_dir(&options.out_root, &config.staging_prefix, timestamp, options.dry_run)?;

    let result = staging::copy_tree(&options.submod_dir, &out_dir, options.dry_run)
        .and_then(|()| return convert_staged(options, config, &out_dir));
    if result.is_err() && !options.dry_run {
        staging::discard(&out_dir);
    }
    return result;
}

/// Convert the staged copy (or, on a dry run, inspect the original folder).
///
/// # Errors
///
/// Propagates every error from the header, script, and output steps.
fn convert_staged(options: &ConvertOptions, config: &Config, out_dir: &Path) -> Result<ConvertOutcome, Error> {
    let work_dir = if options.dry_run { options.submod_dir.as_path() } else { out_dir };

    let mapping = convert_header(&work_dir.join(&options.header_file), options.dry_run)?;
    let modules = scripts::convert_scripts(work_dir, config, options.dry_run)?;
    let record = SubmodRecord::build(mapping, &modules);
    record.write(out_dir, &config.header_file_name, options.dry_run)?;

    if options.dry_run {
        return Ok(ConvertOutcome {
            bundle_dir: None,
            record,
        });
    }

    let name = record.name().ok_or(Error::MissingName)?;
    let bundle_dir = staging::finalize(out_dir, name, false)?;
    return Ok(ConvertOutcome {
        bundle_dir: Some(bundle_dir),
        record,
    });
}

/// Locate, neutralize, and parse the declaration in one header script.
///
/// # Errors
///
/// Returns `Error::PathNotFound` if the header does not exist, and any
/// locator, neutralizer, or parser error.
pub fn convert_header(path: &Path, dry_run: bool) -> Result<ArgumentMapping, Error> {
    let mut file = open_header(path, dry_run)?;

    let range = locator::locate(path, BufReader::new(&file))?;
    let text = neutralizer::extract_and_neutralize(&mut file, range, dry_run)?;
    tracing::info!("Code:\n{text}");

    return declaration::parse(&text);
}

/// Open the header for reading, and for writing unless `dry_run`.
///
/// # Errors
///
/// Returns `Error::PathNotFound` if the file does not exist, or `Error::Io`.
fn open_header(path: &Path, dry_run: bool) -> Result<File, Error> {
    return OpenOptions::new()
        .read(true)
        .write(!dry_run)
        .open(path)
        .map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                return Error::PathNotFound {
                    path: path.to_path_buf(),
                };
            }
            return Error::Io(err);
        });
}
