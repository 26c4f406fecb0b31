//! Script conversion: source scripts become modules, compiled scripts are removed.

use std::path::Path;

use walkdir::{DirEntry, WalkDir};

use crate::config::Config;
use crate::error::Error;

/// What to do with one script-like file found in the bundle.
#[derive(Debug, PartialEq, Eq)]
enum ScriptAction {
    /// Source script: rename to a module and record its name.
    Convert,
    /// Compiled script: delete.
    Remove,
    /// Matches the script extension prefix but is neither (e.g. already a module).
    Skip,
}

/// Turn every script under `dir` into a module and return the module names.
///
/// Compiled scripts and files whose extension starts with the script
/// extension are considered. Compiled scripts are deleted, source scripts are renamed to the module
/// extension, and anything else is left alone. Module names are paths
/// relative to `dir`, without extension, joined with `/`, in file-name order.
/// Hidden files and directories are ignored. With `dry_run` nothing is
/// touched but the names are still collected.
///
/// # Errors
///
/// Returns `Error::Walk` if the tree cannot be traversed,
/// or `Error::Io` if a rename or removal fails.
pub fn convert_scripts(dir: &Path, config: &Config, dry_run: bool) -> Result<Vec<String>, Error> {
    tracing::info!("Converting scripts in {}", dir.display());

    // Collect first so renames cannot feed back into the walk.
    let entries: Vec<DirEntry> = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| return e.depth() == 0 || !is_hidden(e))
        .collect::<Result<_, _>>()?;

    let mut modules = Vec::new();
    for entry in entries.iter().filter(|e| return e.file_type().is_file()) {
        let path = entry.path();
        let relative = path.strip_prefix(dir).unwrap_or(path);
        let Some(action) = classify(path, config) else {
            continue;
        };

        match action {
            ScriptAction::Remove => {
                tracing::info!("Removing compiled script '{}'", relative.display());
                if !dry_run {
                    std::fs::remove_file(path)?;
                }
            },
            ScriptAction::Convert => {
                tracing::info!("Converting '{}' into a module", relative.display());
                if !dry_run {
                    std::fs::rename(path, path.with_extension(&config.module_ext))?;
                }
                modules.push(module_name(relative));
            },
            ScriptAction::Skip => {
                tracing::info!("Skipping '{}'", relative.display());
            },
        }
    }

    tracing::info!(count = modules.len(), "Converted scripts");
    return Ok(modules);
}

/// Decide what to do with a file, or `None` if it is not script-like at all.
fn classify(path: &Path, config: &Config) -> Option<ScriptAction> {
    let ext = path.extension()?.to_str()?;
    if ext == config.compiled_ext {
        return Some(ScriptAction::Remove);
    }
    if !ext.starts_with(config.script_ext.as_str()) {
        return None;
    }
    if ext == config.script_ext {
        return Some(ScriptAction::Convert);
    }
    return Some(ScriptAction::Skip);
}

/// Dot-files and dot-directories.
fn is_hidden(entry: &DirEntry) -> bool {
    return entry.file_name().to_str().is_some_and(|name| return name.starts_with('.'));
}

/// Relative path without extension, `/`-separated on every platform.
fn module_name(relative: &Path) -> String {
    return relative
        .with_extension("")
        .components()
        .map(|c| return c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");
}
