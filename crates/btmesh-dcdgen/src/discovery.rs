//! Input discovery: locating the `.btmeshconf` config and `.dcd` fragments

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const CONFIG_EXTENSION: &str = "btmeshconf";
const FRAGMENT_EXTENSION: &str = "dcd";

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Failed to list input directory: {0}")]
    IoError(#[from] std::io::Error),
    #[error("No 'btmeshconf' file found in {0}")]
    NoConfig(PathBuf),
}

/// Files that make up one generator run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inputs {
    /// The `.btmeshconf` file
    pub config: PathBuf,
    /// Fragment files in the order they are folded
    pub fragments: Vec<PathBuf>,
}

/// Find the generator inputs for `input`
///
/// `input` is either a directory holding a `.btmeshconf` and any number of
/// `.dcd` files, or the `.btmeshconf` file itself, in which case fragments
/// are taken from its directory. Files are considered in name order so the
/// fold order does not depend on the filesystem.
pub fn discover(input: &Path) -> Result<Inputs, DiscoveryError> {
    if input.is_dir() {
        let files = list_files(input)?;
        let config = files
            .iter()
            .find(|p| has_extension(p, CONFIG_EXTENSION))
            .cloned()
            .ok_or_else(|| DiscoveryError::NoConfig(input.to_path_buf()))?;
        let fragments = files
            .into_iter()
            .filter(|p| has_extension(p, FRAGMENT_EXTENSION))
            .collect();
        Ok(Inputs { config, fragments })
    } else {
        let dir = match input.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let fragments = list_files(dir)?
            .into_iter()
            .filter(|p| has_extension(p, FRAGMENT_EXTENSION))
            .collect();
        Ok(Inputs {
            config: input.to_path_buf(),
            fragments,
        })
    }
}

fn list_files(dir: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    debug!(dir = %dir.display(), count = files.len(), "Listed input files");
    Ok(files)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}
