//! File and directory loading for `.desc` sources.
//!
//! Content anomalies never fail a load; only I/O-level problems opening a
//! path surface as [`LoadError`], typed so callers can distinguish missing
//! files from permission and decode problems. Directory loads parse each
//! file independently and accumulate per-file failures instead of aborting.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::info;
use thiserror::Error;
use wayfare_data::{Map, Value};

use crate::parser::{ParseOutput, ParseWarning, parse_str};

/// I/O-level failure opening or reading one source path.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },
    #[error("{} is not valid UTF-8", path.display())]
    Decode { path: PathBuf },
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },
}

fn read_source(path: &Path) -> Result<String, LoadError> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound {
            path: path.to_path_buf(),
        },
        io::ErrorKind::PermissionDenied => LoadError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    String::from_utf8(bytes).map_err(|_| LoadError::Decode {
        path: path.to_path_buf(),
    })
}

/// Parse one `.desc` file.
///
/// # Errors
/// Returns an error only for I/O-level problems (missing file, permissions,
/// invalid UTF-8). Malformed content is reported via
/// [`ParseOutput::warnings`].
pub fn parse_file(path: impl AsRef<Path>) -> Result<ParseOutput, LoadError> {
    let path = path.as_ref();
    let source = read_source(path)?;
    Ok(parse_str(&source))
}

/// Result of loading a whole directory tree of `.desc` files.
#[derive(Debug)]
pub struct DirOutcome {
    /// Merged root object across all successfully parsed files.
    pub root: Value,
    /// Number of files parsed successfully.
    pub parsed: usize,
    /// Files that could not be read, with their individual errors.
    pub failures: Vec<(PathBuf, LoadError)>,
    /// Tolerated anomalies per file, in processing order.
    pub warnings: Vec<(PathBuf, ParseWarning)>,
}

/// Recursively load every `.desc` file under `dir` and merge the results.
///
/// Files are processed in lexicographic path order so the merge is
/// deterministic: each file's top-level keys are inserted into one
/// accumulated object and a later file overwrites an earlier one on key
/// collision (no deep merge). A file that fails to read is recorded in
/// [`DirOutcome::failures`] and the remaining files still load.
///
/// # Errors
/// Returns an error only when `dir` itself is missing, unreadable, or not a
/// directory.
pub fn load_dir(dir: impl AsRef<Path>) -> Result<DirOutcome, LoadError> {
    let dir = dir.as_ref();
    let meta = fs::metadata(dir).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound { path: dir.to_path_buf() },
        io::ErrorKind::PermissionDenied => LoadError::PermissionDenied { path: dir.to_path_buf() },
        _ => LoadError::Io {
            path: dir.to_path_buf(),
            source: e,
        },
    })?;
    if !meta.is_dir() {
        return Err(LoadError::NotADirectory { path: dir.to_path_buf() });
    }
    let mut files = Vec::new();
    collect_desc_files(dir, &mut files);
    files.sort();

    let mut root = Map::new();
    let mut parsed = 0usize;
    let mut failures = Vec::new();
    let mut warnings = Vec::new();
    for file in files {
        match parse_file(&file) {
            Ok(output) => {
                parsed += 1;
                if let Value::Object(map) = output.root {
                    for (key, value) in map {
                        root.insert(key, value);
                    }
                }
                warnings.extend(output.warnings.into_iter().map(|w| (file.clone(), w)));
            },
            Err(e) => failures.push((file, e)),
        }
    }
    info!("{} .desc files loaded from {}", parsed, dir.display());
    Ok(DirOutcome {
        root: Value::Object(root),
        parsed,
        failures,
        warnings,
    })
}

fn collect_desc_files(dir: &Path, out: &mut Vec<PathBuf>) {
    if let Ok(rd) = fs::read_dir(dir) {
        for ent in rd.flatten() {
            let p = ent.path();
            if p.is_dir() {
                collect_desc_files(&p, out);
                continue;
            }
            if p.extension().and_then(|e| e.to_str()) == Some("desc") {
                out.push(p);
            }
        }
    }
}
