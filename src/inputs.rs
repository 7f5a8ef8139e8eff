//! Expansion of command-line paths into the list of log files to merge.
//!
//! Paths named on the command line are required: failing to open one is
//! fatal. Files discovered by walking a directory are optional and are
//! skipped with a warning when they cannot be read.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::WeaveError;
use crate::source::Source;
use crate::stream::StreamState;

/// One file to merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub path: PathBuf,
    /// Named explicitly (as opposed to found inside a directory).
    pub required: bool,
}

/// Opened inputs plus the optional ones that had to be skipped.
#[derive(Debug, Default)]
pub struct OpenedInputs {
    pub sources: Vec<Source>,
    pub skipped: Vec<WeaveError>,
}

impl OpenedInputs {
    /// Paths of the opened sources, in input order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.sources.iter().map(|s| s.path().to_path_buf()).collect()
    }

    /// Turn the sources into merge streams, numbered in input order.
    pub fn into_streams(self) -> Vec<StreamState> {
        self.sources
            .into_iter()
            .enumerate()
            .map(|(index, source)| StreamState::new(index, source))
            .collect()
    }
}

/// Expand `paths` into a de-duplicated list of files, in order.
///
/// Directories are walked recursively with entries sorted by name.
pub fn resolve_inputs(paths: &[PathBuf]) -> Result<Vec<Input>, WeaveError> {
    let mut inputs = Vec::new();
    let mut seen = HashSet::new();

    for path in paths {
        let meta = fs::metadata(path).map_err(|source| WeaveError::Open {
            path: path.clone(),
            source,
        })?;
        if meta.is_dir() {
            let mut found = Vec::new();
            walk_dir(path, &mut found)?;
            for file in found {
                push_unique(&mut inputs, &mut seen, file, false);
            }
        } else {
            push_unique(&mut inputs, &mut seen, path.clone(), true);
        }
    }

    Ok(inputs)
}

/// Open every input. Required inputs that fail abort; optional ones are skipped.
pub fn open_inputs(inputs: &[Input]) -> Result<OpenedInputs, WeaveError> {
    let mut opened = OpenedInputs::default();
    for input in inputs {
        match Source::open(&input.path) {
            Ok(source) => opened.sources.push(source),
            Err(err) if !input.required => {
                tracing::debug!(path = %input.path.display(), error = %err, "skipping discovered file");
                opened.skipped.push(err);
            }
            // Sources opened so far are dropped (and closed) on return
            Err(err) => return Err(err),
        }
    }
    Ok(opened)
}

fn push_unique(inputs: &mut Vec<Input>, seen: &mut HashSet<PathBuf>, path: PathBuf, required: bool) {
    let key = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
    if seen.insert(key) {
        inputs.push(Input { path, required });
    }
}

fn walk_dir(dir: &Path, found: &mut Vec<PathBuf>) -> Result<(), WeaveError> {
    let entries = fs::read_dir(dir).map_err(|source| WeaveError::Open {
        path: dir.to_path_buf(),
        source,
    })?;
    // `file_type` does not follow symlinks
    let mut paths = entries
        .map(|entry| entry.and_then(|e| Ok((e.path(), e.file_type()?))))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| WeaveError::Open {
            path: dir.to_path_buf(),
            source,
        })?;
    paths.sort_by(|a, b| a.0.cmp(&b.0));

    for (path, file_type) in paths {
        if file_type.is_dir() {
            if let Err(err) = walk_dir(&path, found) {
                tracing::warn!(error = %err, "skipping unreadable directory");
            }
        } else if file_type.is_symlink() {
            // Linked files are merged, linked directories are not descended into
            if path.is_file() {
                found.push(path);
            } else {
                tracing::debug!(path = %path.display(), "not following symlink");
            }
        } else {
            found.push(path);
        }
    }
    Ok(())
}
