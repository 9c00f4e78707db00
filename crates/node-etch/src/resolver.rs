//! Input resolution
//!
//! Validates the target repository path and lists the Python sources that
//! may hold node definitions.

use crate::diagnostics::{EtchError, EtchResult};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Directories never descended into in recursive mode
const SKIPPED_DIRS: &[&str] = &["__pycache__", "venv", ".venv", "node_modules"];

/// Strip the trailing quote and separator characters a shell may leave on
/// a directory argument (`"C:\nodes\"`).
pub fn clean_path_arg(raw: &str) -> PathBuf {
    let trimmed = raw.trim().trim_end_matches(['"', '\'', '\\', '/']);
    if trimmed.is_empty() && !raw.trim().is_empty() {
        // the argument was nothing but separators, i.e. the filesystem root
        return PathBuf::from(&raw.trim()[..1]);
    }
    PathBuf::from(trimmed)
}

/// A validated target repository
#[derive(Debug, Clone)]
pub struct SourceResolver {
    /// Canonical repository root
    root: PathBuf,
    /// Repository name used for headings and output names
    module_name: String,
    recursive: bool,
}

impl SourceResolver {
    /// Validate `path` and create a resolver for it.
    ///
    /// Fails with [`EtchError::NotFound`] or [`EtchError::NotADirectory`].
    pub fn new(path: impl AsRef<Path>) -> EtchResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(EtchError::NotFound(path.to_path_buf()));
        }
        if !path.is_dir() {
            return Err(EtchError::NotADirectory(path.to_path_buf()));
        }

        let root = path.canonicalize()?;
        let module_name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "nodes".to_string());

        tracing::debug!(root = %root.display(), "resolved target repository");

        Ok(Self {
            root,
            module_name,
            recursive: false,
        })
    }

    /// Descend into subdirectories
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Canonical repository root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Final component of the repository path
    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// Python source files, sorted by path
    pub fn python_files(&self) -> EtchResult<Vec<PathBuf>> {
        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.root)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry));

        for entry in walker {
            let entry = entry.map_err(|e| match e.into_io_error() {
                Some(io) => EtchError::Io(io),
                None => EtchError::config("filesystem loop while scanning repository"),
            })?;
            let path = entry.path();
            if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "py") {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        tracing::debug!(count = files.len(), "found python sources");
        Ok(files)
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref())
}
