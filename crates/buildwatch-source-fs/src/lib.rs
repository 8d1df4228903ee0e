// # Filesystem Change Source
//
// This crate provides a timestamp-based change source for the buildwatch system.
//
// ## Purpose
//
// Treats a plain directory tree as a repository. Every regular file under the
// root, at any depth, is a candidate change; its last-write time is its change
// time. There is no label or checkout concept, so labeling and source
// retrieval are no-ops.
//
// ## Traversal Order
//
// Within each directory, files are reported before subdirectories are
// descended into, and both are visited in file-name order. Repeated queries
// over an unchanged tree therefore return identical sequences.

use buildwatch_core::config::SourceConfig;
use buildwatch_core::traits::{ChangeSource, ChangeSourceFactory, run_after_success_only};
use buildwatch_core::{Error, IntegrationResult, Modification, Project, Result, SourceRegistry};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Change source backed by file modification times under a directory
#[derive(Debug, Clone)]
pub struct FilesystemChangeSource {
    /// Root directory to walk
    repository_root: PathBuf,

    /// Report nothing instead of failing when the root is missing
    ignore_missing_root: bool,
}

impl FilesystemChangeSource {
    /// Create a new filesystem change source
    ///
    /// # Parameters
    ///
    /// - `repository_root`: Directory to walk on every query
    pub fn new(repository_root: impl Into<PathBuf>) -> Self {
        Self {
            repository_root: repository_root.into(),
            ignore_missing_root: false,
        }
    }

    /// Tolerate a missing root directory
    pub fn with_ignore_missing_root(mut self, ignore: bool) -> Self {
        self.ignore_missing_root = ignore;
        self
    }

    pub fn repository_root(&self) -> &Path {
        &self.repository_root
    }

    pub fn ignore_missing_root(&self) -> bool {
        self.ignore_missing_root
    }
}

#[async_trait]
impl ChangeSource for FilesystemChangeSource {
    async fn get_modifications(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Modification>> {
        // Only absence is tolerated; an unreadable root is an I/O failure
        let root_is_dir = match tokio::fs::metadata(&self.repository_root).await {
            Ok(metadata) => metadata.is_dir(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => return Err(e.into()),
        };

        if !root_is_dir {
            if self.ignore_missing_root {
                warn!(
                    "Repository root {} is missing, reporting no modifications",
                    self.repository_root.display()
                );
                return Ok(Vec::new());
            }
            return Err(Error::directory_not_found(&self.repository_root));
        }

        let root = self.repository_root.clone();
        let mods = tokio::task::spawn_blocking(move || scan(&root, from, to))
            .await
            .map_err(|e| Error::Other(format!("Filesystem scan task failed: {}", e)))??;

        debug!(
            "Found {} modification(s) under {}",
            mods.len(),
            self.repository_root.display()
        );
        Ok(mods)
    }

    async fn label_source_control(&self, label: &str, _timestamp: DateTime<Utc>) -> Result<()> {
        debug!(
            "Filesystem source has no labels, ignoring '{}' for {}",
            label,
            self.repository_root.display()
        );
        Ok(())
    }

    fn should_run(&self, result: &IntegrationResult, _project: &Project) -> bool {
        run_after_success_only(result)
    }

    async fn get_source(&self, _result: &IntegrationResult) -> Result<()> {
        Ok(())
    }

    fn source_name(&self) -> &'static str {
        "filesystem"
    }
}

/// Walk `root` and collect files modified within `from..=to`
fn scan(root: &Path, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Modification>> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by(files_before_directories);

    let mut modifications = Vec::new();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if vanished(&e) => {
                debug!("Entry disappeared during scan: {}", e);
                continue;
            }
            Err(e) => return Err(io::Error::from(e).into()),
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) if vanished(&e) => {
                debug!("File disappeared during scan: {}", e);
                continue;
            }
            Err(e) => return Err(io::Error::from(e).into()),
        };

        let modified_time: DateTime<Utc> = metadata.modified()?.into();
        if modified_time < from || modified_time > to {
            continue;
        }

        let folder_name = entry
            .path()
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        modifications.push(Modification::new(
            entry.file_name().to_string_lossy(),
            folder_name,
            modified_time,
        ));
    }

    Ok(modifications)
}

/// Files sort ahead of directories; each group by file name
fn files_before_directories(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

/// A non-root entry removed between listing and inspection
fn vanished(err: &walkdir::Error) -> bool {
    err.depth() > 0
        && err
            .io_error()
            .is_some_and(|e| e.kind() == io::ErrorKind::NotFound)
}

/// Factory for creating filesystem change sources
pub struct FilesystemFactory;

impl ChangeSourceFactory for FilesystemFactory {
    fn create(&self, config: &SourceConfig) -> Result<Box<dyn ChangeSource>> {
        match config {
            SourceConfig::Filesystem {
                repository_root,
                ignore_missing_root,
            } => Ok(Box::new(
                FilesystemChangeSource::new(repository_root.clone())
                    .with_ignore_missing_root(*ignore_missing_root),
            )),
            _ => Err(Error::config("Invalid config for filesystem source")),
        }
    }
}

/// Register the filesystem source with a registry
pub fn register(registry: &SourceRegistry) {
    registry.register_source("filesystem", Box::new(FilesystemFactory));
}
