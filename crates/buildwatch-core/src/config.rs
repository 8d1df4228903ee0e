//! Configuration types for the buildwatch system
//!
//! This module defines the declarative configuration blocks change sources
//! and the monitor are built from.

use crate::integration::Project;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for one project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name
    pub name: String,

    /// Directory builds run in
    pub working_directory: PathBuf,

    /// Directory build artifacts are written to (defaults under the working directory)
    #[serde(default)]
    pub artifact_directory: Option<PathBuf>,

    /// Top-level change source
    pub source: SourceConfig,

    /// Optional monitor settings
    #[serde(default)]
    pub monitor: MonitorConfig,
}

impl ProjectConfig {
    /// Create a new project configuration with default monitor settings
    pub fn new(
        name: impl Into<String>,
        working_directory: impl Into<PathBuf>,
        source: SourceConfig,
    ) -> Self {
        Self {
            name: name.into(),
            working_directory: working_directory.into(),
            artifact_directory: None,
            source,
            monitor: MonitorConfig::default(),
        }
    }

    /// Parse a configuration from JSON text
    pub fn from_json(text: &str) -> Result<Self, crate::Error> {
        let config: Self = serde_json::from_str(text)?;
        Ok(config)
    }

    /// Load a configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, crate::Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&text)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.name.trim().is_empty() {
            return Err(crate::Error::config("Project name cannot be empty"));
        }

        self.source.validate()?;
        self.monitor.validate()?;

        Ok(())
    }

    /// Build the project description handed to change sources
    pub fn project(&self) -> Project {
        let project = Project::new(self.name.clone(), self.working_directory.clone());
        match &self.artifact_directory {
            Some(dir) => project.with_artifact_directory(dir),
            None => project,
        }
    }
}

/// Change source configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Detect changes from file modification times under a directory
    Filesystem {
        /// Root directory to walk
        repository_root: PathBuf,
        /// Report zero modifications instead of failing when the root is missing
        #[serde(default)]
        ignore_missing_root: bool,
    },

    /// Several sources presented as one, queried in the listed order
    Multi {
        /// Child sources (may be empty)
        #[serde(default)]
        sources: Vec<SourceConfig>,
    },

    /// Custom source
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl SourceConfig {
    /// Convenience constructor for a filesystem source
    pub fn filesystem(repository_root: impl Into<PathBuf>) -> Self {
        SourceConfig::Filesystem {
            repository_root: repository_root.into(),
            ignore_missing_root: false,
        }
    }

    /// Convenience constructor for a composite source
    pub fn multi(sources: Vec<SourceConfig>) -> Self {
        SourceConfig::Multi { sources }
    }

    /// Validate the source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            SourceConfig::Filesystem {
                repository_root, ..
            } => {
                if repository_root.as_os_str().is_empty() {
                    return Err(crate::Error::config(
                        "Filesystem source repository_root cannot be empty",
                    ));
                }
                Ok(())
            }
            SourceConfig::Multi { sources } => {
                for source in sources {
                    source.validate()?;
                }
                Ok(())
            }
            SourceConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom source factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config("Custom source config cannot be null"));
                }
                Ok(())
            }
        }
    }

    /// Get the source type name (the registry key)
    pub fn type_name(&self) -> &str {
        match self {
            SourceConfig::Filesystem { .. } => "filesystem",
            SourceConfig::Multi { .. } => "multi",
            SourceConfig::Custom { factory, .. } => factory,
        }
    }
}

/// Monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Apply the build label to source control after a successful build
    #[serde(default)]
    pub label_on_success: bool,

    /// Capacity of the monitor event channel
    ///
    /// When full, new events are dropped with a warning log.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl MonitorConfig {
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config(
                "Monitor event_channel_capacity must be > 0",
            ));
        }
        Ok(())
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            label_on_success: false,
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_event_channel_capacity() -> usize {
    100
}
