//! Build records consumed by change sources
//!
//! [`IntegrationResult`] and [`Project`] belong to the build server. This
//! crate reads the prior status and the last modification date from a
//! result, and writes the detected modifications back into it.

use crate::modification::Modification;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of a previous integration (build)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationStatus {
    /// No build has completed yet
    #[default]
    Unknown,
    /// The build succeeded
    Success,
    /// The build ran and failed
    Failure,
    /// The build could not complete because of an error in the build server
    Exception,
}

/// State of one integration, carried between poll cycles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationResult {
    /// Name of the project this result belongs to
    pub project_name: String,

    /// Status of the build
    #[serde(default)]
    pub status: IntegrationStatus,

    /// Label assigned to the build (applied to source control on success)
    #[serde(default)]
    pub label: String,

    /// When the build started
    pub start_time: DateTime<Utc>,

    /// Inclusive lower bound for the next modification query
    pub last_modification_date: DateTime<Utc>,

    /// Directory the build checks sources out into
    #[serde(default)]
    pub working_directory: PathBuf,

    /// Modifications detected for this build
    #[serde(default)]
    pub modifications: Vec<Modification>,
}

impl IntegrationResult {
    /// Create a fresh result with unknown status
    ///
    /// The last modification date starts at the minimum timestamp so that the
    /// first query reports everything.
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            status: IntegrationStatus::Unknown,
            label: String::new(),
            start_time: Utc::now(),
            last_modification_date: DateTime::<Utc>::MIN_UTC,
            working_directory: PathBuf::new(),
            modifications: Vec::new(),
        }
    }

    /// Create a result whose build succeeded
    pub fn successful(project_name: impl Into<String>) -> Self {
        Self::new(project_name).with_status(IntegrationStatus::Success)
    }

    /// Create a result whose build failed
    pub fn failed(project_name: impl Into<String>) -> Self {
        Self::new(project_name).with_status(IntegrationStatus::Failure)
    }

    /// Create a result whose build ended with an exception
    pub fn exceptioned(project_name: impl Into<String>) -> Self {
        Self::new(project_name).with_status(IntegrationStatus::Exception)
    }

    pub fn with_status(mut self, status: IntegrationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_last_modification_date(mut self, date: DateTime<Utc>) -> Self {
        self.last_modification_date = date;
        self
    }

    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = dir.into();
        self
    }

    /// Whether no build has completed yet for this result
    pub fn is_initial(&self) -> bool {
        self.status == IntegrationStatus::Unknown
    }

    pub fn succeeded(&self) -> bool {
        self.status == IntegrationStatus::Success
    }

    pub fn has_modifications(&self) -> bool {
        !self.modifications.is_empty()
    }

    /// Latest timestamp among the detected modifications
    ///
    /// Only meaningful when all modifications come from one clock domain.
    pub fn latest_modification_time(&self) -> Option<DateTime<Utc>> {
        self.modifications.iter().map(|m| m.modified_time()).max()
    }
}

/// The project a change source polls on behalf of
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project name
    pub name: String,

    /// Directory builds run in
    pub working_directory: PathBuf,

    /// Directory build artifacts are written to
    pub artifact_directory: PathBuf,
}

impl Project {
    pub fn new(name: impl Into<String>, working_directory: impl Into<PathBuf>) -> Self {
        let working_directory = working_directory.into();
        Self {
            name: name.into(),
            artifact_directory: working_directory.join("artifacts"),
            working_directory,
        }
    }

    pub fn with_artifact_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_directory = dir.into();
        self
    }

    /// Create a fresh result for this project, checked out into its working directory
    pub fn new_result(&self) -> IntegrationResult {
        IntegrationResult::new(self.name.clone()).with_working_directory(&self.working_directory)
    }
}
