//! Test doubles and common utilities for contract tests
//!
//! The doubles record every call into a shared journal so tests can assert
//! the exact order in which a composite visits its children.

#![allow(dead_code)]

use async_trait::async_trait;
use buildwatch_core::error::{Error, Result};
use buildwatch_core::traits::{ChangeSource, TemporaryLabeller, run_after_success_only};
use buildwatch_core::{IntegrationResult, Modification, Project};
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

/// Shared, ordered record of calls made on test sources
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// A source that returns fixed modifications and journals each call
pub struct RecordingSource {
    name: &'static str,
    modifications: Vec<Modification>,
    journal: Journal,
    fail_label: bool,
    fail_query: bool,
    temporary_labels: bool,
    fail_temporary_label: bool,
}

impl RecordingSource {
    pub fn new(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            modifications: Vec::new(),
            journal: journal.clone(),
            fail_label: false,
            fail_query: false,
            temporary_labels: false,
            fail_temporary_label: false,
        }
    }

    /// Report one modification per file name, all stamped at `at`
    pub fn with_files(mut self, files: &[&str], at: DateTime<Utc>) -> Self {
        self.modifications = files
            .iter()
            .map(|f| Modification::new(*f, format!("/{}", self.name), at))
            .collect();
        self
    }

    pub fn failing_label(mut self) -> Self {
        self.fail_label = true;
        self
    }

    pub fn failing_query(mut self) -> Self {
        self.fail_query = true;
        self
    }

    pub fn with_temporary_labels(mut self) -> Self {
        self.temporary_labels = true;
        self
    }

    /// Expose temporary labels whose create and delete both fail
    pub fn failing_temporary_label(mut self) -> Self {
        self.temporary_labels = true;
        self.fail_temporary_label = true;
        self
    }
}

#[async_trait]
impl ChangeSource for RecordingSource {
    async fn get_modifications(
        &self,
        _from: DateTime<Utc>,
        _to: DateTime<Utc>,
    ) -> Result<Vec<Modification>> {
        self.journal.record(format!("{}:query", self.name));
        if self.fail_query {
            return Err(Error::backend_unavailable(self.name, "connection refused"));
        }
        Ok(self.modifications.clone())
    }

    async fn label_source_control(&self, label: &str, _timestamp: DateTime<Utc>) -> Result<()> {
        self.journal.record(format!("{}:label:{}", self.name, label));
        if self.fail_label {
            return Err(Error::label_failure(self.name, label, "repository locked"));
        }
        Ok(())
    }

    fn should_run(&self, result: &IntegrationResult, _project: &Project) -> bool {
        run_after_success_only(result)
    }

    async fn get_source(&self, _result: &IntegrationResult) -> Result<()> {
        self.journal.record(format!("{}:get_source", self.name));
        Ok(())
    }

    async fn initialize(&self, _project: &Project) -> Result<()> {
        self.journal.record(format!("{}:initialize", self.name));
        Ok(())
    }

    async fn purge(&self, _project: &Project) -> Result<()> {
        self.journal.record(format!("{}:purge", self.name));
        Ok(())
    }

    fn temporary_labeller(&self) -> Option<&dyn TemporaryLabeller> {
        if self.temporary_labels {
            Some(self)
        } else {
            None
        }
    }

    fn source_name(&self) -> &'static str {
        self.name
    }
}

#[async_trait]
impl TemporaryLabeller for RecordingSource {
    async fn create_temporary_label(&self) -> Result<()> {
        self.journal.record(format!("{}:temp_create", self.name));
        if self.fail_temporary_label {
            return Err(Error::label_failure(self.name, "<temporary>", "tag rejected"));
        }
        Ok(())
    }

    async fn delete_temporary_label(&self) -> Result<()> {
        self.journal.record(format!("{}:temp_delete", self.name));
        if self.fail_temporary_label {
            return Err(Error::label_failure(self.name, "<temporary>", "tag rejected"));
        }
        Ok(())
    }
}

/// A fixed reference instant for deterministic timestamps
pub fn base_time() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + Duration::days(20_000)
}

pub fn test_project() -> Project {
    Project::new("contract", "/tmp/buildwatch-contract")
}

pub fn file_names(mods: &[Modification]) -> Vec<&str> {
    mods.iter().map(|m| m.file_name()).collect()
}
