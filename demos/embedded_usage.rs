//! Minimal embedding example for buildwatch-core
//!
//! An application supplies its own in-process change source, combines it
//! with a filesystem source under a composite, and drives one build cycle:
//! poll, prepare, complete.

use async_trait::async_trait;
use buildwatch_core::traits::{ChangeSource, TemporaryLabeller};
use buildwatch_core::{
    ChangeMonitor, CompositeChangeSource, IntegrationResult, IntegrationStatus, Modification,
    MonitorConfig, Project, Result,
};
use buildwatch_source_fs::FilesystemChangeSource;
use chrono::{DateTime, Utc};
use std::sync::Mutex;

/// A change log kept in memory, e.g. fed by webhook deliveries
struct ChangeLogSource {
    entries: Vec<Modification>,
    labels: Mutex<Vec<String>>,
}

impl ChangeLogSource {
    fn new(entries: Vec<Modification>) -> Self {
        Self {
            entries,
            labels: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ChangeSource for ChangeLogSource {
    async fn get_modifications(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Modification>> {
        Ok(self
            .entries
            .iter()
            .filter(|m| m.modified_time() >= from && m.modified_time() <= to)
            .cloned()
            .collect())
    }

    async fn label_source_control(&self, label: &str, _timestamp: DateTime<Utc>) -> Result<()> {
        if let Ok(mut labels) = self.labels.lock() {
            labels.push(label.to_string());
        }
        Ok(())
    }

    fn should_run(&self, _result: &IntegrationResult, _project: &Project) -> bool {
        true
    }

    async fn get_source(&self, _result: &IntegrationResult) -> Result<()> {
        Ok(())
    }

    fn temporary_labeller(&self) -> Option<&dyn TemporaryLabeller> {
        Some(self)
    }

    fn source_name(&self) -> &'static str {
        "changelog"
    }
}

#[async_trait]
impl TemporaryLabeller for ChangeLogSource {
    async fn create_temporary_label(&self) -> Result<()> {
        tracing::info!("changelog: marking speculative build point");
        Ok(())
    }

    async fn delete_temporary_label(&self) -> Result<()> {
        tracing::info!("changelog: removing speculative build point");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let checkout = std::env::temp_dir().join("buildwatch-demo");
    std::fs::create_dir_all(&checkout)?;
    std::fs::write(checkout.join("README.md"), "demo")?;

    let changelog = ChangeLogSource::new(vec![
        Modification::new("api.rs", "services/api", Utc::now())
            .with_author("dana")
            .with_comment("Add health endpoint")
            .with_revision("a1b2c3"),
    ]);

    let composite = CompositeChangeSource::new(vec![
        Box::new(changelog),
        Box::new(FilesystemChangeSource::new(&checkout)),
    ]);

    let project = Project::new("demo", &checkout);
    let config = MonitorConfig {
        label_on_success: true,
        ..MonitorConfig::default()
    };
    let (monitor, mut events) = ChangeMonitor::new(Box::new(composite), project, config)?;

    let mut result = monitor.project().new_result().with_label("demo-1");
    let outcome = monitor.poll(&mut result).await?;
    println!("Poll outcome: {:?}", outcome);

    for m in &result.modifications {
        println!(
            "  {}/{} by {}",
            m.folder_name(),
            m.file_name(),
            m.author().unwrap_or("<unknown>")
        );
    }

    if outcome.should_build() {
        monitor.prepare_build(&result).await?;
        // The build would run here
        result.status = IntegrationStatus::Success;
        monitor.complete_build(&result).await?;
    }

    while let Ok(event) = events.try_recv() {
        println!("Event: {:?}", event);
    }

    Ok(())
}
