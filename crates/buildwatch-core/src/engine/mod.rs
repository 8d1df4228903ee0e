//! Change monitor
//!
//! The ChangeMonitor connects a project's top-level change source to the
//! build server's scheduler:
//! - Gating a poll on the previous build's outcome (`should_run`)
//! - Collecting modifications since the last build (`run`)
//! - Preparing the working copy and temporary labels before a build
//! - Labeling or rolling back after the build
//!
//! ## Architecture
//!
//! ```text
//!  scheduler ── poll() ──────────▶ ┌───────────────┐      ┌──────────────┐
//!            ── prepare_build() ─▶ │ ChangeMonitor │ ───▶ │ ChangeSource │
//!            ── complete_build() ▶ └───────────────┘      └──────────────┘
//!                                          │
//!                                          ▼
//!                                   MonitorEvent channel
//! ```
//!
//! Deciding *when* to poll is the scheduler's business. The monitor performs
//! exactly one operation per call and has no timeout of its own; a hung
//! backend blocks the call until it returns.

use crate::config::MonitorConfig;
use crate::error::Result;
use crate::integration::{IntegrationResult, Project};
use crate::traits::ChangeSource;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Events emitted by the ChangeMonitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    /// The trigger gate declined to poll
    PollSkipped { project: String },

    /// Modifications were found
    ModificationsDetected { project: String, count: usize },

    /// A poll completed without finding modifications
    NoModifications { project: String },

    /// A poll failed; the previous result is unchanged
    PollFailed { project: String, error: String },

    /// Source control was labeled after a successful build
    Labeled { project: String, label: String },

    /// Labeling failed
    LabelFailed { project: String, error: String },

    /// A temporary label was created before a build
    TemporaryLabelCreated { project: String },

    /// A temporary label was removed after a failed build
    TemporaryLabelDeleted { project: String },
}

/// Outcome of a single poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// `should_run` returned false; nothing was queried
    Skipped,
    /// The source was queried and reported nothing
    NoChanges,
    /// The source reported this many modifications
    Changes(usize),
}

impl PollOutcome {
    /// Whether a build should follow this poll
    pub fn should_build(&self) -> bool {
        matches!(self, PollOutcome::Changes(_))
    }
}

/// Run/trigger glue around a project's top-level change source
pub struct ChangeMonitor {
    /// Top-level source (often a composite)
    source: Box<dyn ChangeSource>,

    /// Project the source polls for
    project: Project,

    /// Apply the build label after successful builds
    label_on_success: bool,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<MonitorEvent>,
}

impl ChangeMonitor {
    /// Create a new change monitor
    ///
    /// # Returns
    ///
    /// A tuple of (monitor, event_receiver) where event_receiver yields monitor events
    pub fn new(
        source: Box<dyn ChangeSource>,
        project: Project,
        config: MonitorConfig,
    ) -> Result<(Self, mpsc::Receiver<MonitorEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let monitor = Self {
            source,
            project,
            label_on_success: config.label_on_success,
            event_tx: tx,
        };

        Ok((monitor, rx))
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn source(&self) -> &dyn ChangeSource {
        self.source.as_ref()
    }

    /// Forward the project-added lifecycle hook to the source
    pub async fn initialize(&self) -> Result<()> {
        info!(
            "Initializing {} source for project {}",
            self.source.source_name(),
            self.project.name
        );
        self.source.initialize(&self.project).await
    }

    /// Forward the project-removed lifecycle hook to the source
    pub async fn purge(&self) -> Result<()> {
        info!(
            "Purging {} source for project {}",
            self.source.source_name(),
            self.project.name
        );
        self.source.purge(&self.project).await
    }

    /// Poll the source for modifications since the last build
    ///
    /// On success `result.modifications` holds what was found. When the gate
    /// declines, or the query fails, `result` is not modified.
    pub async fn poll(&self, result: &mut IntegrationResult) -> Result<PollOutcome> {
        if !self.source.should_run(result, &self.project) {
            debug!(
                "Skipping poll for {} (previous status: {:?})",
                self.project.name, result.status
            );
            self.emit_event(MonitorEvent::PollSkipped {
                project: self.project.name.clone(),
            });
            return Ok(PollOutcome::Skipped);
        }

        if let Err(e) = self.source.run(result, &self.project).await {
            error!("Poll failed for {}: {}", self.project.name, e);
            self.emit_event(MonitorEvent::PollFailed {
                project: self.project.name.clone(),
                error: e.to_string(),
            });
            return Err(e);
        }

        let count = result.modifications.len();
        if count == 0 {
            debug!("No modifications for {}", self.project.name);
            self.emit_event(MonitorEvent::NoModifications {
                project: self.project.name.clone(),
            });
            Ok(PollOutcome::NoChanges)
        } else {
            info!("{} modification(s) detected for {}", count, self.project.name);
            self.emit_event(MonitorEvent::ModificationsDetected {
                project: self.project.name.clone(),
                count,
            });
            Ok(PollOutcome::Changes(count))
        }
    }

    /// Populate the working copy and mark the speculative build point
    pub async fn prepare_build(&self, result: &IntegrationResult) -> Result<()> {
        self.source.get_source(result).await?;

        if let Some(labeller) = self.source.temporary_labeller() {
            labeller.create_temporary_label().await?;
            self.emit_event(MonitorEvent::TemporaryLabelCreated {
                project: self.project.name.clone(),
            });
        }

        Ok(())
    }

    /// Stamp a finished build onto source control
    ///
    /// After a successful build the result's label is applied, if labeling on
    /// success is enabled. After any other outcome the temporary label from
    /// [`prepare_build`](Self::prepare_build) is removed.
    pub async fn complete_build(&self, result: &IntegrationResult) -> Result<()> {
        if result.succeeded() {
            if !self.label_on_success {
                return Ok(());
            }

            match self
                .source
                .label_source_control(&result.label, result.start_time)
                .await
            {
                Ok(()) => {
                    info!("Labeled {} as '{}'", self.project.name, result.label);
                    self.emit_event(MonitorEvent::Labeled {
                        project: self.project.name.clone(),
                        label: result.label.clone(),
                    });
                    Ok(())
                }
                Err(e) => {
                    error!("Failed to label {}: {}", self.project.name, e);
                    self.emit_event(MonitorEvent::LabelFailed {
                        project: self.project.name.clone(),
                        error: e.to_string(),
                    });
                    Err(e)
                }
            }
        } else {
            if let Some(labeller) = self.source.temporary_labeller() {
                labeller.delete_temporary_label().await?;
                self.emit_event(MonitorEvent::TemporaryLabelDeleted {
                    project: self.project.name.clone(),
                });
            }
            Ok(())
        }
    }

    /// Emit a monitor event
    fn emit_event(&self, event: MonitorEvent) {
        if self.event_tx.try_send(event).is_err() {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}
