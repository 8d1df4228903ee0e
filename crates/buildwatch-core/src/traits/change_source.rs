// # Change Source Trait
//
// Defines the interface every version-control or filesystem backend implements.
//
// ## Implementations
//
// - Filesystem timestamps: `buildwatch-source-fs` crate
// - Several sources as one: `CompositeChangeSource` in this crate
// - Future: Git, Subversion, Perforce clients
//
// ## Usage
//
// ```rust,ignore
// use buildwatch_core::{ChangeSource, IntegrationResult, Project};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* ChangeSource implementation */;
//     let project = Project::new("app", "/var/builds/app");
//     let mut result = project.new_result();
//
//     if source.should_run(&result, &project) {
//         source.run(&mut result, &project).await?;
//         println!("{} modification(s)", result.modifications.len());
//     }
//
//     Ok(())
// }
// ```

use crate::integration::{IntegrationResult, IntegrationStatus, Project};
use crate::modification::Modification;
use crate::traits::TemporaryLabeller;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Trait for change source implementations
///
/// A change source reports what changed in a repository between two points
/// in time and stamps completed builds onto the repository's state.
///
/// # Statelessness
///
/// A change source keeps no in-memory cache of modifications. Every call to
/// [`get_modifications`](ChangeSource::get_modifications) re-queries the
/// backend. The only state is whatever external resource the source wraps
/// (a directory, a working copy).
///
/// # Lifetime
///
/// Sources are constructed once when configuration is loaded and live as
/// long as their project.
///
/// # Concurrency
///
/// Each call is a single awaited operation from the caller's perspective.
/// Sources must not assume they will be called concurrently; callers issue
/// one operation at a time per source.
#[async_trait]
pub trait ChangeSource: Send + Sync {
    /// Get all modifications detected between `from` and `to`
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Modification>)`: Detected changes, empty when nothing changed
    /// - `Err(Error)`: If the underlying repository cannot be reached and the
    ///   source is not configured to tolerate that
    async fn get_modifications(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Modification>, crate::Error>;

    /// Apply a named label to the repository's current state
    ///
    /// Must be safe to call when nothing changed. Calling twice with the same
    /// label must not corrupt the repository.
    async fn label_source_control(
        &self,
        label: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<(), crate::Error>;

    /// Decide whether a build should be attempted
    ///
    /// Pure function of the previous result and the project.
    fn should_run(&self, result: &IntegrationResult, project: &Project) -> bool;

    /// Query modifications since the last build and store them in `result`
    ///
    /// Uses `result.last_modification_date` as the lower bound and the
    /// current time as the upper bound. On error `result` is left untouched.
    async fn run(
        &self,
        result: &mut IntegrationResult,
        _project: &Project,
    ) -> Result<(), crate::Error> {
        let modifications = self
            .get_modifications(result.last_modification_date, Utc::now())
            .await?;
        result.modifications = modifications;
        Ok(())
    }

    /// Materialize the repository into the build's working directory
    async fn get_source(&self, result: &IntegrationResult) -> Result<(), crate::Error>;

    /// Backend-specific setup when the project is added
    async fn initialize(&self, _project: &Project) -> Result<(), crate::Error> {
        Ok(())
    }

    /// Backend-specific teardown when the project is removed
    async fn purge(&self, _project: &Project) -> Result<(), crate::Error> {
        Ok(())
    }

    /// Access the temporary labelling capability, if this source has one
    ///
    /// Sources that support temporary labels return `Some(self)`.
    fn temporary_labeller(&self) -> Option<&dyn TemporaryLabeller> {
        None
    }

    /// Get the source name (for logging/debugging)
    ///
    /// # Returns
    ///
    /// A static string identifying the backend (e.g., "filesystem", "multi")
    fn source_name(&self) -> &'static str;
}

/// Trigger policy shared by backends that gate on the previous build
///
/// Runs for fresh results and after a successful build. After a failed or
/// excepted build the project is only rebuilt when forced from outside.
pub fn run_after_success_only(result: &IntegrationResult) -> bool {
    matches!(
        result.status,
        IntegrationStatus::Unknown | IntegrationStatus::Success
    )
}

/// Helper trait for constructing change sources from configuration
pub trait ChangeSourceFactory: Send + Sync {
    /// Create a ChangeSource instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration block for this backend
    ///
    /// # Returns
    ///
    /// A boxed ChangeSource trait object
    fn create(
        &self,
        config: &crate::config::SourceConfig,
    ) -> Result<Box<dyn ChangeSource>, crate::Error>;
}
