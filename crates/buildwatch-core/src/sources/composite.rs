// # Composite Change Source
//
// Presents an ordered list of change sources as a single source.
//
// ## Ordering
//
// Children are queried one after another in configuration order. Their
// modifications are appended child by child, keeping each child's own
// ordering. Nothing is re-sorted by timestamp: different backends run on
// different clocks, so only configuration order is meaningful.
//
// ## Failure Policy
//
// - `get_modifications`: the first failing child aborts the query
// - `label_source_control`: the first failing child aborts labeling of the
//   remaining children (a partially labeled build must be surfaced)
// - temporary labels: applied only to children that expose the capability

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, error};

use crate::Error;
use crate::integration::{IntegrationResult, Project};
use crate::modification::Modification;
use crate::traits::{ChangeSource, TemporaryLabeller};

/// A change source that fans out to an ordered list of children
///
/// The composite exclusively owns its children. An empty composite is valid
/// and reports no modifications.
///
/// # Example
///
/// ```rust,ignore
/// use buildwatch_core::CompositeChangeSource;
///
/// let composite = CompositeChangeSource::new(vec![
///     Box::new(app_repo),
///     Box::new(shared_libs),
/// ]);
///
/// // app_repo's modifications first, then shared_libs'
/// let mods = composite.get_modifications(from, to).await?;
/// ```
#[derive(Default)]
pub struct CompositeChangeSource {
    sources: Vec<Box<dyn ChangeSource>>,
}

impl CompositeChangeSource {
    /// Create a composite over the given children, in the given order
    pub fn new(sources: Vec<Box<dyn ChangeSource>>) -> Self {
        Self { sources }
    }

    /// Append a child after the existing ones
    pub fn push(&mut self, source: Box<dyn ChangeSource>) {
        self.sources.push(source);
    }

    /// The children, in configured order
    pub fn sources(&self) -> &[Box<dyn ChangeSource>] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl std::fmt::Debug for CompositeChangeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.sources.iter().map(|s| s.source_name()).collect();
        f.debug_struct("CompositeChangeSource")
            .field("sources", &names)
            .finish()
    }
}

#[async_trait]
impl ChangeSource for CompositeChangeSource {
    async fn get_modifications(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Modification>, Error> {
        let mut modifications = Vec::new();

        for (index, source) in self.sources.iter().enumerate() {
            let mods = source.get_modifications(from, to).await?;
            debug!(
                "Source #{} ({}) reported {} modification(s)",
                index,
                source.source_name(),
                mods.len()
            );
            modifications.extend(mods);
        }

        Ok(modifications)
    }

    async fn label_source_control(
        &self,
        label: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<(), Error> {
        for (index, source) in self.sources.iter().enumerate() {
            if let Err(e) = source.label_source_control(label, timestamp).await {
                error!(
                    "Labeling aborted at source #{} ({}) of {}: {}",
                    index,
                    source.source_name(),
                    self.sources.len(),
                    e
                );
                return Err(e);
            }
            debug!("Applied label '{}' to source #{}", label, index);
        }

        Ok(())
    }

    /// Always true: the composite does not gate on the previous build
    ///
    /// Children's own `should_run` policies are not consulted. `run` queries
    /// every child regardless.
    fn should_run(&self, _result: &IntegrationResult, _project: &Project) -> bool {
        true
    }

    async fn get_source(&self, result: &IntegrationResult) -> Result<(), Error> {
        for source in &self.sources {
            source.get_source(result).await?;
        }
        Ok(())
    }

    fn temporary_labeller(&self) -> Option<&dyn TemporaryLabeller> {
        Some(self)
    }

    fn source_name(&self) -> &'static str {
        "multi"
    }
}

#[async_trait]
impl TemporaryLabeller for CompositeChangeSource {
    async fn create_temporary_label(&self) -> Result<(), Error> {
        for source in &self.sources {
            match source.temporary_labeller() {
                Some(labeller) => labeller.create_temporary_label().await?,
                None => debug!(
                    "Source {} has no temporary labels, skipping",
                    source.source_name()
                ),
            }
        }
        Ok(())
    }

    async fn delete_temporary_label(&self) -> Result<(), Error> {
        for source in &self.sources {
            if let Some(labeller) = source.temporary_labeller() {
                labeller.delete_temporary_label().await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integration::IntegrationStatus;

    struct FixedSource {
        mods: Vec<Modification>,
    }

    #[async_trait]
    impl ChangeSource for FixedSource {
        async fn get_modifications(
            &self,
            _from: DateTime<Utc>,
            _to: DateTime<Utc>,
        ) -> Result<Vec<Modification>, Error> {
            Ok(self.mods.clone())
        }

        async fn label_source_control(&self, _: &str, _: DateTime<Utc>) -> Result<(), Error> {
            Ok(())
        }

        fn should_run(&self, _: &IntegrationResult, _: &Project) -> bool {
            false
        }

        async fn get_source(&self, _: &IntegrationResult) -> Result<(), Error> {
            Ok(())
        }

        fn source_name(&self) -> &'static str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_empty_composite_reports_nothing() {
        let composite = CompositeChangeSource::default();
        let mods = composite
            .get_modifications(DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC)
            .await
            .unwrap();
        assert!(mods.is_empty());
        assert!(composite.is_empty());
    }

    #[tokio::test]
    async fn test_run_writes_aggregate_into_result() {
        let at = DateTime::<Utc>::UNIX_EPOCH;
        let mut composite = CompositeChangeSource::default();
        composite.push(Box::new(FixedSource {
            mods: vec![Modification::new("a", "/x", at)],
        }));
        composite.push(Box::new(FixedSource { mods: Vec::new() }));
        composite.push(Box::new(FixedSource {
            mods: vec![Modification::new("b", "/y", at)],
        }));

        let project = Project::new("p", "/tmp/p");
        let mut result = IntegrationResult::new("p");
        composite.run(&mut result, &project).await.unwrap();

        let names: Vec<_> = result.modifications.iter().map(|m| m.file_name()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_should_run_ignores_children_and_status() {
        let composite =
            CompositeChangeSource::new(vec![Box::new(FixedSource { mods: Vec::new() })]);
        let project = Project::new("p", "/tmp/p");

        for status in [
            IntegrationStatus::Unknown,
            IntegrationStatus::Success,
            IntegrationStatus::Failure,
            IntegrationStatus::Exception,
        ] {
            let result = IntegrationResult::new("p").with_status(status);
            assert!(composite.should_run(&result, &project));
        }
    }

    #[test]
    fn test_debug_lists_child_names() {
        let composite =
            CompositeChangeSource::new(vec![Box::new(FixedSource { mods: Vec::new() })]);
        assert_eq!(
            format!("{:?}", composite),
            "CompositeChangeSource { sources: [\"fixed\"] }"
        );
    }
}
