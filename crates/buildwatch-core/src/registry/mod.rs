//! Plugin-based source registry
//!
//! The registry allows change source backends to be registered
//! dynamically at runtime, avoiding hardcoded if-else chains.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use buildwatch_core::registry::SourceRegistry;
//! use buildwatch_core::config::SourceConfig;
//!
//! let registry = SourceRegistry::new();
//! buildwatch_source_fs::register(&registry);
//!
//! let config = SourceConfig::multi(vec![
//!     SourceConfig::filesystem("/srv/app"),
//!     SourceConfig::filesystem("/srv/libs"),
//! ]);
//! let source = registry.create_source(&config)?;
//! ```
//!
//! ## Composites
//!
//! `multi` configurations are built by the registry itself: each child is
//! created in configured order and the results are wrapped in a
//! [`CompositeChangeSource`]. No factory is registered for `multi`.

use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::sources::CompositeChangeSource;
use crate::traits::{ChangeSource, ChangeSourceFactory};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// Registry for plugin-based change source creation
///
/// The registry maintains a map of source type names to factory objects,
/// allowing dynamic instantiation of sources based on configuration.
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct SourceRegistry {
    factories: RwLock<HashMap<String, Box<dyn ChangeSourceFactory>>>,
}

impl SourceRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a change source factory
    ///
    /// # Parameters
    ///
    /// - `name`: Source type name (e.g., "filesystem", "git")
    /// - `factory`: Factory object for creating source instances
    ///
    /// Registering a name twice replaces the earlier factory.
    pub fn register_source(&self, name: impl Into<String>, factory: Box<dyn ChangeSourceFactory>) {
        let name = name.into();
        let mut factories = self
            .factories
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        factories.insert(name, factory);
    }

    /// Create a change source from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn ChangeSource>)`: Created source instance
    /// - `Err(Error)`: If the configuration is invalid, a source type is not
    ///   registered, or creation fails
    pub fn create_source(&self, config: &SourceConfig) -> Result<Box<dyn ChangeSource>> {
        config.validate()?;
        self.build(config)
    }

    fn build(&self, config: &SourceConfig) -> Result<Box<dyn ChangeSource>> {
        if let SourceConfig::Multi { sources } = config {
            let children = sources
                .iter()
                .map(|child| self.build(child))
                .collect::<Result<Vec<_>>>()?;
            debug!("Built composite source with {} child(ren)", children.len());
            return Ok(Box::new(CompositeChangeSource::new(children)));
        }

        let source_type = config.type_name();
        let factories = self
            .factories
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let factory = factories
            .get(source_type)
            .ok_or_else(|| Error::unknown_source_type(source_type))?;

        factory.create(config)
    }

    /// List all registered source types
    pub fn list_sources(&self) -> Vec<String> {
        let factories = self
            .factories
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<_> = factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a source type is registered
    pub fn has_source(&self, name: &str) -> bool {
        let factories = self
            .factories
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        factories.contains_key(name)
    }
}
