// # buildwatch-core
//
// Change detection and labeling layer of the buildwatch CI server.
//
// ## Architecture Overview
//
// This library decides, for one project, what changed since the last build,
// whether a build should run, and how a completed build is stamped onto
// source control:
// - **ChangeSource**: Trait every version-control or filesystem backend implements
// - **TemporaryLabeller**: Optional capability for provisional labels
// - **CompositeChangeSource**: Several sources presented as one, in configured order
// - **SourceRegistry**: Plugin-based registry that builds sources from configuration
// - **ChangeMonitor**: Run/trigger glue between the scheduler and a source
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Backends live in plugin crates, the core only knows the trait
// 2. **Deterministic Output**: Merged modifications keep configuration order
// 3. **Plugin-Based**: Sources are registered dynamically, no hard-coded if-else
// 4. **Library-First**: Scheduling, build execution and persistence stay outside

pub mod traits;
pub mod modification;
pub mod integration;
pub mod sources;
pub mod engine;
pub mod registry;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{ChangeSource, ChangeSourceFactory, TemporaryLabeller};
pub use modification::Modification;
pub use integration::{IntegrationResult, IntegrationStatus, Project};
pub use sources::CompositeChangeSource;
pub use engine::{ChangeMonitor, MonitorEvent, PollOutcome};
pub use registry::SourceRegistry;
pub use config::{MonitorConfig, ProjectConfig, SourceConfig};
pub use error::{Error, Result};
