//! Core traits for the buildwatch system
//!
//! This module defines the abstract interfaces that all backends must follow.
//!
//! - [`ChangeSource`]: Report modifications and label repository state
//! - [`TemporaryLabeller`]: Optional provisional labels around a build

pub mod change_source;
pub mod temporary_labeller;

pub use change_source::{ChangeSource, ChangeSourceFactory, run_after_success_only};
pub use temporary_labeller::TemporaryLabeller;
