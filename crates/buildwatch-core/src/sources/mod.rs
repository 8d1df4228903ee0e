// # Change Source Implementations
//
// Sources that live in the core crate. Backend-specific sources ship as
// separate plugin crates.

pub mod composite;

pub use composite::CompositeChangeSource;
