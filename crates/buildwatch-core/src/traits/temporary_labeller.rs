// # Temporary Labeller Trait
//
// Optional capability for backends that can mark a speculative build point
// before the real label is known, and remove that mark if the build fails.
//
// A source advertises the capability through
// `ChangeSource::temporary_labeller()`. Callers check for it before use;
// sources without it are skipped, which is not an error.

use async_trait::async_trait;

/// Trait for sources that support provisional, removable labels
#[async_trait]
pub trait TemporaryLabeller: Send + Sync {
    /// Mark the current repository state with a provisional label
    async fn create_temporary_label(&self) -> Result<(), crate::Error>;

    /// Remove the provisional label created by
    /// [`create_temporary_label`](TemporaryLabeller::create_temporary_label)
    async fn delete_temporary_label(&self) -> Result<(), crate::Error>;
}
