// # Modification
//
// A single detected change record, as reported by a `ChangeSource`.
//
// Modifications are plain data. They are created per query, attached to an
// `IntegrationResult` and discarded afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single change reported by a backend
///
/// The timestamp is in the reporting backend's clock domain. Modifications
/// from different backends carry no ordering guarantee relative to each other.
///
/// Fields are read-only once constructed; the `with_*` methods are only
/// meant for use while a backend is building the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modification {
    file_name: String,
    folder_name: String,
    modified_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    change_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    revision: Option<String>,
}

impl Modification {
    /// Create a new modification record
    ///
    /// # Parameters
    ///
    /// - `file_name`: Leaf name of the changed artifact, never empty
    /// - `folder_name`: Containing directory (absolute or repository-relative)
    /// - `modified_time`: The backend's last-change time
    pub fn new(
        file_name: impl Into<String>,
        folder_name: impl Into<String>,
        modified_time: DateTime<Utc>,
    ) -> Self {
        let file_name = file_name.into();
        debug_assert!(!file_name.is_empty(), "modification without a file name");

        Self {
            file_name,
            folder_name: folder_name.into(),
            modified_time,
            author: None,
            email: None,
            comment: None,
            change_type: None,
            revision: None,
        }
    }

    /// Set the author of the change
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the author's email address
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the commit/check-in comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Set the backend-specific change type (e.g. "added", "deleted")
    pub fn with_change_type(mut self, change_type: impl Into<String>) -> Self {
        self.change_type = Some(change_type.into());
        self
    }

    /// Set the backend revision identifier
    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn folder_name(&self) -> &str {
        &self.folder_name
    }

    pub fn modified_time(&self) -> DateTime<Utc> {
        self.modified_time
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn change_type(&self) -> Option<&str> {
        self.change_type.as_deref()
    }

    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }
}
