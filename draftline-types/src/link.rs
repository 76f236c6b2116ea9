//! The live/draft link carried by every draftable row.
//!
//! A row whose back-reference column is null is live (approved). A row whose
//! back-reference points at another row's id is a draft of that row.

use crate::EntityId;
use serde::{Deserialize, Serialize};

/// Identity column present on every table.
pub const ID_COLUMN: &str = "id";

/// Back-reference column present on every draftable table.
pub const APPROVED_VERSION_COLUMN: &str = "approved_version_id";

/// Creation timestamp column nulled on clone when the table has it.
pub const CREATED_AT_COLUMN: &str = "created_at";

/// Typed view of a row's back-reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "approved_version", rename_all = "snake_case")]
pub enum VersionLink {
    /// The row is the approved version itself.
    Live,
    /// The row is a draft of the given live row.
    DraftOf(EntityId),
}

impl VersionLink {
    /// Builds the link from a nullable back-reference.
    #[must_use]
    pub const fn from_back_reference(approved_version: Option<EntityId>) -> Self {
        match approved_version {
            Some(id) => Self::DraftOf(id),
            None => Self::Live,
        }
    }

    /// Returns the nullable back-reference this link is stored as.
    #[must_use]
    pub const fn back_reference(&self) -> Option<EntityId> {
        match self {
            Self::Live => None,
            Self::DraftOf(id) => Some(*id),
        }
    }

    #[must_use]
    pub const fn is_draft(&self) -> bool {
        matches!(self, Self::DraftOf(_))
    }

    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }
}

impl From<Option<EntityId>> for VersionLink {
    fn from(value: Option<EntityId>) -> Self {
        Self::from_back_reference(value)
    }
}
