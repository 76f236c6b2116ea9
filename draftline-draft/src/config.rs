use crate::DraftResult;
use draftline_types::CREATED_AT_COLUMN;
use serde::{Deserialize, Serialize};

/// Registry-wide drafting settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftingConfig {
    /// Creation timestamp columns nulled on every clone, when the type has them.
    pub timestamp_columns: Vec<String>,
    /// Association names never inferred as draftable.
    pub reserved_associations: Vec<String>,
    /// Whether registered types read through the approved scope by default.
    pub default_scope: bool,
}

impl Default for DraftingConfig {
    fn default() -> Self {
        Self {
            timestamp_columns: vec![CREATED_AT_COLUMN.to_string()],
            reserved_associations: vec!["draft".to_string(), "approved_version".to_string()],
            default_scope: false,
        }
    }
}

impl DraftingConfig {
    /// Parses settings from JSON; missing keys take their defaults.
    pub fn from_json(json: &str) -> DraftResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_reserved(&self, association: &str) -> bool {
        self.reserved_associations.iter().any(|r| r == association)
    }
}
