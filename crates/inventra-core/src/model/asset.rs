// ── Asset domain types ──
//
// Unlike product stock status, asset status is a real state machine:
// borrow and return move between `Available` and `Borrowed`, and deletion
// is blocked while borrowed. The guards live in the asset manager; the
// predicates here are the single source of truth for what is allowed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of an asset.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AssetStatus {
    Available,
    Borrowed,
    Maintenance,
    Retired,
}

impl AssetStatus {
    /// Deletion is blocked only while the asset is out with a borrower.
    pub fn can_delete(self) -> bool {
        !matches!(self, Self::Borrowed)
    }

    pub fn can_borrow(self) -> bool {
        matches!(self, Self::Available)
    }

    pub fn can_return(self) -> bool {
        matches!(self, Self::Borrowed)
    }
}

/// The canonical asset type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub name: String,
    pub tag: Option<String>,
    pub category: Option<String>,
    /// Who currently holds the asset; only set while `Borrowed`.
    pub assignee: Option<String>,
    pub status: AssetStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied by a caller registering an asset.
#[derive(Debug, Clone, Default)]
pub struct AssetDraft {
    pub name: String,
    pub tag: Option<String>,
    pub category: Option<String>,
}

/// Partial update; `None` fields are left untouched. Status changes go
/// through borrow/return (or maintenance/retire updates), not patches.
#[derive(Debug, Clone, Default)]
pub struct AssetPatch {
    pub name: Option<String>,
    pub tag: Option<String>,
    pub category: Option<String>,
    pub status: Option<AssetStatus>,
}

impl Asset {
    /// Build a new record from a draft: generated id, fresh timestamps,
    /// status `Available`.
    pub fn from_draft(draft: AssetDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: draft.name,
            tag: draft.tag,
            category: draft.category,
            assignee: None,
            status: AssetStatus::Available,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a patch and bump `updated_at`.
    pub fn apply(&mut self, patch: AssetPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(tag) = patch.tag {
            self.tag = Some(tag);
        }
        if let Some(category) = patch.category {
            self.category = Some(category);
        }
        if let Some(status) = patch.status {
            self.status = status;
            if !matches!(status, AssetStatus::Borrowed) {
                self.assignee = None;
            }
        }
        self.updated_at = Utc::now();
    }
}
