// ── User identity and roles ──

use serde::{Deserialize, Serialize};

/// Role attached to an authenticated user.
///
/// Ordering matters for nothing; authorization goes through the capability
/// table in [`authz`](crate::authz), never through comparisons.
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
pub enum Role {
    Viewer,
    Staff,
    Admin,
    SuperAdmin,
}

/// The authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
}
