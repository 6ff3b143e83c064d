// ── Capability table ──
//
// Centralized role -> permitted-action lookup, consulted exactly once per
// mutating operation before any I/O. Read paths are unrestricted.

use crate::error::CoreError;
use crate::model::Role;

/// Mutating operations subject to role checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
    CreateAsset,
    UpdateAsset,
    DeleteAsset,
    BorrowAsset,
    ReturnAsset,
}

/// The capability table. Admins hold every capability; staff may move
/// assets in and out of circulation but not alter inventory records.
pub fn is_permitted(role: Role, action: Action) -> bool {
    match role {
        Role::Admin | Role::SuperAdmin => true,
        Role::Staff => matches!(action, Action::BorrowAsset | Action::ReturnAsset),
        Role::Viewer => false,
    }
}

/// Check a capability, producing the typed error on failure.
pub fn require(role: Role, action: Action) -> Result<(), CoreError> {
    if is_permitted(role, action) {
        Ok(())
    } else {
        Err(CoreError::PermissionDenied { role, action })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn admins_hold_every_capability() {
        for action in [
            Action::CreateProduct,
            Action::UpdateProduct,
            Action::DeleteProduct,
            Action::CreateAsset,
            Action::UpdateAsset,
            Action::DeleteAsset,
            Action::BorrowAsset,
            Action::ReturnAsset,
        ] {
            assert!(is_permitted(Role::Admin, action));
            assert!(is_permitted(Role::SuperAdmin, action));
        }
    }

    #[test]
    fn staff_limited_to_circulation() {
        assert!(is_permitted(Role::Staff, Action::BorrowAsset));
        assert!(is_permitted(Role::Staff, Action::ReturnAsset));
        assert!(!is_permitted(Role::Staff, Action::CreateProduct));
        assert!(!is_permitted(Role::Staff, Action::DeleteAsset));
    }

    #[test]
    fn viewers_hold_nothing() {
        assert!(!is_permitted(Role::Viewer, Action::BorrowAsset));
        assert!(!is_permitted(Role::Viewer, Action::UpdateProduct));
    }

    #[test]
    fn require_produces_typed_error() {
        let err = require(Role::Viewer, Action::DeleteProduct).unwrap_err();
        assert!(matches!(
            err,
            CoreError::PermissionDenied {
                role: Role::Viewer,
                action: Action::DeleteProduct
            }
        ));
    }
}
