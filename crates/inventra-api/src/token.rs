// Shared bearer-token cell.
//
// The session manager is the sole writer; the ApiClient reads it on every
// attempt and clears it when the server answers 401. Sharing a cell instead
// of a process-wide global keeps the token's ownership explicit.

use std::sync::{Arc, RwLock};

use secrecy::{ExposeSecret, SecretString};

/// Interior-mutable holder for the current bearer token.
///
/// Cheaply cloneable; all clones observe the same value. No token means
/// requests go out without an `Authorization` header.
#[derive(Clone, Default)]
pub struct TokenCell {
    inner: Arc<RwLock<Option<SecretString>>>,
}

impl TokenCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current token.
    pub fn set(&self, token: SecretString) {
        *self.inner.write().expect("token lock poisoned") = Some(token);
    }

    /// Drop the current token. Idempotent.
    pub fn clear(&self) {
        *self.inner.write().expect("token lock poisoned") = None;
    }

    /// Whether a token is currently held.
    pub fn is_set(&self) -> bool {
        self.inner.read().expect("token lock poisoned").is_some()
    }

    /// Expose the token value for header construction.
    ///
    /// Returns an owned `String` so the lock is released before the
    /// request is built.
    pub(crate) fn bearer(&self) -> Option<String> {
        self.inner
            .read()
            .expect("token lock poisoned")
            .as_ref()
            .map(|t| t.expose_secret().to_owned())
    }
}

impl std::fmt::Debug for TokenCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = if self.is_set() { "set" } else { "empty" };
        f.debug_tuple("TokenCell").field(&state).finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let cell = TokenCell::new();
        let other = cell.clone();

        cell.set(SecretString::from("tok-1".to_string()));
        assert!(other.is_set());
        assert_eq!(other.bearer().unwrap(), "tok-1");

        other.clear();
        assert!(!cell.is_set());
        assert!(cell.bearer().is_none());
    }

    #[test]
    fn clear_is_idempotent() {
        let cell = TokenCell::new();
        cell.clear();
        cell.clear();
        assert!(!cell.is_set());
    }
}
