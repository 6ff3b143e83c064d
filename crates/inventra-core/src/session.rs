// ── Session manager ──
//
// Sole owner of the authentication token's lifecycle: restore + verify on
// startup, login, logout, and silent refresh on a fixed interval while
// authenticated. The token itself lives in the `TokenCell` shared with
// the transport client; the transport clears it on 401, everything else
// goes through this module.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use inventra_api::{ApiClient, TokenCell};

use crate::error::CoreError;
use crate::mirror::{KEY_TOKEN, KEY_USER, MirrorStore};
use crate::model::{Notification, UserIdentity};
use crate::notify::Notifier;

/// Silent refresh cadence: well inside the 7-day token lifetime.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);

/// Observable session lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Restoring,
    Authenticated { user: UserIdentity },
    Anonymous,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}

/// Owns login state and the silent-refresh task.
///
/// Cheaply cloneable via a shared inner.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    /// `None` in offline-only deployments: restore works from the mirror,
    /// login/refresh report `NotConfigured`.
    api: Option<Arc<ApiClient>>,
    token: TokenCell,
    mirror: MirrorStore,
    notifier: Notifier,
    state: watch::Sender<SessionState>,
    refresh_interval: Duration,
    refresh_task: Mutex<Option<(CancellationToken, JoinHandle<()>)>>,
}

impl SessionManager {
    pub fn new(
        api: Option<Arc<ApiClient>>,
        token: TokenCell,
        mirror: MirrorStore,
        notifier: Notifier,
        refresh_interval: Duration,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Uninitialized);
        Self {
            inner: Arc::new(SessionInner {
                api,
                token,
                mirror,
                notifier,
                state,
                refresh_interval,
                refresh_task: Mutex::new(None),
            }),
        }
    }

    /// Subscribe to session state changes.
    pub fn state(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// The current user, if authenticated.
    pub fn current_user(&self) -> Option<UserIdentity> {
        match &*self.inner.state.borrow() {
            SessionState::Authenticated { user } => Some(user.clone()),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Restore a persisted session.
    ///
    /// Reads token + user from the mirror; when both are present and a
    /// remote is configured, the token is verified remotely. Any failure
    /// on that path purges the persisted credentials. Guaranteed to
    /// settle in `Authenticated` or `Anonymous` on every path.
    pub async fn init(&self) {
        self.set_state(SessionState::Restoring);

        let saved_token: Option<String> = self
            .inner
            .mirror
            .get(KEY_TOKEN)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "could not read persisted token");
                None
            });
        let saved_user: Option<UserIdentity> =
            self.inner.mirror.get(KEY_USER).await.unwrap_or_else(|e| {
                warn!(error = %e, "could not read persisted user");
                None
            });

        let (Some(token), Some(user)) = (saved_token, saved_user) else {
            debug!("no persisted session");
            // A half-persisted session (token without user or vice versa)
            // is useless; drop whichever part survived.
            self.purge().await;
            self.set_state(SessionState::Anonymous);
            return;
        };

        self.inner.token.set(SecretString::from(token));

        match &self.inner.api {
            Some(api) => match api.verify().await {
                Ok(record) => {
                    let user = UserIdentity::from(record);
                    info!(email = %user.email, "session restored");
                    // The verify payload is fresher than the mirror.
                    if let Err(e) = self.inner.mirror.put(KEY_USER, &user).await {
                        warn!(error = %e, "could not refresh persisted user");
                    }
                    self.enter_authenticated(user).await;
                }
                Err(e) => {
                    warn!(error = %e, "persisted token rejected, purging");
                    // A 401 already cleared the cell; clear explicitly for
                    // the network-failure paths too.
                    self.inner.token.clear();
                    self.purge().await;
                    self.set_state(SessionState::Anonymous);
                }
            },
            None => {
                // Offline deployment: trust the mirror, nothing to verify
                // against.
                debug!(email = %user.email, "session restored from mirror (offline)");
                self.enter_authenticated(user).await;
            }
        }
    }

    /// Authenticate with email and password.
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<UserIdentity, CoreError> {
        let api = self.require_api()?;

        match api.login(email, password).await {
            Ok(session) => {
                let user = UserIdentity::from(session.user);
                self.inner.token.set(SecretString::from(session.token.clone()));
                self.persist(&session.token, &user).await?;
                info!(email = %user.email, "login successful");
                self.inner
                    .notifier
                    .publish(Notification::success(format!(
                        "Signed in as {}",
                        user.email
                    )))
                    .await;
                self.enter_authenticated(user.clone()).await;
                Ok(user)
            }
            Err(e) => {
                let err = CoreError::from(e);
                warn!(error = %err, "login failed");
                self.inner
                    .notifier
                    .publish(Notification::error(format!("Sign-in failed: {err}")))
                    .await;
                self.cancel_refresh_task().await;
                self.set_state(SessionState::Anonymous);
                Err(err)
            }
        }
    }

    /// End the session: cancel the refresh task, clear in-memory and
    /// persisted credentials, and tell the server (best-effort).
    /// Idempotent.
    pub async fn logout(&self) {
        self.cancel_refresh_task().await;

        if let Some(api) = &self.inner.api {
            if self.inner.token.is_set() {
                if let Err(e) = api.logout().await {
                    debug!(error = %e, "server-side logout failed (non-fatal)");
                }
            }
        }

        self.inner.token.clear();
        self.purge().await;
        self.set_state(SessionState::Anonymous);
        debug!("logged out");
    }

    /// Exchange the token for a fresh one. Fail-closed: a rejected
    /// refresh logs the session out.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let api = self.require_api()?;

        match api.refresh().await {
            Ok(session) => {
                let user = UserIdentity::from(session.user);
                self.inner.token.set(SecretString::from(session.token.clone()));
                self.persist(&session.token, &user).await?;
                debug!("session token refreshed");
                Ok(())
            }
            Err(e) => {
                let err = CoreError::from(e);
                warn!(error = %err, "token refresh failed, signing out");
                self.inner
                    .notifier
                    .publish(Notification::warning("Session expired -- signed out"))
                    .await;
                self.logout().await;
                Err(err)
            }
        }
    }

    /// Cancel background work without ending the session. Used at
    /// process shutdown; the persisted session survives for the next
    /// `init()`.
    pub async fn teardown(&self) {
        self.cancel_refresh_task().await;
    }

    // ── Internals ────────────────────────────────────────────────────

    async fn enter_authenticated(&self, user: UserIdentity) {
        self.set_state(SessionState::Authenticated { user });
        self.start_refresh_task().await;
    }

    /// Spawn the silent-refresh loop. Replaces any previous task; the
    /// loop also exits on its own when a refresh fails, since refresh()
    /// logs out on failure.
    async fn start_refresh_task(&self) {
        // Nothing to refresh against in offline deployments.
        if self.inner.api.is_none() {
            return;
        }

        self.cancel_refresh_task().await;

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let session = self.clone();
        let interval = self.inner.refresh_interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // consume the immediate first tick

            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {
                        if session.refresh().await.is_err() {
                            // refresh() already logged out; stop ticking.
                            break;
                        }
                    }
                }
            }
            debug!("refresh task stopped");
        });

        *self.inner.refresh_task.lock().await = Some((cancel, handle));
    }

    async fn cancel_refresh_task(&self) {
        let task = self.inner.refresh_task.lock().await.take();
        if let Some((cancel, _handle)) = task {
            // Cancel and detach. The caller may be the refresh task
            // itself (refresh-failure path), so joining here would
            // deadlock; the loop observes the cancellation and exits.
            cancel.cancel();
        }
    }

    async fn persist(&self, token: &str, user: &UserIdentity) -> Result<(), CoreError> {
        self.inner.mirror.put(KEY_TOKEN, &token).await?;
        self.inner.mirror.put(KEY_USER, user).await?;
        Ok(())
    }

    async fn purge(&self) {
        if let Err(e) = self.inner.mirror.remove(KEY_TOKEN).await {
            warn!(error = %e, "could not purge persisted token");
        }
        if let Err(e) = self.inner.mirror.remove(KEY_USER).await {
            warn!(error = %e, "could not purge persisted user");
        }
    }

    fn set_state(&self, state: SessionState) {
        self.inner.state.send_modify(|s| *s = state);
    }

    fn require_api(&self) -> Result<&Arc<ApiClient>, CoreError> {
        self.inner.api.as_ref().ok_or(CoreError::NotConfigured)
    }
}
