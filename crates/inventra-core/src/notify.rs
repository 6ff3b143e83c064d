// ── Notification channel ──
//
// Fire-and-forget fan-out of user-visible messages. Publishing never
// blocks or fails the operation being announced: a missing subscriber is
// fine, and a mirror write failure is only logged. The most recent
// entries are mirrored under the `notifications` key for the next start.

use tokio::sync::broadcast;
use tracing::warn;

use crate::mirror::{KEY_NOTIFICATIONS, MirrorStore};
use crate::model::Notification;

const CHANNEL_CAPACITY: usize = 64;
/// How many notifications the mirror retains, most recent first.
const MIRROR_LIMIT: usize = 50;

/// Broadcast sender for user-visible notifications.
#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
    mirror: MirrorStore,
}

impl Notifier {
    pub fn new(mirror: MirrorStore) -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx, mirror }
    }

    /// Subscribe to live notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Broadcast a notification and mirror it. Never fails.
    pub async fn publish(&self, notification: Notification) {
        // No receivers is not an error.
        let _ = self.tx.send(notification.clone());

        let mut recent: Vec<Notification> =
            match self.mirror.get_list(KEY_NOTIFICATIONS).await {
                Ok(list) => list,
                Err(e) => {
                    warn!(error = %e, "could not read mirrored notifications");
                    Vec::new()
                }
            };
        recent.insert(0, notification);
        recent.truncate(MIRROR_LIMIT);

        if let Err(e) = self.mirror.put(KEY_NOTIFICATIONS, &recent).await {
            warn!(error = %e, "could not mirror notification");
        }
    }
}
