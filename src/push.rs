//! Best-effort notifications: remote push when registered, local otherwise

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PushError {
    #[error("push delivery failed: {0}")]
    Delivery(String),

    #[error("local notification failed: {0}")]
    Local(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl PushMessage {
    pub fn new(title: &str, body: &str) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
            data: serde_json::Value::Null,
        }
    }
}

/// Remote push provider
pub trait PushService: Send + Sync {
    /// Device token, or `None` when the device cannot receive remote pushes
    fn register_for_push_notifications(&self) -> Option<String>;

    fn send_to_user(&self, user_id: &str, message: &PushMessage) -> Result<(), PushError>;
}

/// On-device notification scheduler
pub trait LocalNotifier: Send + Sync {
    fn schedule(&self, message: &PushMessage) -> Result<(), PushError>;
}

/// How a notification was delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Remote,
    Local,
    Dropped,
}

pub struct NotificationCenter<P, L> {
    push: P,
    local: L,
    token: Option<String>,
    registered: bool,
}

impl<P: PushService, L: LocalNotifier> NotificationCenter<P, L> {
    pub fn new(push: P, local: L) -> Self {
        Self {
            push,
            local,
            token: None,
            registered: false,
        }
    }

    /// Register after sign-in. Later calls are no-ops.
    pub fn register_once(&mut self) -> Option<&str> {
        if !self.registered {
            self.token = self.push.register_for_push_notifications();
            self.registered = true;
            debug!(has_token = self.token.is_some(), "push registration complete");
        }
        self.token.as_deref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Never fails; errors are logged and degrade to the next channel.
    pub fn notify(&self, user_id: &str, message: &PushMessage) -> Delivery {
        if self.token.is_some() {
            match self.push.send_to_user(user_id, message) {
                Ok(()) => return Delivery::Remote,
                Err(e) => warn!(user_id, "remote push failed, using local notification: {}", e),
            }
        }

        match self.local.schedule(message) {
            Ok(()) => Delivery::Local,
            Err(e) => {
                warn!("local notification failed: {}", e);
                Delivery::Dropped
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Counters {
        registrations: AtomicUsize,
        remote: AtomicUsize,
        local: AtomicUsize,
    }

    struct FakePush {
        token: Option<String>,
        fail: bool,
        counters: Arc<Counters>,
    }

    impl PushService for FakePush {
        fn register_for_push_notifications(&self) -> Option<String> {
            self.counters.registrations.fetch_add(1, Ordering::SeqCst);
            self.token.clone()
        }

        fn send_to_user(&self, _user_id: &str, _message: &PushMessage) -> Result<(), PushError> {
            if self.fail {
                return Err(PushError::Delivery("unreachable".into()));
            }
            self.counters.remote.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FakeLocal {
        fail: bool,
        counters: Arc<Counters>,
    }

    impl LocalNotifier for FakeLocal {
        fn schedule(&self, _message: &PushMessage) -> Result<(), PushError> {
            if self.fail {
                return Err(PushError::Local("denied".into()));
            }
            self.counters.local.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn center(
        token: Option<&str>,
        push_fails: bool,
        local_fails: bool,
    ) -> (NotificationCenter<FakePush, FakeLocal>, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        let push = FakePush {
            token: token.map(String::from),
            fail: push_fails,
            counters: counters.clone(),
        };
        let local = FakeLocal {
            fail: local_fails,
            counters: counters.clone(),
        };
        (NotificationCenter::new(push, local), counters)
    }

    #[test]
    fn test_register_once() {
        let (mut center, counters) = center(Some("tok"), false, false);
        assert_eq!(center.register_once(), Some("tok"));
        assert_eq!(center.register_once(), Some("tok"));
        assert_eq!(counters.registrations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remote_when_token() {
        let (mut center, counters) = center(Some("tok"), false, false);
        center.register_once();
        let delivery = center.notify("u1", &PushMessage::new("قضية", "تم التحديث"));
        assert_eq!(delivery, Delivery::Remote);
        assert_eq!(counters.local.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_local_without_token() {
        let (mut center, counters) = center(None, false, false);
        assert_eq!(center.register_once(), None);
        assert_eq!(center.notify("u1", &PushMessage::new("t", "b")), Delivery::Local);
        assert_eq!(counters.remote.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_remote_failure_degrades_to_local() {
        let (mut center, counters) = center(Some("tok"), true, false);
        center.register_once();
        assert_eq!(center.notify("u1", &PushMessage::new("t", "b")), Delivery::Local);
        assert_eq!(counters.local.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_everything_fails_is_dropped() {
        let (center, _) = center(None, true, true);
        assert_eq!(center.notify("u1", &PushMessage::new("t", "b")), Delivery::Dropped);
    }
}
