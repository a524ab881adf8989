//! In-memory session store.
//!
//! Sessions are keyed by the caller-supplied identifier and created on first
//! contact. Each session lives behind its own async mutex, so the orchestrator
//! can hold it for a whole request and same-session requests run one at a time.
//! Sessions nobody has touched for the idle timeout are dropped by
//! [`SessionStore::reap_idle`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use domain::{Session, SessionId};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Shared, lockable handle to one session
pub type SessionHandle = Arc<Mutex<Session>>;

struct SessionSlot {
    session: SessionHandle,
    last_seen: Instant,
}

/// Process-wide map from session id to session state
pub struct SessionStore {
    slots: Mutex<HashMap<SessionId, SessionSlot>>,
    /// `None` keeps sessions for the life of the process
    idle_timeout: Option<Duration>,
}

impl SessionStore {
    pub fn new(idle_timeout: Option<Duration>) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// Fetch the session for `id`, creating it if this is the first contact.
    ///
    /// Lookup and insert happen under one lock, so concurrent first contacts
    /// for the same id share a single session.
    pub async fn get_or_create(&self, id: &str) -> SessionHandle {
        let now = Instant::now();
        let mut slots = self.slots.lock().await;

        let slot = slots.entry(id.to_string()).or_insert_with(|| {
            debug!("Creating session {}", id);
            SessionSlot {
                session: Arc::new(Mutex::new(Session::new())),
                last_seen: now,
            }
        });
        slot.last_seen = now;
        slot.session.clone()
    }

    /// Look up an existing session without creating or refreshing it
    pub async fn get(&self, id: &str) -> Option<SessionHandle> {
        self.slots
            .lock()
            .await
            .get(id)
            .map(|slot| slot.session.clone())
    }

    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.lock().await.is_empty()
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout
    }

    /// Drop sessions idle for longer than the timeout. Returns how many were
    /// removed.
    pub async fn reap_idle(&self) -> usize {
        self.reap_idle_at(Instant::now()).await
    }

    pub(crate) async fn reap_idle_at(&self, now: Instant) -> usize {
        let Some(timeout) = self.idle_timeout else {
            return 0;
        };

        let mut slots = self.slots.lock().await;
        let before = slots.len();
        // A handle held outside the map means a request is still using it
        slots.retain(|_, slot| {
            Arc::strong_count(&slot.session) > 1
                || now.saturating_duration_since(slot.last_seen) < timeout
        });
        before - slots.len()
    }

    /// Run [`reap_idle`](Self::reap_idle) every `interval` on a background
    /// task. Returns `None` when expiry is disabled.
    pub fn spawn_reaper(self: &Arc<Self>, interval: Duration) -> Option<JoinHandle<()>> {
        self.idle_timeout?;
        let store = Arc::clone(self);

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let removed = store.reap_idle().await;
                if removed > 0 {
                    info!("Reaped {} idle sessions", removed);
                }
            }
        }))
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_or_create_returns_same_session() {
        let store = SessionStore::default();

        let first = store.get_or_create("s1").await;
        first.lock().await.record_turn("hello");

        let second = store.get_or_create("s1").await;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.lock().await.turn_count, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated_by_id() {
        let store = SessionStore::default();

        store.get_or_create("a").await.lock().await.record_turn("x");
        let b = store.get_or_create("b").await;

        assert_eq!(b.lock().await.turn_count, 0);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_concurrent_first_contact_creates_one_session() {
        let store = Arc::new(SessionStore::default());

        let mut handles = vec![];
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.get_or_create("shared").await
            }));
        }

        let mut sessions = vec![];
        for handle in handles {
            sessions.push(handle.await.unwrap());
        }

        assert_eq!(store.len().await, 1);
        assert!(sessions.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[tokio::test]
    async fn test_get_does_not_create() {
        let store = SessionStore::default();
        assert!(store.get("missing").await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_reap_removes_only_idle_sessions() {
        let store = SessionStore::new(Some(Duration::from_secs(60)));
        drop(store.get_or_create("old").await);

        let later = Instant::now() + Duration::from_secs(61);
        assert_eq!(store.reap_idle_at(later).await, 1);
        assert!(store.get("old").await.is_none());

        drop(store.get_or_create("fresh").await);
        assert_eq!(store.reap_idle_at(Instant::now()).await, 0);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_reap_skips_sessions_in_use() {
        let store = SessionStore::new(Some(Duration::from_secs(1)));
        let in_use = store.get_or_create("busy").await;

        let later = Instant::now() + Duration::from_secs(10);
        assert_eq!(store.reap_idle_at(later).await, 0);

        drop(in_use);
        assert_eq!(store.reap_idle_at(later).await, 1);
    }

    #[tokio::test]
    async fn test_reap_disabled_without_timeout() {
        let store = Arc::new(SessionStore::new(None));
        drop(store.get_or_create("forever").await);

        let much_later = Instant::now() + Duration::from_secs(86_400);
        assert_eq!(store.reap_idle_at(much_later).await, 0);
        assert!(store.spawn_reaper(Duration::from_secs(1)).is_none());
    }

    #[tokio::test]
    async fn test_reaper_task_drops_idle_session() {
        let store = Arc::new(SessionStore::new(Some(Duration::from_millis(50))));
        drop(store.get_or_create("idle").await);

        let reaper = store
            .spawn_reaper(Duration::from_millis(10))
            .expect("reaper should run when a timeout is set");

        let mut waited = Duration::ZERO;
        while !store.is_empty().await && waited < Duration::from_secs(2) {
            tokio::time::sleep(Duration::from_millis(20)).await;
            waited += Duration::from_millis(20);
        }

        assert!(store.get("idle").await.is_none());
        reaper.abort();
    }
}
