use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tokio::sync::{Mutex, MutexGuard, RwLock};

use consent_types::ConsentRequest;

/// Server-side attributes of one user session.
#[derive(Debug, Clone, Default)]
pub struct SessionData {
    pub authenticated: bool,
    /// Stable identifier of the resource owner, set at login and passed to
    /// the provider when a code is requested.
    pub authenticated_userid: Option<String>,
    /// Consent request stashed before the login round trip. Consumed
    /// exactly once, when login succeeds and the flow resumes.
    pub pending: Option<ConsentRequest>,
}

impl SessionData {
    pub fn login(&mut self, authenticated_userid: String) {
        self.authenticated = true;
        self.authenticated_userid = Some(authenticated_userid);
    }

    pub fn take_pending(&mut self) -> Option<ConsentRequest> {
        self.pending.take()
    }

    /// Reset all attributes, used by logout.
    pub fn clear(&mut self) {
        *self = SessionData::default();
    }
}

/// One live session. The mutex covers the whole attribute set so a request
/// holds it across its entire transition; concurrent requests bearing the
/// same token serialize here.
pub struct SessionHandle {
    token: String,
    data: Mutex<SessionData>,
}

impl SessionHandle {
    fn new(token: String) -> Self {
        Self {
            token,
            data: Mutex::new(SessionData::default()),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub async fn lock(&self) -> MutexGuard<'_, SessionData> {
        self.data.lock().await
    }
}

struct SessionEntry {
    handle: Arc<SessionHandle>,
    expires_at: DateTime<Utc>,
}

/// In-memory session store keyed by the opaque cookie token.
///
/// Expiry is sliding: every `start` for a live token pushes `expires_at`
/// out by the configured TTL. An expired token behaves exactly like an
/// absent one. Expired entries are swept whenever a new session is created.
pub struct SessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl SessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs as i64),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Return the session bound to the given cookie token, creating a fresh
    /// anonymous one if the token is absent, unknown or expired. Never
    /// fails; a missing session is the anonymous state, not an error.
    pub async fn start(&self, request_token: Option<&str>) -> Arc<SessionHandle> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        if let Some(token) = request_token {
            if let Some(entry) = sessions.get_mut(token) {
                if entry.expires_at > now {
                    entry.expires_at = now + self.ttl;
                    return entry.handle.clone();
                }
            }
        }

        sessions.retain(|_, entry| entry.expires_at > now);

        let handle = Arc::new(SessionHandle::new(Self::generate_token()));
        sessions.insert(
            handle.token().to_string(),
            SessionEntry {
                handle: handle.clone(),
                expires_at: now + self.ttl,
            },
        );
        handle
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn generate_token() -> String {
        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        const TOKEN_LEN: usize = 32;

        let mut rng = rand::thread_rng();
        (0..TOKEN_LEN)
            .map(|_| {
                let idx = rng.gen_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_token_starts_a_fresh_session() {
        let store = SessionStore::new(60);
        let session = store.start(Some("no-such-token")).await;
        assert_ne!(session.token(), "no-such-token");
        assert!(!session.lock().await.authenticated);
    }

    #[tokio::test]
    async fn live_token_returns_the_same_session() {
        let store = SessionStore::new(60);
        let first = store.start(None).await;
        first.lock().await.login("user-1".to_string());

        let second = store.start(Some(first.token())).await;
        assert_eq!(second.token(), first.token());
        assert!(second.lock().await.authenticated);
    }

    #[tokio::test]
    async fn expired_token_behaves_like_an_absent_one() {
        let store = SessionStore::new(0);
        let first = store.start(None).await;
        first.lock().await.login("user-1".to_string());

        let second = store.start(Some(first.token())).await;
        assert_ne!(second.token(), first.token());
        assert!(!second.lock().await.authenticated);
    }

    #[tokio::test]
    async fn expired_entries_are_swept_on_insert() {
        let store = SessionStore::new(0);
        store.start(None).await;
        store.start(None).await;
        // Each start expires instantly; only the newest entry survives.
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn clear_resets_all_attributes() {
        let store = SessionStore::new(60);
        let session = store.start(None).await;
        {
            let mut data = session.lock().await;
            data.login("user-1".to_string());
            data.pending = Some(ConsentRequest::new("abc", "code", "email"));
        }

        session.lock().await.clear();

        let data = session.lock().await;
        assert!(!data.authenticated);
        assert!(data.authenticated_userid.is_none());
        assert!(data.pending.is_none());
    }

    #[tokio::test]
    async fn pending_request_is_consumed_exactly_once() {
        let store = SessionStore::new(60);
        let session = store.start(None).await;
        session.lock().await.pending = Some(ConsentRequest::new("abc", "code", "email"));

        let mut data = session.lock().await;
        assert!(data.take_pending().is_some());
        assert!(data.take_pending().is_none());
    }

    #[tokio::test]
    async fn concurrent_transitions_on_one_session_do_not_interleave() {
        let store = Arc::new(SessionStore::new(60));
        let session = store.start(None).await;

        // Two read-modify-write transitions with a suspension point in the
        // middle; a lost update would leave the counter at 1.
        let mut tasks = Vec::new();
        for _ in 0..2 {
            let session = session.clone();
            tasks.push(tokio::spawn(async move {
                let mut data = session.lock().await;
                let count: u64 = data
                    .authenticated_userid
                    .as_deref()
                    .unwrap_or("0")
                    .parse()
                    .unwrap();
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                data.authenticated_userid = Some((count + 1).to_string());
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let data = session.lock().await;
        assert_eq!(data.authenticated_userid.as_deref(), Some("2"));
    }
}
