//! Session state derived from the persisted access token.
//!
//! The token file is the single source of truth. Nothing here keeps a separate
//! "logged in" flag: [`SessionStore::is_authenticated`] re-reads storage every
//! time, and observers are told about every change, whether it came from this
//! process ([`SessionStore::set_token`]) or from another process sharing the
//! same data directory (picked up by [`SessionStore::subscribe_to_external_changes`]).

use std::{sync::Arc, time::Duration};

use api::TokenSource;
use serde_json::Value;
use shared::types::AccessToken;
use tokio::{sync::watch, task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::storage::Storage;

pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(1);

/// Decodes a stored credential, either a raw string or a JSON-quoted one.
///
/// Malformed quoted content is returned as stored. Empty tokens are `None`.
pub fn decode_token(raw: &str) -> Option<AccessToken> {
    let token = if raw.starts_with('"') {
        match serde_json::from_str::<String>(raw) {
            Ok(token) => token,
            Err(err) => {
                warn!("Stored access token is not valid JSON, using it verbatim: {err}");
                raw.to_owned()
            }
        }
    } else {
        raw.to_owned()
    };
    Some(AccessToken::new(token)).filter(|token| !token.is_empty())
}

pub fn encode_token(token: &AccessToken) -> String {
    Value::String(token.as_str().to_owned()).to_string()
}

struct Inner {
    storage: Storage,
    // Every known token, local or external.
    state: watch::Sender<Option<AccessToken>>,
    // Only tokens written by this process.
    local_writes: watch::Sender<Option<AccessToken>>,
    watch_interval: Duration,
}

impl Inner {
    fn read(&self) -> Option<AccessToken> {
        self.storage.load_access_token().as_deref().and_then(decode_token)
    }

    fn publish(&self, token: Option<AccessToken>) {
        self.state.send_if_modified(|current| {
            if *current == token {
                false
            } else {
                *current = token;
                true
            }
        });
    }
}

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    pub fn new(storage: Storage) -> Self {
        Self::with_watch_interval(storage, DEFAULT_WATCH_INTERVAL)
    }

    pub fn with_watch_interval(storage: Storage, watch_interval: Duration) -> Self {
        let current = storage.load_access_token().as_deref().and_then(decode_token);
        let (state, _) = watch::channel(current.clone());
        let (local_writes, _) = watch::channel(current);
        Self {
            inner: Arc::new(Inner {
                storage,
                state,
                local_writes,
                watch_interval,
            }),
        }
    }

    pub fn read(&self) -> Option<AccessToken> {
        self.inner.read()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    /// Persists (`Some`) or removes (`None`) the token and notifies observers.
    ///
    /// Returns `false` when storage could not be written; observers then get
    /// whatever storage still holds.
    pub fn set_token(&self, token: Option<AccessToken>) -> bool {
        let token = token.filter(|token| !token.is_empty());
        let written = match &token {
            Some(token) => self.inner.storage.store_access_token(&encode_token(token)),
            None => self.inner.storage.remove_access_token(),
        };
        let current = self.read();
        self.inner.local_writes.send_replace(current.clone());
        if current.is_some() {
            info!("Session started");
        } else {
            info!("Session cleared");
        }
        self.inner.publish(current);
        written
    }

    /// In-process observers; sees local and external changes alike.
    pub fn observe(&self) -> watch::Receiver<Option<AccessToken>> {
        self.inner.state.subscribe()
    }

    /// Calls `callback` with the decoded token whenever another process changes it.
    ///
    /// Only the access token key is watched. Changes made through this store are
    /// not reported. The returned handle stops the watch when dropped.
    pub fn subscribe_to_external_changes(
        &self,
        mut callback: impl FnMut(Option<AccessToken>) + Send + 'static,
    ) -> ExternalSubscription {
        let inner = Arc::clone(&self.inner);
        let mut local = inner.local_writes.subscribe();
        let mut seen = inner.read();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(inner.watch_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if local.has_changed().unwrap_or(false) {
                    seen = local.borrow_and_update().clone();
                }
                let current = inner.read();
                if current == seen {
                    continue;
                }
                // A local write can land between the two reads above.
                if local.has_changed().unwrap_or(false) {
                    seen = local.borrow_and_update().clone();
                    if current == seen {
                        continue;
                    }
                }
                debug!("Access token changed outside this process");
                seen = current.clone();
                inner.publish(current.clone());
                callback(current);
            }
        });
        ExternalSubscription { task }
    }
}

impl TokenSource for SessionStore {
    fn access_token(&self) -> Option<AccessToken> {
        self.read()
    }
}

#[must_use = "dropping the subscription stops it"]
pub struct ExternalSubscription {
    task: JoinHandle<()>,
}

impl ExternalSubscription {
    pub fn unsubscribe(self) {}
}

impl Drop for ExternalSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use shared::storage::GeneralStorage;
    use tokio::sync::mpsc;

    use super::*;

    const FAST: Duration = Duration::from_millis(10);
    const QUIET: Duration = Duration::from_millis(150);

    fn tab(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::with_watch_interval(Storage::at(dir.path()), FAST)
    }

    fn token(value: &str) -> Option<AccessToken> {
        Some(AccessToken::new(value))
    }

    #[test]
    fn decodes_both_encodings() {
        assert_eq!(decode_token("abc"), token("abc"));
        assert_eq!(decode_token("\"abc\""), token("abc"));
        assert_eq!(decode_token("\"a\\\"b\""), token("a\"b"));
    }

    #[test]
    fn malformed_quoted_value_is_returned_raw() {
        assert_eq!(decode_token("\"abc"), token("\"abc"));
        assert_eq!(decode_token("\"abc\" trailing"), token("\"abc\" trailing"));
    }

    #[test]
    fn empty_values_are_absent() {
        assert_eq!(decode_token(""), None);
        assert_eq!(decode_token("\"\""), None);
    }

    #[test]
    fn encode_quotes() {
        assert_eq!(encode_token(&AccessToken::new("abc")), "\"abc\"");
        assert_eq!(decode_token(&encode_token(&AccessToken::new("a\"b"))), token("a\"b"));
    }

    #[test]
    fn reads_raw_value_written_by_another_writer() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::at(dir.path());
        storage.set_item(&Storage::ACCESS_TOKEN_KEY, "plain-token");
        let session = SessionStore::new(storage);
        assert_eq!(session.read(), token("plain-token"));
        assert!(session.is_authenticated());
    }

    #[test]
    fn authentication_tracks_every_set_token() {
        let dir = tempfile::tempdir().unwrap();
        let session = tab(&dir);
        assert!(!session.is_authenticated());

        assert!(session.set_token(token("abc")));
        assert_eq!(session.read(), token("abc"));
        assert!(session.is_authenticated());
        let stored = Storage::at(dir.path()).load_access_token();
        assert_eq!(stored.as_deref(), Some("\"abc\""));

        assert!(session.set_token(None));
        assert_eq!(session.read(), None);
        assert!(!session.is_authenticated());

        assert!(session.set_token(token("")));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn set_token_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let session = tab(&dir);
        let mut observer = session.observe();

        session.set_token(token("abc"));
        assert!(observer.has_changed().unwrap());
        assert_eq!(*observer.borrow_and_update(), token("abc"));

        session.set_token(token("abc"));
        assert!(!observer.has_changed().unwrap());
        assert_eq!(session.read(), token("abc"));

        session.set_token(None);
        session.set_token(None);
        assert_eq!(*observer.borrow_and_update(), None);
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn other_tab_login_and_logout_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let first = tab(&dir);
        let second = tab(&dir);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _subscription = first.subscribe_to_external_changes(move |token| {
            let _ = tx.send(token);
        });

        second.set_token(token("xyz"));
        let seen = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
        assert_eq!(seen, Some(token("xyz")));
        assert_eq!(*first.observe().borrow(), token("xyz"));

        second.set_token(None);
        let seen = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
        assert_eq!(seen, Some(None));
        assert!(!first.is_authenticated());
        assert_eq!(*first.observe().borrow(), None);
    }

    #[tokio::test]
    async fn unrelated_keys_and_own_writes_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let session = tab(&dir);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _subscription = session.subscribe_to_external_changes(move |token| {
            let _ = tx.send(token);
        });

        Storage::at(dir.path()).set_item(&"theme", "dark");
        session.set_token(token("mine"));
        assert!(tokio::time::timeout(QUIET, rx.recv()).await.is_err());
    }

    #[tokio::test]
    async fn unsubscribe_stops_callbacks() {
        let dir = tempfile::tempdir().unwrap();
        let first = tab(&dir);
        let second = tab(&dir);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscription = first.subscribe_to_external_changes(move |token| {
            let _ = tx.send(token);
        });
        subscription.unsubscribe();

        second.set_token(token("xyz"));
        // The sender lives in the aborted task, so the channel closes instead of delivering.
        let result = tokio::time::timeout(QUIET, rx.recv()).await;
        assert!(matches!(result, Ok(None) | Err(_)));
    }
}
