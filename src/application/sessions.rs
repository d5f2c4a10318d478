//! # Wizard Sessions
//!
//! Process-wide registry of running class wizards, keyed by (guild, user, channel).
//! The router forwards a user's replies to the matching session; the wizard consumes them
//! through its [`SessionInbox`]. Only one session may exist per key.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{Instant, timeout_at};

const INBOX_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub guild_id: String,
    pub user_id: String,
    pub channel_id: String,
}

impl SessionKey {
    pub fn new(
        guild_id: impl Into<String>,
        user_id: impl Into<String>,
        channel_id: impl Into<String>,
    ) -> Self {
        Self {
            guild_id: guild_id.into(),
            user_id: user_id.into(),
            channel_id: channel_id.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("a class wizard is already running for {user} in this room")]
    AlreadyActive { user: String },
}

#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<Mutex<HashMap<SessionKey, mpsc::Sender<String>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionKey, mpsc::Sender<String>>> {
        // The map stays consistent even if a holder panicked.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Opens a session for `key`, rejecting a second one while the first is alive.
    pub fn register(&self, key: SessionKey) -> Result<SessionInbox, SessionError> {
        let mut sessions = self.lock();
        if let Some(existing) = sessions.get(&key) {
            if !existing.is_closed() {
                return Err(SessionError::AlreadyActive {
                    user: key.user_id.clone(),
                });
            }
        }

        let (tx, rx) = mpsc::channel(INBOX_CAPACITY);
        sessions.insert(key.clone(), tx);
        tracing::debug!("Opened wizard session for {} in {}", key.user_id, key.channel_id);

        Ok(SessionInbox {
            key,
            rx,
            registry: self.clone(),
        })
    }

    pub fn is_active(&self, key: &SessionKey) -> bool {
        self.lock().get(key).is_some_and(|tx| !tx.is_closed())
    }

    /// Hands `message` to the session for `key`. Returns false when no session consumed it.
    pub fn deliver(&self, key: &SessionKey, message: &str) -> bool {
        let sender = match self.lock().get(key) {
            Some(tx) => tx.clone(),
            None => return false,
        };

        match sender.try_send(message.to_string()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("Wizard inbox full for {}, dropping reply", key.user_id);
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    fn remove(&self, key: &SessionKey) {
        self.lock().remove(key);
        tracing::debug!("Closed wizard session for {} in {}", key.user_id, key.channel_id);
    }
}

/// Receiving end of a session. Dropping it unregisters the session.
#[derive(Debug)]
pub struct SessionInbox {
    key: SessionKey,
    rx: mpsc::Receiver<String>,
    registry: SessionRegistry,
}

impl SessionInbox {
    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    /// Waits for the next reply until `deadline`. `None` means the wait timed out.
    pub async fn next_until(&mut self, deadline: Instant) -> Option<String> {
        match timeout_at(deadline, self.rx.recv()).await {
            Ok(Some(msg)) => Some(msg),
            Ok(None) | Err(_) => None,
        }
    }
}

impl Drop for SessionInbox {
    fn drop(&mut self) {
        self.registry.remove(&self.key);
    }
}
