//! Session service domain logic for the dashboard.
//!
//! Owns the persisted identity (name, role, signed-in flag). There is one
//! `SessionService` per running dashboard and it is handed to whatever needs
//! it; pages never reach for ambient state.
//!
//! Reads fail soft: a missing, unreadable or malformed entry yields the
//! default signed-out session. Writes go through `set_session` (login) and
//! `clear_session` (logout), and each successful write is broadcast to
//! subscribers so dependent views can reset themselves instead of relying on
//! a full reload.

use log::{info, warn};
use shared::{Role, Session};
use std::sync::Arc;
use tokio::sync::watch;

use crate::backend::error::DashboardError;
use crate::backend::storage::KeyValueStore;

/// Storage key the web client used for the serialized session
pub const DEFAULT_SESSION_KEY: &str = "userData";

/// Change notification delivered to session subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Session read from storage when the service started
    Restored(Session),
    SignedIn(Session),
    SignedOut,
}

/// Receiving end of the session broadcast, one per dependent view
pub struct SessionSubscription {
    receiver: watch::Receiver<SessionEvent>,
}

impl SessionSubscription {
    /// The latest event this subscriber has not seen yet, if any.
    ///
    /// Intermediate events are collapsed: only the most recent is returned.
    pub fn poll(&mut self) -> Option<SessionEvent> {
        match self.receiver.has_changed() {
            Ok(true) => Some(self.receiver.borrow_and_update().clone()),
            _ => None,
        }
    }

    /// Wait for the next event; `None` once the service is gone
    pub async fn changed(&mut self) -> Option<SessionEvent> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}

pub struct SessionService<K: KeyValueStore> {
    store: Arc<K>,
    storage_key: String,
    events: Arc<watch::Sender<SessionEvent>>,
}

impl<K: KeyValueStore> Clone for SessionService<K> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            storage_key: self.storage_key.clone(),
            events: Arc::clone(&self.events),
        }
    }
}

impl<K: KeyValueStore> SessionService<K> {
    pub fn new(store: Arc<K>, storage_key: impl Into<String>) -> Self {
        let storage_key = storage_key.into();
        let initial = read_session(store.as_ref(), &storage_key);
        let (events, _) = watch::channel(SessionEvent::Restored(initial));
        Self {
            store,
            storage_key,
            events: Arc::new(events),
        }
    }

    /// Current persisted session, or the signed-out default
    pub fn get_session(&self) -> Session {
        read_session(self.store.as_ref(), &self.storage_key)
    }

    /// Persist a session and notify subscribers
    pub fn set_session(&self, session: &Session) -> Result<(), DashboardError> {
        let json = serde_json::to_string(session)
            .map_err(|e| DashboardError::Session(e.to_string()))?;
        self.store
            .set_item(&self.storage_key, &json)
            .map_err(|e| DashboardError::Session(format!("{:#}", e)))?;

        info!("🔐 Signed in as {} ({})", session.display_name(), session.role);
        self.events.send_replace(SessionEvent::SignedIn(session.clone()));
        Ok(())
    }

    /// Convenience for the login flow
    pub fn login(&self, name: &str, role: Role) -> Result<Session, DashboardError> {
        let session = Session::signed_in(name.trim(), role);
        self.set_session(&session)?;
        Ok(session)
    }

    /// Forget the persisted session (logout) and tell every view to reset
    pub fn clear_session(&self) -> Result<(), DashboardError> {
        self.store
            .remove_item(&self.storage_key)
            .map_err(|e| DashboardError::Session(format!("{:#}", e)))?;

        info!("🔓 Signed out, invalidating dependent views");
        self.events.send_replace(SessionEvent::SignedOut);
        Ok(())
    }

    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            receiver: self.events.subscribe(),
        }
    }
}

fn read_session<K: KeyValueStore + ?Sized>(store: &K, key: &str) -> Session {
    let raw = match store.get_item(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Session::default(),
        Err(e) => {
            warn!("⚠️ Could not read session from local storage: {:#}", e);
            return Session::default();
        }
    };

    match serde_json::from_str::<Session>(&raw) {
        Ok(session) => session,
        Err(e) => {
            warn!("⚠️ Ignoring malformed session entry '{}': {}", key, e);
            Session::default()
        }
    }
}
