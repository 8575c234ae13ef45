//! Session store: the single piece of shared mutable state on the client.
//!
//! The store is an explicit, cloneable handle (not an ambient singleton).
//! Every write goes through one `watch` channel update, so readers and
//! subscribers always observe a whole [`Session`] value: access codes and
//! menus change together or not at all.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::menu::RouteNode;
use crate::AccessCodes;

/// Snapshot of the client session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    access_token: Option<String>,
    access_codes: AccessCodes,
    access_menus: Vec<RouteNode>,
    authenticated_at: Option<DateTime<Utc>>,
    /// Incremented for every new login instance (not for refreshes).
    login_instance: u64,
}

impl Session {
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn access_codes(&self) -> &AccessCodes {
        &self.access_codes
    }

    pub fn access_menus(&self) -> &[RouteNode] {
        &self.access_menus
    }

    pub fn authenticated_at(&self) -> Option<DateTime<Utc>> {
        self.authenticated_at
    }

    pub fn login_instance(&self) -> u64 {
        self.login_instance
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

/// Receiving side of the store, for components that re-evaluate on change.
pub type SessionWatch = watch::Receiver<Session>;

/// Cloneable handle to the process session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<Session>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create an empty (anonymous) store.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Session::default());
        Self { tx: Arc::new(tx) }
    }

    /// Clone of the current session.
    pub fn snapshot(&self) -> Session {
        self.tx.borrow().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.tx.borrow().access_token.clone()
    }

    /// Codes as of now; not cached by callers.
    pub fn access_codes(&self) -> AccessCodes {
        self.tx.borrow().access_codes.clone()
    }

    pub fn access_menus(&self) -> Vec<RouteNode> {
        self.tx.borrow().access_menus.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_authenticated()
    }

    /// Start a new login instance with `token`.
    ///
    /// Codes and menus of any previous instance are dropped in the same update.
    pub fn begin(&self, token: String) -> u64 {
        let mut instance = 0;
        self.tx.send_modify(|s| {
            instance = s.login_instance + 1;
            *s = Session {
                access_token: Some(token),
                access_codes: AccessCodes::new(),
                access_menus: Vec::new(),
                authenticated_at: Some(Utc::now()),
                login_instance: instance,
            };
        });
        tracing::debug!(login_instance = instance, "session started");
        instance
    }

    /// Replace the token of the current login instance (refresh).
    ///
    /// Returns `false` and writes nothing when there is no session to renew.
    pub fn renew_token(&self, token: String) -> bool {
        self.tx.send_if_modified(|s| {
            if s.access_token.is_none() {
                return false;
            }
            s.access_token = Some(token);
            true
        })
    }

    /// Install codes and menus as one pair.
    ///
    /// Returns `false` (and writes nothing) when `login_instance` is no longer
    /// the current one, i.e. a logout or a newer login completed first.
    pub fn set_access(
        &self,
        login_instance: u64,
        codes: AccessCodes,
        menus: Vec<RouteNode>,
    ) -> bool {
        self.tx.send_if_modified(|s| {
            if s.login_instance != login_instance || s.access_token.is_none() {
                return false;
            }
            s.access_codes = codes;
            s.access_menus = menus;
            true
        })
    }

    /// Drop everything (logout, refresh failure).
    ///
    /// Also retires the current login instance, so loads started before the
    /// clear cannot install access afterwards.
    pub fn clear(&self) {
        self.tx.send_modify(|s| {
            let instance = s.login_instance + 1;
            *s = Session {
                login_instance: instance,
                ..Session::default()
            };
        });
        tracing::debug!("session cleared");
    }

    /// Subscribe to every subsequent store update.
    pub fn subscribe(&self) -> SessionWatch {
        self.tx.subscribe()
    }
}
