//! Sliding-window login session.
//!
//! # Responsibility
//! - Issue, validate, extend and clear the singleton session record.
//!
//! # Invariants
//! - A session is honoured iff `now <= expires_at`.
//! - Expired sessions are deleted lazily by `current_user`; expiry is never
//!   reported as an error.
//! - `extend` restarts the window from "now" (sliding, not fixed TTL).

use crate::clock::Clock;
use crate::model::session::{Session, SESSION_TTL_MS};
use crate::store::{KeyValueStore, PersistentStore, StoreError, StoreResult};
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Auth guard failure.
#[derive(Debug)]
pub enum SessionError {
    /// No session, or the session expired.
    NotSignedIn,
    Store(StoreError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotSignedIn => write!(f, "not signed in"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotSignedIn => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Session manager over an injected store and clock.
pub struct SessionService<'a, S: KeyValueStore> {
    store: &'a PersistentStore<S>,
    clock: &'a dyn Clock,
    ttl_ms: i64,
}

impl<'a, S: KeyValueStore> SessionService<'a, S> {
    pub fn new(store: &'a PersistentStore<S>, clock: &'a dyn Clock) -> Self {
        Self {
            store,
            clock,
            ttl_ms: SESSION_TTL_MS,
        }
    }

    /// Overrides the 20 minute default window.
    pub fn with_ttl(mut self, ttl_ms: i64) -> Self {
        self.ttl_ms = ttl_ms;
        self
    }

    /// Starts a new session for `email`, replacing any existing one.
    pub fn login(&self, email: &str, remember: bool) -> StoreResult<Session> {
        let session = Session::start(email, self.clock.now_ms(), self.ttl_ms, remember);
        self.store.save_session(&session)?;
        info!(
            "event=session_login module=session status=ok remember={} expires_at={}",
            remember, session.expires_at
        );
        Ok(session)
    }

    /// Returns the signed-in email, clearing the session if it has expired.
    pub fn current_user(&self) -> StoreResult<Option<String>> {
        let Some(session) = self.store.load_session()? else {
            return Ok(None);
        };
        if session.is_valid_at(self.clock.now_ms()) {
            return Ok(Some(session.email));
        }

        self.store.clear_session()?;
        info!(
            "event=session_expire module=session status=ok expired_at={}",
            session.expires_at
        );
        Ok(None)
    }

    /// Pushes expiry to `now + ttl`. Returns `false` when there is no session.
    pub fn extend(&self) -> StoreResult<bool> {
        let Some(mut session) = self.store.load_session()? else {
            return Ok(false);
        };
        session.refresh(self.clock.now_ms(), self.ttl_ms);
        self.store.save_session(&session)?;
        debug!(
            "event=session_extend module=session status=ok expires_at={}",
            session.expires_at
        );
        Ok(true)
    }

    pub fn logout(&self) -> StoreResult<()> {
        self.store.clear_session()?;
        info!("event=session_logout module=session status=ok");
        Ok(())
    }

    /// Keeps the current session but points it at `new_email`.
    ///
    /// Returns `false` when there is no session to update.
    pub fn rename(&self, new_email: &str) -> StoreResult<bool> {
        let Some(mut session) = self.store.load_session()? else {
            return Ok(false);
        };
        session.email = new_email.to_string();
        self.store.save_session(&session)?;
        Ok(true)
    }

    /// Auth guard: the signed-in email, counting the call as user activity.
    pub fn require_user(&self) -> Result<String, SessionError> {
        let email = self.current_user()?.ok_or(SessionError::NotSignedIn)?;
        self.extend()?;
        Ok(email)
    }
}
