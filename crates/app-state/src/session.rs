//! Observable session state
//!
//! The identity provider owns the session; the app only observes it. This
//! module models what is observed (`loaded`, `active`) and how observers
//! subscribe to changes.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

/// Snapshot of the identity provider's session
///
/// `loaded == false` means the provider has not yet resolved any persisted
/// session, so `active` carries no information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Session {
    /// Provider finished restoring state
    pub loaded: bool,
    /// A session is active
    pub active: bool,
}

impl Session {
    /// Provider still resolving
    pub const fn unresolved() -> Self {
        Self { loaded: false, active: false }
    }

    /// Resolved with an active session
    pub const fn signed_in() -> Self {
        Self { loaded: true, active: true }
    }

    /// Resolved without a session
    pub const fn signed_out() -> Self {
        Self { loaded: true, active: false }
    }

    /// Coarse phase of this snapshot
    pub fn phase(&self) -> SessionPhase {
        match (self.loaded, self.active) {
            (false, _) => SessionPhase::Undetermined,
            (true, true) => SessionPhase::SignedIn,
            (true, false) => SessionPhase::SignedOut,
        }
    }
}

/// Session phase derived from a [`Session`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Provider has not loaded yet
    Undetermined,
    /// Loaded, no active session
    SignedOut,
    /// Loaded, session active
    SignedIn,
}

/// Read access plus change notification for the session
pub trait SessionSource: Send + Sync {
    /// Current snapshot
    fn session(&self) -> Session;

    /// Receiver that wakes on every change
    fn subscribe(&self) -> watch::Receiver<Session>;
}

/// Watch-channel backed [`SessionSource`]
///
/// The identity provider adapter writes to it; everything else reads. Clones
/// share the same channel. Writes that do not change the snapshot do not wake
/// subscribers.
///
/// # Example
///
/// ```
/// use app_state::session::{Session, SessionSignal, SessionSource};
///
/// let signal = SessionSignal::new();
/// let rx = signal.subscribe();
///
/// signal.mark_loaded(false);
/// assert_eq!(*rx.borrow(), Session::signed_out());
/// ```
#[derive(Debug, Clone)]
pub struct SessionSignal {
    tx: Arc<watch::Sender<Session>>,
}

impl Default for SessionSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionSignal {
    /// Create a signal in the unresolved state
    pub fn new() -> Self {
        Self::with_session(Session::unresolved())
    }

    /// Create a signal with an initial snapshot
    pub fn with_session(session: Session) -> Self {
        let (tx, _) = watch::channel(session);
        Self { tx: Arc::new(tx) }
    }

    /// Replace the snapshot, returning whether it changed
    pub fn set(&self, session: Session) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == session {
                false
            } else {
                *current = session;
                true
            }
        });

        if changed {
            tracing::debug!(loaded = session.loaded, active = session.active, "session changed");
        }
        changed
    }

    /// Provider finished restoring, with or without a session
    pub fn mark_loaded(&self, active: bool) -> bool {
        self.set(Session { loaded: true, active })
    }

    /// A session became active
    pub fn activate(&self) -> bool {
        self.set(Session::signed_in())
    }

    /// The session ended
    pub fn deactivate(&self) -> bool {
        self.set(Session::signed_out())
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl SessionSource for SessionSignal {
    fn session(&self) -> Session {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }
}
