//! Session-gated route guard
//!
//! The guard keeps the visible screen group consistent with the session:
//! signed-out users are sent to sign-in, signed-in users are sent out of the
//! auth screens. It decides nothing until the identity provider has loaded,
//! and it only ever replaces the current route, so back navigation cannot
//! return to a screen the user is no longer allowed to see.

use app_state::session::{Session, SessionPhase};
use std::sync::Arc;
use tokio::sync::watch;

use crate::navigation::{Navigator, Route, ScreenGroup};

/// Outcome of one guard evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session not loaded yet; decision deferred
    Wait,
    /// Already in the right group
    Stay,
    /// Replace-navigate to sign-in
    RedirectToAuth,
    /// Replace-navigate to the main entry
    RedirectToMain,
}

impl GuardDecision {
    /// Route to replace the current one with, if any
    pub fn target(&self) -> Option<Route> {
        match self {
            GuardDecision::RedirectToAuth => Some(ScreenGroup::AuthGroup.entry_route()),
            GuardDecision::RedirectToMain => Some(ScreenGroup::MainGroup.entry_route()),
            GuardDecision::Wait | GuardDecision::Stay => None,
        }
    }
}

/// Decide where the user may be, given the session and the current group
pub fn decide(session: Session, group: ScreenGroup) -> GuardDecision {
    match (session.phase(), group) {
        (SessionPhase::Undetermined, _) => GuardDecision::Wait,
        (SessionPhase::SignedOut, ScreenGroup::MainGroup) => GuardDecision::RedirectToAuth,
        (SessionPhase::SignedIn, ScreenGroup::AuthGroup) => GuardDecision::RedirectToMain,
        _ => GuardDecision::Stay,
    }
}

/// Applies [`decide`] to a navigator whenever its inputs change
pub struct RouteGuard {
    navigator: Arc<dyn Navigator>,
    last_inputs: Option<(Session, ScreenGroup)>,
}

impl RouteGuard {
    /// Create a guard driving `navigator`
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self {
            navigator,
            last_inputs: None,
        }
    }

    /// Evaluate against the navigator's current group
    ///
    /// Returns `None` when the inputs equal those of the previous evaluation;
    /// nothing is done in that case.
    pub fn evaluate(&mut self, session: Session) -> Option<GuardDecision> {
        let group = self.navigator.current_route().group();
        if self.last_inputs == Some((session, group)) {
            return None;
        }
        self.last_inputs = Some((session, group));

        let decision = decide(session, group);
        match decision.target() {
            Some(target) => {
                tracing::info!(?decision, ?group, %target, "route guard redirect");
                self.navigator.replace(target);
            }
            None => {
                tracing::debug!(?decision, ?group, ?session, "route guard evaluated");
            }
        }
        Some(decision)
    }

    /// Re-evaluate on every session or route change
    ///
    /// Returns when the session channel closes.
    pub async fn run(
        mut self,
        mut sessions: watch::Receiver<Session>,
        mut routes: watch::Receiver<Route>,
    ) {
        loop {
            routes.borrow_and_update();
            let session = *sessions.borrow_and_update();
            self.evaluate(session);

            tokio::select! {
                changed = sessions.changed() => {
                    if changed.is_err() {
                        tracing::debug!("session channel closed, route guard stopping");
                        return;
                    }
                }
                changed = routes.changed() => {
                    if changed.is_err() {
                        // Navigator gone: keep following the session only
                        self.follow_session(&mut sessions).await;
                        return;
                    }
                }
            }
        }
    }

    async fn follow_session(&mut self, sessions: &mut watch::Receiver<Session>) {
        while sessions.changed().await.is_ok() {
            let session = *sessions.borrow_and_update();
            self.evaluate(session);
        }
    }
}
