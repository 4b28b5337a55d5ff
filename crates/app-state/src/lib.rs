//! Application state for Campus Feed
//!
//! This crate holds the observable state shared across the app. Today that is
//! the identity provider's session, which the route guard and the auth flows
//! both watch.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod session;

pub use session::{Session, SessionPhase, SessionSignal, SessionSource};
