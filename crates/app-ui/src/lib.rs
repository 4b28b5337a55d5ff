//! Presentation logic for Campus Feed
//!
//! This crate holds everything between the services and the rendered
//! screens, without depending on any widget toolkit:
//!
//! - [`navigation`] - Routes, screen groups, the navigation stack and the
//!   shared navigator
//! - [`guard`] - The route guard keeping the screen group consistent with
//!   the session
//! - [`screens`] - Controllers for each screen
//!
//! # Example
//!
//! ```rust
//! use app_ui::guard::{decide, GuardDecision};
//! use app_ui::navigation::{Route, ScreenGroup};
//! use app_state::session::Session;
//!
//! let decision = decide(Session::signed_out(), Route::Create.group());
//! assert_eq!(decision, GuardDecision::RedirectToAuth);
//! assert_eq!(decision.target(), Some(Route::Login));
//! assert_eq!(Route::Login.group(), ScreenGroup::AuthGroup);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod guard;
pub mod navigation;
pub mod screens;

pub use guard::{decide, GuardDecision, RouteGuard};
pub use navigation::{
    NavigationAction, NavigationStack, NavigationState, NavigationTab, Navigator, Route, Router,
    ScreenGroup, SharedNavigator, StackEntry,
};
pub use screens::{
    Alert, CreateScreen, FeedScreen, FeedScreenState, LoginScreen, ProfileScreen,
    ResetPasswordScreen, ShareOutcome, SignUpScreen,
};
