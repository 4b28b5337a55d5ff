//! Navigation system for Campus Feed
//!
//! Routes are file-style paths grouped by their first segment: everything
//! under `(auth)` is reachable signed out, everything else requires a session.
//! This module provides:
//! - Route definitions and the screen group each belongs to
//! - A router parsing paths back to routes
//! - A navigation stack with push, replace and back
//! - [`SharedNavigator`], which publishes the current route on a watch channel

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

// =============================================================================
// Screen Groups
// =============================================================================

/// Top-level navigation partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScreenGroup {
    /// Sign-in, sign-up and password reset
    AuthGroup,
    /// Everything behind a session
    MainGroup,
}

impl ScreenGroup {
    /// Path segment naming the auth group
    pub const AUTH_SEGMENT: &'static str = "(auth)";

    /// Derive the group from a path's first segment
    pub fn from_path(path: &str) -> Self {
        match path.split('/').find(|s| !s.is_empty()) {
            Some(Self::AUTH_SEGMENT) => ScreenGroup::AuthGroup,
            _ => ScreenGroup::MainGroup,
        }
    }

    /// Route a user lands on when entering this group
    pub fn entry_route(&self) -> Route {
        match self {
            ScreenGroup::AuthGroup => Route::Login,
            ScreenGroup::MainGroup => Route::Feed,
        }
    }
}

// =============================================================================
// Route Definitions
// =============================================================================

/// All routes in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Route {
    // Auth group
    /// Sign in
    #[default]
    Login,
    /// Create an account
    SignUp,
    /// Reset a forgotten password
    ResetPassword,

    // Main tabs
    /// Event feed
    Feed,
    /// Saved posts
    Bookmarks,
    /// Compose a post
    Create,
    /// Notifications
    Notifications,
    /// Own profile
    Profile,

    /// Unknown path
    NotFound,
}

impl Route {
    /// Every route with a path of its own
    pub const ALL: [Route; 8] = [
        Route::Login,
        Route::SignUp,
        Route::ResetPassword,
        Route::Feed,
        Route::Bookmarks,
        Route::Create,
        Route::Notifications,
        Route::Profile,
    ];

    /// Convert route to its path
    pub fn to_path(&self) -> &'static str {
        match self {
            Route::Login => "/(auth)/login",
            Route::SignUp => "/(auth)/signup",
            Route::ResetPassword => "/(auth)/reset-password",
            Route::Feed => "/(tabs)",
            Route::Bookmarks => "/(tabs)/bookmarks",
            Route::Create => "/(tabs)/create",
            Route::Notifications => "/(tabs)/notifications",
            Route::Profile => "/(tabs)/profile",
            Route::NotFound => "/+not-found",
        }
    }

    /// Screen group of this route
    pub fn group(&self) -> ScreenGroup {
        ScreenGroup::from_path(self.to_path())
    }

    /// Whether the route sits behind a session
    pub fn requires_auth(&self) -> bool {
        self.group() == ScreenGroup::MainGroup
    }

    /// Get the route's title
    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Sign In",
            Route::SignUp => "Sign Up",
            Route::ResetPassword => "Reset Password",
            Route::Feed => "Home",
            Route::Bookmarks => "Bookmarks",
            Route::Create => "Create Post",
            Route::Notifications => "Notifications",
            Route::Profile => "Profile",
            Route::NotFound => "Not Found",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_path())
    }
}

// =============================================================================
// Tab Navigation
// =============================================================================

/// Bottom tabs of the main group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavigationTab {
    /// Feed tab
    Home,
    /// Bookmarks tab
    Bookmarks,
    /// Create tab
    Create,
    /// Notifications tab
    Notifications,
    /// Profile tab
    Profile,
}

impl NavigationTab {
    /// Get the root route for this tab
    pub fn root_route(&self) -> Route {
        match self {
            NavigationTab::Home => Route::Feed,
            NavigationTab::Bookmarks => Route::Bookmarks,
            NavigationTab::Create => Route::Create,
            NavigationTab::Notifications => Route::Notifications,
            NavigationTab::Profile => Route::Profile,
        }
    }

    /// Get all tabs in display order
    pub fn all() -> [NavigationTab; 5] {
        [
            NavigationTab::Home,
            NavigationTab::Bookmarks,
            NavigationTab::Create,
            NavigationTab::Notifications,
            NavigationTab::Profile,
        ]
    }
}

// =============================================================================
// Navigation Stack
// =============================================================================

/// A navigation stack entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackEntry {
    /// The route
    pub route: Route,
    /// Unique key for this entry
    pub key: String,
}

impl StackEntry {
    /// Create a new stack entry
    pub fn new(route: Route) -> Self {
        Self {
            route,
            key: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Stack of visited routes; never empty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationStack {
    /// Bottom entry
    root: StackEntry,
    /// Entries above the root (bottom to top)
    above: Vec<StackEntry>,
}

impl NavigationStack {
    /// Create a new navigation stack with a root route
    pub fn new(root: Route) -> Self {
        Self {
            root: StackEntry::new(root),
            above: Vec::new(),
        }
    }

    /// Push a route onto the stack
    pub fn push(&mut self, route: Route) {
        self.above.push(StackEntry::new(route));
    }

    /// Pop the top route (returns true if popped, false if at root)
    pub fn pop(&mut self) -> bool {
        self.above.pop().is_some()
    }

    /// Replace the top route
    pub fn replace(&mut self, route: Route) {
        match self.above.last_mut() {
            Some(top) => *top = StackEntry::new(route),
            None => self.root = StackEntry::new(route),
        }
    }

    /// Get the current (top) route
    pub fn current(&self) -> Route {
        self.current_entry().route
    }

    /// Get the current stack entry
    pub fn current_entry(&self) -> &StackEntry {
        self.above.last().unwrap_or(&self.root)
    }

    /// Check if we can go back
    pub fn can_go_back(&self) -> bool {
        !self.above.is_empty()
    }

    /// Get stack depth
    pub fn depth(&self) -> usize {
        self.above.len() + 1
    }

    /// Routes from bottom to top
    pub fn routes(&self) -> Vec<Route> {
        std::iter::once(&self.root)
            .chain(self.above.iter())
            .map(|entry| entry.route)
            .collect()
    }

    /// Reset to a new root
    pub fn reset(&mut self, route: Route) {
        self.root = StackEntry::new(route);
        self.above.clear();
    }
}

// =============================================================================
// Navigation State
// =============================================================================

/// Last navigation performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationAction {
    /// A route was pushed
    Push(Route),
    /// The top route was replaced
    Replace(Route),
    /// The top route was popped
    Back,
    /// The stack was cleared down to one route
    Reset(Route),
}

/// Complete navigation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationState {
    stack: NavigationStack,
    /// Most recent action
    #[serde(skip)]
    pub last_action: Option<NavigationAction>,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new(Route::default())
    }
}

impl NavigationState {
    /// Create a navigation state rooted at `root`
    pub fn new(root: Route) -> Self {
        Self {
            stack: NavigationStack::new(root),
            last_action: None,
        }
    }

    /// Get the stack
    pub fn stack(&self) -> &NavigationStack {
        &self.stack
    }

    /// Get the current route
    pub fn current_route(&self) -> Route {
        self.stack.current()
    }

    /// Group of the current route
    pub fn current_group(&self) -> ScreenGroup {
        self.current_route().group()
    }

    /// Navigate to a route, keeping history
    pub fn push(&mut self, route: Route) {
        self.stack.push(route);
        self.last_action = Some(NavigationAction::Push(route));
    }

    /// Replace the current route
    ///
    /// Crossing into another screen group drops the whole history, so back
    /// navigation can never reach a screen of the group that was left.
    pub fn replace(&mut self, route: Route) {
        if route.group() == self.current_group() {
            self.stack.replace(route);
        } else {
            self.stack.reset(route);
        }
        self.last_action = Some(NavigationAction::Replace(route));
    }

    /// Show `route` as the only entry, dropping all history
    pub fn reset(&mut self, route: Route) {
        self.stack.reset(route);
        self.last_action = Some(NavigationAction::Reset(route));
    }

    /// Go back
    pub fn back(&mut self) -> bool {
        let popped = self.stack.pop();
        if popped {
            self.last_action = Some(NavigationAction::Back);
        }
        popped
    }

    /// Check if we can go back
    pub fn can_go_back(&self) -> bool {
        self.stack.can_go_back()
    }
}

// =============================================================================
// Navigator
// =============================================================================

/// Imperative navigation used by screens and the route guard
pub trait Navigator: Send + Sync {
    /// Currently shown route
    fn current_route(&self) -> Route;

    /// Navigate forward, keeping history
    fn push(&self, route: Route);

    /// Navigate without leaving the current route in history
    fn replace(&self, route: Route);

    /// Go back; false at the root
    fn back(&self) -> bool;

    /// Show `route` with no history behind it
    fn reset(&self, route: Route);
}

/// Thread-safe [`Navigator`] publishing the current route
///
/// Clones share the same state. Subscribers wake only when the current route
/// actually changes.
#[derive(Debug, Clone)]
pub struct SharedNavigator {
    state: Arc<Mutex<NavigationState>>,
    route_tx: Arc<watch::Sender<Route>>,
}

impl Default for SharedNavigator {
    fn default() -> Self {
        Self::new(Route::default())
    }
}

impl SharedNavigator {
    /// Create a navigator showing `root`
    pub fn new(root: Route) -> Self {
        let (route_tx, _) = watch::channel(root);
        Self {
            state: Arc::new(Mutex::new(NavigationState::new(root))),
            route_tx: Arc::new(route_tx),
        }
    }

    /// Receiver of current-route changes
    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.route_tx.subscribe()
    }

    /// Snapshot of the navigation state
    pub fn snapshot(&self) -> NavigationState {
        self.state.lock().clone()
    }

    fn update(&self, f: impl FnOnce(&mut NavigationState)) {
        let route = {
            let mut state = self.state.lock();
            f(&mut state);
            state.current_route()
        };

        let changed = self.route_tx.send_if_modified(|current| {
            if *current == route {
                false
            } else {
                *current = route;
                true
            }
        });
        if changed {
            tracing::debug!(%route, "route changed");
        }
    }
}

impl Navigator for SharedNavigator {
    fn current_route(&self) -> Route {
        self.state.lock().current_route()
    }

    fn push(&self, route: Route) {
        self.update(|state| state.push(route));
    }

    fn replace(&self, route: Route) {
        self.update(|state| state.replace(route));
    }

    fn back(&self) -> bool {
        let mut popped = false;
        self.update(|state| popped = state.back());
        popped
    }

    fn reset(&self, route: Route) {
        self.update(|state| state.reset(route));
    }
}

// =============================================================================
// Router
// =============================================================================

/// Parses paths to routes
#[derive(Debug, Clone, Default)]
pub struct Router;

impl Router {
    /// Create a new router
    pub fn new() -> Self {
        Self
    }

    /// Match a path to a route
    ///
    /// Query strings, trailing slashes and the `index` segment are ignored.
    pub fn match_path(&self, path: &str) -> Route {
        let pathname = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = pathname
            .split('/')
            .filter(|s| !s.is_empty() && *s != "index")
            .collect();

        Route::ALL
            .into_iter()
            .find(|route| {
                route
                    .to_path()
                    .split('/')
                    .filter(|s| !s.is_empty())
                    .eq(segments.iter().copied())
            })
            .unwrap_or(Route::NotFound)
    }
}

// =============================================================================
// Tests
// =============================================================================
