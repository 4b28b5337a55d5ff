//! Profile screen

use app_core::auth::AuthService;
use std::sync::Arc;

use super::Alert;
use crate::navigation::{Navigator, Route};

/// Controller for the profile screen
pub struct ProfileScreen {
    auth: AuthService,
    navigator: Arc<dyn Navigator>,
}

impl ProfileScreen {
    /// Create the controller
    pub fn new(auth: AuthService, navigator: Arc<dyn Navigator>) -> Self {
        Self { auth, navigator }
    }

    /// Sign out and return to sign-in
    pub async fn sign_out(&self) -> Result<(), Alert> {
        self.auth
            .sign_out()
            .await
            .map_err(|_| Alert::new("Sign out failed", "Please try again."))?;

        self.navigator.replace(Route::Login);
        Ok(())
    }
}
