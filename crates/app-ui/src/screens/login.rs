//! Sign-in screen

use app_core::auth::AuthService;
use parking_lot::Mutex;
use std::sync::Arc;

use super::Alert;
use crate::navigation::{Navigator, Route};

/// Sign-in form fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    /// Institution email
    pub email: String,
    /// Password
    pub password: String,
}

/// Controller for the sign-in screen
pub struct LoginScreen {
    auth: AuthService,
    navigator: Arc<dyn Navigator>,
    form: Mutex<LoginForm>,
}

impl LoginScreen {
    /// Create the controller
    pub fn new(auth: AuthService, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            auth,
            navigator,
            form: Mutex::new(LoginForm::default()),
        }
    }

    /// Current form contents
    pub fn form(&self) -> LoginForm {
        self.form.lock().clone()
    }

    /// Update the email field
    pub fn set_email(&self, email: impl Into<String>) {
        self.form.lock().email = email.into();
    }

    /// Update the password field
    pub fn set_password(&self, password: impl Into<String>) {
        self.form.lock().password = password.into();
    }

    /// Sign in and enter the main screens
    pub async fn sign_in(&self) -> Result<(), Alert> {
        let form = self.form();
        self.auth
            .sign_in(&form.email, &form.password)
            .await
            .map_err(|e| Alert::from_auth(&e, "Sign-in failed"))?;

        self.navigator.replace(Route::Feed);
        Ok(())
    }

    /// Email a reset code to the address in the form
    ///
    /// Always returns an alert: a confirmation or the failure.
    pub async fn forgot_password(&self) -> Alert {
        let email = self.form.lock().email.clone();
        match self.auth.forgot_password(&email).await {
            Ok(()) => Alert::new(
                "Reset Email Sent",
                "Check your inbox for a password reset code.",
            ),
            Err(e) => Alert::from_auth(&e, "Error"),
        }
    }

    /// Open the sign-up screen
    pub fn go_to_sign_up(&self) {
        self.navigator.push(Route::SignUp);
    }

    /// Open the password reset screen
    pub fn go_to_reset_password(&self) {
        self.navigator.push(Route::ResetPassword);
    }
}
