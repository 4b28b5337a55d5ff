//! Sign-up screen with email verification

use app_core::auth::AuthService;
use parking_lot::Mutex;
use std::sync::Arc;

use super::Alert;
use crate::navigation::{Navigator, Route};

/// Where the sign-up screen is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignUpStep {
    /// Entering email and password
    #[default]
    Register,
    /// Entering the emailed verification code
    VerifyCode,
}

/// Sign-up form fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpForm {
    /// Institution email
    pub email: String,
    /// Password
    pub password: String,
    /// Password again
    pub confirm_password: String,
    /// Verification code
    pub code: String,
}

/// Controller for the sign-up screen
pub struct SignUpScreen {
    auth: AuthService,
    navigator: Arc<dyn Navigator>,
    form: Mutex<SignUpForm>,
    step: Mutex<SignUpStep>,
}

impl SignUpScreen {
    /// Create the controller
    pub fn new(auth: AuthService, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            auth,
            navigator,
            form: Mutex::new(SignUpForm::default()),
            step: Mutex::new(SignUpStep::default()),
        }
    }

    /// Current step
    pub fn step(&self) -> SignUpStep {
        *self.step.lock()
    }

    /// Edit the form
    pub fn update(&self, f: impl FnOnce(&mut SignUpForm)) {
        f(&mut *self.form.lock());
    }

    /// Register and move to code entry
    pub async fn sign_up(&self) -> Result<Alert, Alert> {
        let form = self.form.lock().clone();
        self.auth
            .sign_up(&form.email, &form.password, &form.confirm_password)
            .await
            .map_err(|e| Alert::from_auth(&e, "Sign-up failed"))?;

        *self.step.lock() = SignUpStep::VerifyCode;
        Ok(Alert::new(
            "Verify your email",
            "A verification code has been sent to your university inbox.",
        ))
    }

    /// Verify the code and enter the main screens
    pub async fn verify(&self) -> Result<(), Alert> {
        let code = self.form.lock().code.clone();
        self.auth
            .verify_email(&code)
            .await
            .map_err(|e| Alert::from_auth(&e, "Verification failed"))?;

        self.navigator.replace(Route::Feed);
        Ok(())
    }
}
