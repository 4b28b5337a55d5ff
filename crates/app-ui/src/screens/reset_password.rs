//! Two-step password reset screen

use app_core::auth::AuthService;
use parking_lot::Mutex;
use std::sync::Arc;

use super::Alert;
use crate::navigation::{Navigator, Route};

/// Where the reset screen is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetStep {
    /// Entering the email to send a code to
    #[default]
    Request,
    /// Entering the code and the new password
    Verify,
}

/// Reset form fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetForm {
    /// Account email
    pub email: String,
    /// Emailed code
    pub code: String,
    /// New password
    pub new_password: String,
    /// New password again
    pub confirm_password: String,
}

/// Controller for the reset screen
pub struct ResetPasswordScreen {
    auth: AuthService,
    navigator: Arc<dyn Navigator>,
    form: Mutex<ResetForm>,
    step: Mutex<ResetStep>,
}

impl ResetPasswordScreen {
    /// Create the controller
    pub fn new(auth: AuthService, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            auth,
            navigator,
            form: Mutex::new(ResetForm::default()),
            step: Mutex::new(ResetStep::default()),
        }
    }

    /// Current step
    pub fn step(&self) -> ResetStep {
        *self.step.lock()
    }

    /// Edit the form
    pub fn update(&self, f: impl FnOnce(&mut ResetForm)) {
        f(&mut *self.form.lock());
    }

    /// Send the code and move to the verify step
    pub async fn request_code(&self) -> Result<Alert, Alert> {
        let email = self.form.lock().email.clone();
        self.auth
            .send_reset_code(&email)
            .await
            .map_err(|e| Alert::from_auth(&e, "Error"))?;

        *self.step.lock() = ResetStep::Verify;
        Ok(Alert::new("Email Sent", "Check your inbox for a password reset code."))
    }

    /// Set the new password and return to sign-in
    pub async fn reset(&self) -> Result<Alert, Alert> {
        let form = self.form.lock().clone();
        self.auth
            .reset_password(&form.code, &form.new_password, &form.confirm_password)
            .await
            .map_err(|e| Alert::from_auth(&e, "Error"))?;

        self.navigator.replace(Route::Login);
        Ok(Alert::new("Success", "Password has been reset successfully!"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::SharedNavigator;
    use crate::screens::test_support::MockIdentity;
    use app_core::auth::{AttemptStatus, AuthAttempt, ProviderError};
    use app_state::session::{Session, SessionSignal};

    fn setup(identity: MockIdentity) -> (ResetPasswordScreen, Arc<SharedNavigator>) {
        let navigator = Arc::new(SharedNavigator::new(Route::Login));
        navigator.push(Route::ResetPassword);
        let auth = AuthService::new(
            Arc::new(identity),
            Arc::new(SessionSignal::with_session(Session::signed_out())),
        );
        (ResetPasswordScreen::new(auth, navigator.clone()), navigator)
    }

    #[tokio::test]
    async fn test_request_then_reset() {
        let mut identity = MockIdentity::new();
        identity
            .expect_create_reset_session()
            .times(1)
            .returning(|_| Ok(AuthAttempt::pending(AttemptStatus::NeedsFirstFactor)));
        identity
            .expect_attempt_first_factor()
            .times(1)
            .returning(|_, _| Ok(AuthAttempt::pending(AttemptStatus::Complete)));

        let (screen, navigator) = setup(identity);
        screen.update(|f| f.email = "asha@marwadiuniversity.ac.in".to_string());

        screen.request_code().await.unwrap();
        assert_eq!(screen.step(), ResetStep::Verify);

        screen.update(|f| {
            f.code = "123456".to_string();
            f.new_password = "n3w".to_string();
            f.confirm_password = "n3w".to_string();
        });
        let notice = screen.reset().await.unwrap();
        assert_eq!(notice.title, "Success");
        assert_eq!(navigator.current_route(), Route::Login);
    }

    #[tokio::test]
    async fn test_request_failure_stays_on_request() {
        let mut identity = MockIdentity::new();
        identity
            .expect_create_reset_session()
            .returning(|_| Err(ProviderError::new("Couldn't find your account.")));

        let (screen, _) = setup(identity);
        screen.update(|f| f.email = "nobody@marwadiuniversity.ac.in".to_string());

        let alert = screen.request_code().await.unwrap_err();
        assert_eq!(alert, Alert::new("Error", "Couldn't find your account."));
        assert_eq!(screen.step(), ResetStep::Request);
    }

    #[tokio::test]
    async fn test_abandoned_request_stays_on_request() {
        let mut identity = MockIdentity::new();
        identity
            .expect_create_reset_session()
            .times(1)
            .returning(|_| Ok(AuthAttempt::pending(AttemptStatus::Abandoned)));

        let (screen, _) = setup(identity);
        screen.update(|f| f.email = "asha@marwadiuniversity.ac.in".to_string());

        let alert = screen.request_code().await.unwrap_err();
        assert_eq!(alert, Alert::new("Error", "Unable to send password reset email."));
        assert_eq!(screen.step(), ResetStep::Request);
    }

    #[tokio::test]
    async fn test_reset_requires_every_field() {
        let (screen, navigator) = setup(MockIdentity::new());
        screen.update(|f| f.code = "123456".to_string());

        let alert = screen.reset().await.unwrap_err();
        assert_eq!(alert.title, "Missing Fields");
        assert_eq!(navigator.current_route(), Route::ResetPassword);
    }
}
