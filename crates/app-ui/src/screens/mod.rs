//! Headless screen controllers
//!
//! Each controller owns the state of one screen and the calls behind its
//! buttons. Failures come back as an [`Alert`] to show; nothing here panics
//! on a service error.

use app_core::auth::{AuthError, AuthField};
use serde::{Deserialize, Serialize};

pub mod create;
pub mod feed;
pub mod login;
pub mod profile;
pub mod reset_password;
pub mod signup;

#[cfg(test)]
pub(crate) mod test_support;

pub use create::{CreateScreen, ShareOutcome};
pub use feed::{FeedScreen, FeedScreenState};
pub use login::{LoginForm, LoginScreen};
pub use profile::ProfileScreen;
pub use reset_password::{ResetForm, ResetPasswordScreen, ResetStep};
pub use signup::{SignUpForm, SignUpScreen, SignUpStep};

/// A titled message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Short title
    pub title: String,
    /// Body text
    pub message: String,
}

impl Alert {
    /// Create an alert
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    /// Alert for an authentication failure
    ///
    /// Local problems get their own titles; provider failures use
    /// `failure_title`.
    pub fn from_auth(error: &AuthError, failure_title: &str) -> Self {
        let title = match error {
            AuthError::NotReady => "Please wait",
            AuthError::DomainRejection { .. } => "Access Denied",
            AuthError::MissingField(AuthField::Email) => "Missing Email",
            AuthError::MissingField(AuthField::Code) => "Enter Code",
            AuthError::MissingField(_) => "Missing Fields",
            AuthError::PasswordMismatch => "Password Mismatch",
            AuthError::Provider { .. } | AuthError::UnexpectedStatus { .. } => failure_title,
        };
        Self::new(title, error.user_message())
    }
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}
