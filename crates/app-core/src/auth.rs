//! Authentication flows
//!
//! The identity provider is an external service that owns credentials and the
//! session lifecycle. This module wraps it with the app's own rules: nothing
//! runs before the provider has loaded, sign-in and sign-up are restricted to
//! the institution's email domain, and any attempt status other than the one a
//! flow expects is a typed failure.

use app_state::session::SessionSource;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Email suffix accepted when none is configured
pub const DEFAULT_EMAIL_DOMAIN: &str = "@marwadiuniversity.ac.in";

// =============================================================================
// Provider boundary
// =============================================================================

/// Status of a provider sign-in or sign-up attempt
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttemptStatus {
    /// Finished; a session may have been created
    Complete,
    /// A first factor (e.g. a reset code) is still required
    NeedsFirstFactor,
    /// A second factor is still required
    NeedsSecondFactor,
    /// The provider wants a new password
    NeedsNewPassword,
    /// Sign-up fields are missing or unverified
    MissingRequirements,
    /// The attempt was abandoned
    Abandoned,
    /// Any status this client does not know
    Other(String),
}

impl AttemptStatus {
    /// Parse the provider's wire value
    pub fn from_wire(status: &str) -> Self {
        match status {
            "complete" => Self::Complete,
            "needs_first_factor" => Self::NeedsFirstFactor,
            "needs_second_factor" => Self::NeedsSecondFactor,
            "needs_new_password" => Self::NeedsNewPassword,
            "missing_requirements" => Self::MissingRequirements,
            "abandoned" => Self::Abandoned,
            other => Self::Other(other.to_string()),
        }
    }

    /// The provider's wire value
    pub fn as_str(&self) -> &str {
        match self {
            Self::Complete => "complete",
            Self::NeedsFirstFactor => "needs_first_factor",
            Self::NeedsSecondFactor => "needs_second_factor",
            Self::NeedsNewPassword => "needs_new_password",
            Self::MissingRequirements => "missing_requirements",
            Self::Abandoned => "abandoned",
            Self::Other(s) => s,
        }
    }

    /// Whether the attempt ended without any way forward
    pub fn is_dead_end(&self) -> bool {
        matches!(self, Self::Abandoned | Self::Other(_))
    }
}

impl std::fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a provider attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthAttempt {
    /// Attempt status
    pub status: AttemptStatus,
    /// Session created by a complete attempt
    pub created_session_id: Option<String>,
}

impl AuthAttempt {
    /// A complete attempt that created `session_id`
    pub fn complete(session_id: impl Into<String>) -> Self {
        Self {
            status: AttemptStatus::Complete,
            created_session_id: Some(session_id.into()),
        }
    }

    /// An attempt in some other state, without a session
    pub fn pending(status: AttemptStatus) -> Self {
        Self { status, created_session_id: None }
    }
}

/// Error reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .message.as_deref().unwrap_or("identity provider error"))]
pub struct ProviderError {
    /// Provider error code
    pub code: Option<String>,
    /// Human readable message, shown verbatim when present
    pub message: Option<String>,
}

impl ProviderError {
    /// Error with a message
    pub fn new(message: impl Into<String>) -> Self {
        Self { code: None, message: Some(message.into()) }
    }

    /// Error without any detail
    pub fn opaque() -> Self {
        Self { code: None, message: None }
    }
}

/// Identity provider operations the app consumes
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Password sign-in
    async fn create_session(
        &self,
        identifier: &str,
        password: &str,
    ) -> std::result::Result<AuthAttempt, ProviderError>;

    /// Start a password reset by emailing a code
    async fn create_reset_session(
        &self,
        identifier: &str,
    ) -> std::result::Result<AuthAttempt, ProviderError>;

    /// Complete a password reset with the emailed code
    async fn attempt_first_factor(
        &self,
        code: &str,
        new_password: &str,
    ) -> std::result::Result<AuthAttempt, ProviderError>;

    /// Register a new account
    async fn create_signup(
        &self,
        email: &str,
        password: &str,
    ) -> std::result::Result<AuthAttempt, ProviderError>;

    /// Send the verification code for the pending sign-up
    async fn prepare_email_verification(&self) -> std::result::Result<(), ProviderError>;

    /// Verify the pending sign-up's email
    async fn attempt_email_verification(
        &self,
        code: &str,
    ) -> std::result::Result<AuthAttempt, ProviderError>;

    /// Make a created session the active one
    async fn set_active_session(&self, session_id: &str) -> std::result::Result<(), ProviderError>;

    /// End the active session
    async fn sign_out(&self) -> std::result::Result<(), ProviderError>;

    /// Token the backend accepts for the active session, if any
    async fn backend_token(&self) -> std::result::Result<Option<String>, ProviderError>;
}

// =============================================================================
// Domain gate
// =============================================================================

/// Restricts identifiers to one email domain
///
/// The check is a plain, case-sensitive suffix match and never touches the
/// network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailDomainGate {
    suffix: String,
}

impl Default for EmailDomainGate {
    fn default() -> Self {
        Self::new(DEFAULT_EMAIL_DOMAIN)
    }
}

impl EmailDomainGate {
    /// Gate accepting identifiers ending in `suffix` (e.g. `@example.edu`)
    pub fn new(suffix: impl Into<String>) -> Self {
        Self { suffix: suffix.into() }
    }

    /// Accepted suffix
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Whether `email` is accepted
    pub fn accepts(&self, email: &str) -> bool {
        email.ends_with(&self.suffix)
    }

    /// Reject identifiers outside the domain
    pub fn check(&self, email: &str) -> Result<()> {
        if self.accepts(email) {
            Ok(())
        } else {
            Err(AuthError::DomainRejection { suffix: self.suffix.clone() })
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Form fields the flows require
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    /// Email address
    Email,
    /// Emailed code
    Code,
    /// New password
    NewPassword,
    /// Password confirmation
    ConfirmPassword,
}

/// Flow that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOperation {
    /// Password sign-in
    SignIn,
    /// Reset code request
    PasswordResetRequest,
    /// Account registration
    SignUp,
    /// Email verification after sign-up
    EmailVerification,
    /// Setting a new password with a code
    PasswordReset,
    /// Signing out
    SignOut,
}

impl AuthOperation {
    fn unexpected_status_message(&self) -> &'static str {
        match self {
            AuthOperation::SignIn => "Unexpected sign-in state",
            AuthOperation::PasswordResetRequest => "Unable to send password reset email.",
            AuthOperation::EmailVerification => "Invalid or expired code.",
            AuthOperation::PasswordReset => "Unexpected state during password reset.",
            AuthOperation::SignUp | AuthOperation::SignOut => GENERIC_FAILURE,
        }
    }
}

const GENERIC_FAILURE: &str = "Something went wrong";

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// The provider has not finished loading
    #[error("Identity provider is not ready")]
    NotReady,

    /// Identifier outside the allowed email domain
    #[error("Email must end with {suffix}")]
    DomainRejection {
        /// Accepted suffix
        suffix: String,
    },

    /// A required field is empty
    #[error("Missing field: {0:?}")]
    MissingField(AuthField),

    /// Password and confirmation differ
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// The provider rejected the call
    #[error("{operation:?} failed: {source}")]
    Provider {
        /// Flow that failed
        operation: AuthOperation,
        /// Provider error
        #[source]
        source: ProviderError,
    },

    /// The provider answered with a status the flow cannot continue from
    #[error("{operation:?} ended in unexpected status {status}")]
    UnexpectedStatus {
        /// Flow that failed
        operation: AuthOperation,
        /// Status received
        status: AttemptStatus,
    },
}

/// Result type for authentication operations
pub type Result<T> = std::result::Result<T, AuthError>;

impl AuthError {
    fn provider(operation: AuthOperation) -> impl FnOnce(ProviderError) -> AuthError {
        move |source| {
            tracing::warn!(?operation, error = %source, "identity provider call failed");
            AuthError::Provider { operation, source }
        }
    }

    /// Message to show the user
    pub fn user_message(&self) -> String {
        match self {
            AuthError::NotReady => "Authentication is initializing...".to_string(),
            AuthError::DomainRejection { suffix } => {
                format!("Only {suffix} emails are allowed.")
            }
            AuthError::MissingField(AuthField::Email) => {
                "Please enter your email address.".to_string()
            }
            AuthError::MissingField(AuthField::Code) => {
                "Please enter the verification code.".to_string()
            }
            AuthError::MissingField(_) => "Please fill in all fields.".to_string(),
            AuthError::PasswordMismatch => "Passwords do not match.".to_string(),
            AuthError::Provider { source, .. } => source
                .message
                .clone()
                .unwrap_or_else(|| GENERIC_FAILURE.to_string()),
            AuthError::UnexpectedStatus { operation, .. } => {
                operation.unexpected_status_message().to_string()
            }
        }
    }

    /// True if no network call was made
    pub fn is_local(&self) -> bool {
        !matches!(self, AuthError::Provider { .. } | AuthError::UnexpectedStatus { .. })
    }
}

// =============================================================================
// Service
// =============================================================================

/// Authentication flows over an [`IdentityProvider`]
///
/// # Example
///
/// ```rust,ignore
/// let auth = AuthService::new(provider, sessions);
/// auth.sign_in("asha@marwadiuniversity.ac.in", "secret").await?;
/// ```
#[derive(Clone)]
pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
    sessions: Arc<dyn SessionSource>,
    gate: EmailDomainGate,
}

impl AuthService {
    /// Create a service gated on the default email domain
    pub fn new(provider: Arc<dyn IdentityProvider>, sessions: Arc<dyn SessionSource>) -> Self {
        Self {
            provider,
            sessions,
            gate: EmailDomainGate::default(),
        }
    }

    /// Use a different domain gate
    pub fn with_gate(mut self, gate: EmailDomainGate) -> Self {
        self.gate = gate;
        self
    }

    /// The domain gate in use
    pub fn gate(&self) -> &EmailDomainGate {
        &self.gate
    }

    /// The underlying provider
    pub fn provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.provider
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.sessions.session().loaded {
            Ok(())
        } else {
            Err(AuthError::NotReady)
        }
    }

    async fn activate(&self, operation: AuthOperation, attempt: AuthAttempt) -> Result<()> {
        match (attempt.status, attempt.created_session_id) {
            (AttemptStatus::Complete, Some(session_id)) => {
                self.provider
                    .set_active_session(&session_id)
                    .await
                    .map_err(AuthError::provider(operation))?;
                tracing::info!(?operation, "session activated");
                Ok(())
            }
            (status, _) => {
                tracing::warn!(?operation, %status, "attempt did not complete");
                Err(AuthError::UnexpectedStatus { operation, status })
            }
        }
    }

    /// Sign in with email and password, activating the new session
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<()> {
        self.ensure_ready()?;
        self.gate.check(email)?;

        let attempt = self
            .provider
            .create_session(email, password)
            .await
            .map_err(AuthError::provider(AuthOperation::SignIn))?;

        self.activate(AuthOperation::SignIn, attempt).await
    }

    /// Ask the provider to email a reset code
    ///
    /// Any live status is returned to the caller; `abandoned` and unknown
    /// statuses fail with [`AuthError::UnexpectedStatus`].
    pub async fn send_reset_code(&self, email: &str) -> Result<AuthAttempt> {
        self.ensure_ready()?;
        if email.is_empty() {
            return Err(AuthError::MissingField(AuthField::Email));
        }

        let attempt = self
            .provider
            .create_reset_session(email)
            .await
            .map_err(AuthError::provider(AuthOperation::PasswordResetRequest))?;

        if attempt.status.is_dead_end() {
            tracing::warn!(status = %attempt.status, "password reset request ended");
            return Err(AuthError::UnexpectedStatus {
                operation: AuthOperation::PasswordResetRequest,
                status: attempt.status,
            });
        }

        tracing::info!(status = %attempt.status, "password reset requested");
        Ok(attempt)
    }

    /// Request a reset code, requiring the provider to wait for it
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        let attempt = self.send_reset_code(email).await?;
        match attempt.status {
            AttemptStatus::NeedsFirstFactor => Ok(()),
            status => Err(AuthError::UnexpectedStatus {
                operation: AuthOperation::PasswordResetRequest,
                status,
            }),
        }
    }

    /// Set a new password with the emailed code
    pub async fn reset_password(
        &self,
        code: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<()> {
        self.ensure_ready()?;
        for (value, field) in [
            (code, AuthField::Code),
            (new_password, AuthField::NewPassword),
            (confirm_password, AuthField::ConfirmPassword),
        ] {
            if value.is_empty() {
                return Err(AuthError::MissingField(field));
            }
        }
        if new_password != confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        let attempt = self
            .provider
            .attempt_first_factor(code, new_password)
            .await
            .map_err(AuthError::provider(AuthOperation::PasswordReset))?;

        match attempt.status {
            AttemptStatus::Complete => {
                tracing::info!("password reset");
                Ok(())
            }
            status => Err(AuthError::UnexpectedStatus {
                operation: AuthOperation::PasswordReset,
                status,
            }),
        }
    }

    /// Register and send the email verification code
    pub async fn sign_up(&self, email: &str, password: &str, confirm_password: &str) -> Result<()> {
        self.ensure_ready()?;
        self.gate.check(email)?;
        if password != confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        let operation = AuthOperation::SignUp;
        let attempt = self
            .provider
            .create_signup(email, password)
            .await
            .map_err(AuthError::provider(operation))?;
        if attempt.status.is_dead_end() {
            tracing::warn!(status = %attempt.status, "sign-up attempt ended");
            return Err(AuthError::UnexpectedStatus {
                operation,
                status: attempt.status,
            });
        }

        self.provider
            .prepare_email_verification()
            .await
            .map_err(AuthError::provider(operation))?;

        tracing::info!("sign-up created, verification code sent");
        Ok(())
    }

    /// Verify the sign-up email and activate the new session
    pub async fn verify_email(&self, code: &str) -> Result<()> {
        self.ensure_ready()?;
        if code.is_empty() {
            return Err(AuthError::MissingField(AuthField::Code));
        }

        let attempt = self
            .provider
            .attempt_email_verification(code)
            .await
            .map_err(AuthError::provider(AuthOperation::EmailVerification))?;

        self.activate(AuthOperation::EmailVerification, attempt).await
    }

    /// End the active session
    pub async fn sign_out(&self) -> Result<()> {
        self.provider
            .sign_out()
            .await
            .map_err(AuthError::provider(AuthOperation::SignOut))?;
        tracing::info!("signed out");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
