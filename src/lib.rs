//! Campus Feed application wiring
//!
//! [`App`] builds the backend clients from [`config::Settings`], owns the
//! shared session signal and navigator, runs the route guard, and hands out
//! screen controllers. The identity provider and the media picker are
//! platform adapters supplied by the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! campus_feed::telemetry::init_tracing();
//! let settings = campus_feed::config::Settings::load()?;
//! let app = campus_feed::App::new(settings, identity, picker, sessions)?;
//! let _tasks = app.start();
//! let create = app.create_screen();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod telemetry;

use app_core::auth::{AuthService, EmailDomainGate, IdentityProvider};
use app_core::feeds::FeedService;
use app_core::media::MediaPicker;
use app_core::posts::PostPublisher;
use app_state::session::{Session, SessionSignal, SessionSource};
use app_ui::guard::RouteGuard;
use app_ui::navigation::{Route, SharedNavigator};
use app_ui::screens::{
    CreateScreen, FeedScreen, LoginScreen, ProfileScreen, ResetPasswordScreen, SignUpScreen,
};
use backend_client::{
    HttpBackend, HttpBlobUploader, RpcClient, RpcClientConfig, RpcError, TransferError,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::config::Settings;

/// Errors building the application
#[derive(Debug, Error)]
pub enum AppError {
    /// Settings could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    /// The RPC client could not be built
    #[error("Backend client error: {0}")]
    Rpc(#[from] RpcError),

    /// The blob uploader could not be built
    #[error("Uploader error: {0}")]
    Transfer(#[from] TransferError),
}

/// Background tasks started by [`App::start`]
pub struct AppTasks {
    /// Route guard loop
    pub guard: JoinHandle<()>,
    /// Backend token follower
    pub token_sync: JoinHandle<()>,
}

impl AppTasks {
    /// Stop both tasks
    pub fn abort(&self) {
        self.guard.abort();
        self.token_sync.abort();
    }
}

/// The assembled application
pub struct App {
    settings: Settings,
    rpc: RpcClient,
    sessions: SessionSignal,
    navigator: Arc<SharedNavigator>,
    auth: AuthService,
    feed: FeedService,
    publisher: Arc<PostPublisher>,
    picker: Arc<dyn MediaPicker>,
}

impl App {
    /// Build the application
    ///
    /// `sessions` is the signal the identity provider adapter writes to.
    pub fn new(
        settings: Settings,
        identity: Arc<dyn IdentityProvider>,
        picker: Arc<dyn MediaPicker>,
        sessions: SessionSignal,
    ) -> Result<Self, AppError> {
        let rpc_config = RpcClientConfig::new(settings.backend.url.clone())
            .with_timeout(settings.backend.request_timeout());
        let uploader =
            HttpBlobUploader::new(settings.backend.upload_timeout(), &rpc_config.user_agent)?;
        let rpc = RpcClient::new(rpc_config)?;

        let backend =
            Arc::new(HttpBackend::new(rpc.clone()).with_feed_retries(settings.backend.feed_retries));
        let auth = AuthService::new(identity, Arc::new(sessions.clone())).with_gate(
            EmailDomainGate::new(settings.auth.allowed_email_domain.clone()),
        );

        tracing::info!(backend = %settings.backend.url, "app configured");

        Ok(Self {
            rpc,
            sessions,
            navigator: Arc::new(SharedNavigator::new(Route::Login)),
            auth,
            feed: FeedService::new(backend.clone()),
            publisher: Arc::new(PostPublisher::new(backend, Arc::new(uploader))),
            picker,
            settings,
        })
    }

    /// Loaded settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Shared session signal
    pub fn sessions(&self) -> &SessionSignal {
        &self.sessions
    }

    /// Shared navigator
    pub fn navigator(&self) -> &Arc<SharedNavigator> {
        &self.navigator
    }

    /// Backend RPC client
    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    /// Spawn the route guard and the backend token follower
    pub fn start(&self) -> AppTasks {
        let guard = RouteGuard::new(self.navigator.clone());
        let guard = tokio::spawn(guard.run(self.sessions.subscribe(), self.navigator.subscribe()));

        let token_sync = tokio::spawn(follow_backend_token(
            self.auth.provider().clone(),
            self.rpc.clone(),
            self.sessions.subscribe(),
        ));

        AppTasks { guard, token_sync }
    }

    /// Sign-in screen controller
    pub fn login_screen(&self) -> LoginScreen {
        LoginScreen::new(self.auth.clone(), self.navigator.clone())
    }

    /// Sign-up screen controller
    pub fn sign_up_screen(&self) -> SignUpScreen {
        SignUpScreen::new(self.auth.clone(), self.navigator.clone())
    }

    /// Password reset screen controller
    pub fn reset_password_screen(&self) -> ResetPasswordScreen {
        ResetPasswordScreen::new(self.auth.clone(), self.navigator.clone())
    }

    /// Feed screen controller
    pub fn feed_screen(&self) -> FeedScreen {
        FeedScreen::new(self.feed.clone())
    }

    /// Create screen controller, shareable with a background share task
    pub fn create_screen(&self) -> Arc<CreateScreen> {
        Arc::new(CreateScreen::new(
            self.publisher.clone(),
            self.picker.clone(),
            self.navigator.clone(),
        ))
    }

    /// Profile screen controller
    pub fn profile_screen(&self) -> ProfileScreen {
        ProfileScreen::new(self.auth.clone(), self.navigator.clone())
    }
}

/// Keep the backend bearer token in step with the session
async fn follow_backend_token(
    identity: Arc<dyn IdentityProvider>,
    rpc: RpcClient,
    mut sessions: tokio::sync::watch::Receiver<Session>,
) {
    loop {
        let session = *sessions.borrow_and_update();
        apply_backend_token(identity.as_ref(), &rpc, session).await;

        if sessions.changed().await.is_err() {
            return;
        }
    }
}

async fn apply_backend_token(identity: &dyn IdentityProvider, rpc: &RpcClient, session: Session) {
    if !(session.loaded && session.active) {
        if rpc.has_auth_token() {
            tracing::debug!("session inactive, clearing backend token");
        }
        rpc.clear_auth_token();
        return;
    }

    match identity.backend_token().await {
        Ok(Some(token)) => {
            rpc.set_auth_token(token);
            tracing::debug!("backend token refreshed");
        }
        Ok(None) => rpc.clear_auth_token(),
        Err(e) => tracing::warn!(error = %e, "failed to fetch backend token"),
    }
}
