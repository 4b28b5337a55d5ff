//! Fakes shared by the screen controller tests

use app_core::auth::{AuthAttempt, IdentityProvider, ProviderError};
use app_core::media::{self, LocalImage, MediaPicker, PickerOptions};
use async_trait::async_trait;
use backend_client::{
    transfer, BackendService, BlobUploader, FeedPost, NewPost, RpcError, UploadResponse, UploadUrl,
};
use mockall::mock;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

mock! {
    pub Identity {}

    #[async_trait]
    impl IdentityProvider for Identity {
        async fn create_session(&self, identifier: &str, password: &str)
            -> Result<AuthAttempt, ProviderError>;
        async fn create_reset_session(&self, identifier: &str)
            -> Result<AuthAttempt, ProviderError>;
        async fn attempt_first_factor(&self, code: &str, new_password: &str)
            -> Result<AuthAttempt, ProviderError>;
        async fn create_signup(&self, email: &str, password: &str)
            -> Result<AuthAttempt, ProviderError>;
        async fn prepare_email_verification(&self) -> Result<(), ProviderError>;
        async fn attempt_email_verification(&self, code: &str)
            -> Result<AuthAttempt, ProviderError>;
        async fn set_active_session(&self, session_id: &str) -> Result<(), ProviderError>;
        async fn sign_out(&self) -> Result<(), ProviderError>;
        async fn backend_token(&self) -> Result<Option<String>, ProviderError>;
    }
}

/// Backend counting calls, with an optional gate held inside
/// `generate_upload_url`
#[derive(Default)]
pub struct FakeBackend {
    pub mint_calls: AtomicUsize,
    pub commits: Mutex<Vec<NewPost>>,
    pub feed: Mutex<Vec<FeedPost>>,
    pub fail_commit: Mutex<bool>,
    pub fail_feed: Mutex<bool>,
    pub feed_calls: AtomicUsize,
    gate: Option<Arc<Gate>>,
}

/// Lets a test hold a call open
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

impl FakeBackend {
    pub fn gated() -> (Arc<Self>, Arc<Gate>) {
        let gate = Arc::new(Gate {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let backend = Self {
            gate: Some(gate.clone()),
            ..Default::default()
        };
        (Arc::new(backend), gate)
    }

    pub fn mint_calls(&self) -> usize {
        self.mint_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackendService for FakeBackend {
    async fn generate_upload_url(&self) -> Result<UploadUrl, RpcError> {
        self.mint_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        Ok(UploadUrl::new("https://storage.example/upload/once"))
    }

    async fn create_post(&self, post: NewPost) -> Result<(), RpcError> {
        if *self.fail_commit.lock() {
            return Err(RpcError::new(500, "InternalError", "commit failed"));
        }
        self.commits.lock().push(post);
        Ok(())
    }

    async fn get_feed_posts(&self) -> Result<Vec<FeedPost>, RpcError> {
        self.feed_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_feed.lock() {
            return Err(RpcError::new(0, "NetworkError", "offline"));
        }
        Ok(self.feed.lock().clone())
    }
}

/// Uploader answering with a fixed response
pub struct FakeUploader {
    pub response: Mutex<UploadResponse>,
    pub calls: AtomicUsize,
}

impl FakeUploader {
    pub fn answering(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(UploadResponse {
                status,
                body: body.to_string(),
            }),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobUploader for FakeUploader {
    async fn upload(
        &self,
        _target: &UploadUrl,
        _file: &Path,
        _mime_type: &str,
    ) -> transfer::Result<UploadResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.lock().clone())
    }
}

/// Picker returning a preset result and recording the options it saw
#[derive(Default)]
pub struct FakePicker {
    pub result: Mutex<Option<LocalImage>>,
    pub seen_options: Mutex<Vec<PickerOptions>>,
}

impl FakePicker {
    pub fn returning(image: Option<LocalImage>) -> Arc<Self> {
        Arc::new(Self {
            result: Mutex::new(image),
            seen_options: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl MediaPicker for FakePicker {
    async fn pick_image(&self, options: &PickerOptions) -> media::Result<Option<LocalImage>> {
        self.seen_options.lock().push(options.clone());
        Ok(self.result.lock().clone())
    }
}
