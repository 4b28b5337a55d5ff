//! Post drafting and publication
//!
//! A [`DraftPost`] accumulates what the author enters on the create screen.
//! [`PostPublisher`] drains a valid draft through the backend in four strictly
//! ordered steps:
//!
//! 1. mint a one-time upload URL,
//! 2. transfer the image bytes to it,
//! 3. read the storage id out of the upload response,
//! 4. commit the post record referencing that storage id.
//!
//! Nothing is retried automatically. A failure at any step leaves the draft
//! untouched so the author can simply share again, which mints a fresh upload
//! URL. A blob uploaded before a failed commit is left for the backend's own
//! storage lifecycle to collect.

use backend_client::{
    BackendService, BlobUploader, NewPost, RpcError, StorageId, TransferError, UploadReceipt,
};
use std::sync::Arc;
use thiserror::Error;

use crate::categories::{Category, DEFAULT_CATEGORY};
use crate::media::LocalImage;

// =============================================================================
// Draft
// =============================================================================

/// Draft fields that must be filled before sharing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    /// The picked image
    Image,
    /// Post title
    Title,
    /// Post description
    Description,
}

impl DraftField {
    /// Lower-case field label
    pub fn label(&self) -> &'static str {
        match self {
            DraftField::Image => "image",
            DraftField::Title => "title",
            DraftField::Description => "description",
        }
    }

    fn join(fields: &[DraftField]) -> String {
        fields.iter().map(DraftField::label).collect::<Vec<_>>().join(", ")
    }
}

/// In-progress post on the create screen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftPost {
    /// Picked image
    pub image: Option<LocalImage>,
    /// Post title
    pub title: String,
    /// Post body
    pub description: String,
    /// Event location (optional)
    pub location: String,
    /// Event date as typed (optional)
    pub event_date: String,
    /// Selected category (defaults to "Other" on commit)
    pub category: Option<Category>,
}

impl DraftPost {
    /// Create an empty draft
    pub fn new() -> Self {
        Self::default()
    }

    /// Required fields that are still empty, in form order
    pub fn missing_fields(&self) -> Vec<DraftField> {
        let mut missing = Vec::new();
        if self.image.is_none() {
            missing.push(DraftField::Image);
        }
        if self.title.is_empty() {
            missing.push(DraftField::Title);
        }
        if self.description.is_empty() {
            missing.push(DraftField::Description);
        }
        missing
    }

    /// True iff image, title and description are all present
    pub fn is_valid(&self) -> bool {
        self.image.is_some() && !self.title.is_empty() && !self.description.is_empty()
    }

    /// Check the draft locally, returning the image to upload
    pub fn validate(&self) -> Result<&LocalImage> {
        match &self.image {
            Some(image) if self.is_valid() => Ok(image),
            _ => Err(PublishError::Validation {
                missing: self.missing_fields(),
            }),
        }
    }

    /// Category name stored on the post
    pub fn category_name(&self) -> &'static str {
        self.category.unwrap_or(DEFAULT_CATEGORY).name
    }

    /// Record arguments for a blob that has been stored
    pub fn to_new_post(&self, storage_id: StorageId) -> NewPost {
        NewPost {
            storage_id,
            caption: self.description.clone(),
            category: self.category_name().to_string(),
            title: self.title.clone(),
            location: self.location.clone(),
            event_date: self.event_date.clone(),
        }
    }

    /// Reset every field
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Why the image transfer step failed
#[derive(Debug, Error)]
pub enum UploadFailure {
    /// No HTTP response was obtained
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// The storage endpoint answered with something other than 200
    #[error("storage endpoint answered HTTP {status}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, kept for logs
        body: String,
    },

    /// The response body did not carry a storage id
    #[error("malformed upload response: {0}")]
    MalformedResponse(String),
}

/// Publication errors
#[derive(Debug, Error)]
pub enum PublishError {
    /// Required draft fields are empty; nothing was sent
    #[error("Missing required fields: {}", DraftField::join(.missing))]
    Validation {
        /// Fields still empty
        missing: Vec<DraftField>,
    },

    /// The backend did not hand out an upload URL
    #[error("Could not get an upload target: {0}")]
    TargetAcquisition(#[source] RpcError),

    /// The image could not be stored
    #[error("Image upload failed: {0}")]
    Upload(#[source] UploadFailure),

    /// The post record could not be saved
    #[error("Could not save the post: {0}")]
    Commit(#[source] RpcError),
}

/// Result type for publication
pub type Result<T> = std::result::Result<T, PublishError>;

impl PublishError {
    /// Message to show the author
    pub fn user_message(&self) -> String {
        match self {
            PublishError::Validation { .. } => {
                "Add an image, a title and a description before sharing.".to_string()
            }
            PublishError::TargetAcquisition(_) | PublishError::Upload(_) => {
                "Couldn't upload your image. Please try again.".to_string()
            }
            PublishError::Commit(_) => "Couldn't share your post. Please try again.".to_string(),
        }
    }

    /// Whether sharing again without editing the draft can succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, PublishError::Validation { .. })
    }
}

// =============================================================================
// Publisher
// =============================================================================

/// Runs the publication steps against the backend
pub struct PostPublisher {
    backend: Arc<dyn BackendService>,
    uploader: Arc<dyn BlobUploader>,
}

impl PostPublisher {
    /// Create a publisher
    pub fn new(backend: Arc<dyn BackendService>, uploader: Arc<dyn BlobUploader>) -> Self {
        Self { backend, uploader }
    }

    /// Publish a draft, returning the storage id of its image
    ///
    /// Steps run strictly in order; the first failure ends the attempt.
    /// The draft is only read.
    pub async fn publish(&self, draft: &DraftPost) -> Result<StorageId> {
        let image = draft.validate()?;

        let target = self.backend.generate_upload_url().await.map_err(|e| {
            tracing::warn!(error = %e, "failed to mint upload url");
            PublishError::TargetAcquisition(e)
        })?;

        let response = self
            .uploader
            .upload(&target, &image.path, image.mime_type())
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "image transfer failed");
                PublishError::Upload(e.into())
            })?;

        if !response.is_ok() {
            tracing::warn!(status = response.status, "storage endpoint rejected upload");
            return Err(PublishError::Upload(UploadFailure::Status {
                status: response.status,
                body: response.body,
            }));
        }

        let receipt: UploadReceipt = serde_json::from_str(&response.body).map_err(|e| {
            tracing::warn!(error = %e, "upload response had no storage id");
            PublishError::Upload(UploadFailure::MalformedResponse(e.to_string()))
        })?;

        let storage_id = receipt.storage_id;
        tracing::debug!(%storage_id, "image stored");

        self.backend
            .create_post(draft.to_new_post(storage_id.clone()))
            .await
            .map_err(|e| {
                // The blob stays in storage without a record
                tracing::warn!(error = %e, %storage_id, "post commit failed");
                PublishError::Commit(e)
            })?;

        tracing::info!(%storage_id, category = draft.category_name(), "post published");
        Ok(storage_id)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use backend_client::{FeedPost, UploadResponse, UploadUrl};
    use mockall::{mock, predicate::eq};
    use std::path::Path;

    mock! {
        pub Backend {}

        #[async_trait]
        impl BackendService for Backend {
            async fn generate_upload_url(&self) -> std::result::Result<UploadUrl, RpcError>;
            async fn create_post(&self, post: NewPost) -> std::result::Result<(), RpcError>;
            async fn get_feed_posts(&self) -> std::result::Result<Vec<FeedPost>, RpcError>;
        }
    }

    mock! {
        pub Uploader {}

        #[async_trait]
        impl BlobUploader for Uploader {
            async fn upload(
                &self,
                target: &UploadUrl,
                file: &Path,
                mime_type: &str,
            ) -> backend_client::transfer::Result<UploadResponse>;
        }
    }

    fn valid_draft() -> DraftPost {
        DraftPost {
            image: Some(LocalImage::new("/data/picked/photo.jpg")),
            title: "T".to_string(),
            description: "D".to_string(),
            location: "Main ground".to_string(),
            event_date: "12 Jan".to_string(),
            category: Category::by_name("Sports"),
        }
    }

    fn minting_backend() -> MockBackend {
        let mut backend = MockBackend::new();
        backend
            .expect_generate_upload_url()
            .times(1)
            .returning(|| Ok(UploadUrl::new("https://storage.example/once")));
        backend
    }

    fn uploader_answering(status: u16, body: &'static str) -> MockUploader {
        let mut uploader = MockUploader::new();
        uploader
            .expect_upload()
            .times(1)
            .returning(move |_, _, _| Ok(UploadResponse { status, body: body.to_string() }));
        uploader
    }

    fn publisher(backend: MockBackend, uploader: MockUploader) -> PostPublisher {
        PostPublisher::new(Arc::new(backend), Arc::new(uploader))
    }

    #[test]
    fn test_draft_validity() {
        let mut draft = DraftPost {
            image: Some(LocalImage::new("x")),
            title: String::new(),
            description: "y".to_string(),
            ..Default::default()
        };
        assert!(!draft.is_valid());
        assert_eq!(draft.missing_fields(), vec![DraftField::Title]);

        draft.title = "t".to_string();
        assert!(draft.is_valid());
        assert!(draft.missing_fields().is_empty());

        draft.image = None;
        assert!(!draft.is_valid());
        assert!(matches!(
            draft.validate(),
            Err(PublishError::Validation { missing }) if missing == vec![DraftField::Image]
        ));
    }

    #[test]
    fn test_optional_fields_do_not_affect_validity() {
        let mut draft = valid_draft();
        draft.location.clear();
        draft.event_date.clear();
        draft.category = None;
        assert!(draft.is_valid());
        assert_eq!(draft.category_name(), "Other");
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut draft = valid_draft();
        draft.clear();
        assert_eq!(draft, DraftPost::new());
    }

    #[tokio::test]
    async fn test_happy_path_commits_record() {
        let mut backend = minting_backend();
        backend
            .expect_create_post()
            .with(eq(NewPost {
                storage_id: StorageId::new("abc"),
                caption: "D".to_string(),
                category: "Sports".to_string(),
                title: "T".to_string(),
                location: "Main ground".to_string(),
                event_date: "12 Jan".to_string(),
            }))
            .times(1)
            .returning(|_| Ok(()));

        let mut uploader = MockUploader::new();
        uploader
            .expect_upload()
            .withf(|target, file, mime| {
                target.as_str() == "https://storage.example/once"
                    && file == Path::new("/data/picked/photo.jpg")
                    && mime == "image/jpeg"
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(UploadResponse { status: 200, body: r#"{"storageId":"abc"}"#.to_string() })
            });

        let storage_id = publisher(backend, uploader).publish(&valid_draft()).await.unwrap();
        assert_eq!(storage_id, StorageId::new("abc"));
    }

    #[tokio::test]
    async fn test_invalid_draft_makes_no_calls() {
        // Mocks without expectations panic if called
        let publisher = publisher(MockBackend::new(), MockUploader::new());

        let mut draft = valid_draft();
        draft.description.clear();

        let err = publisher.publish(&draft).await.unwrap_err();
        assert!(matches!(err, PublishError::Validation { .. }));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_target_failure_stops_before_upload() {
        let mut backend = MockBackend::new();
        backend
            .expect_generate_upload_url()
            .times(1)
            .returning(|| Err(RpcError::new(0, "NetworkError", "offline")));

        let err = publisher(backend, MockUploader::new())
            .publish(&valid_draft())
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::TargetAcquisition(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_non_200_status_is_upload_error() {
        // create_post has no expectation: committing would panic
        let err = publisher(minting_backend(), uploader_answering(500, "internal"))
            .publish(&valid_draft())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PublishError::Upload(UploadFailure::Status { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_other_2xx_status_is_still_an_upload_error() {
        let err = publisher(minting_backend(), uploader_answering(204, ""))
            .publish(&valid_draft())
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::Upload(UploadFailure::Status { status: 204, .. })));
    }

    #[tokio::test]
    async fn test_malformed_body_is_upload_error() {
        let err = publisher(minting_backend(), uploader_answering(200, "<html>ok</html>"))
            .publish(&valid_draft())
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::Upload(UploadFailure::MalformedResponse(_))));
        assert_eq!(err.user_message(), "Couldn't upload your image. Please try again.");
    }

    #[tokio::test]
    async fn test_transfer_error_is_upload_error() {
        let mut uploader = MockUploader::new();
        uploader
            .expect_upload()
            .times(1)
            .returning(|_, _, _| Err(TransferError::Network("connection reset".to_string())));

        let err = publisher(minting_backend(), uploader)
            .publish(&valid_draft())
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::Upload(UploadFailure::Transfer(_))));
    }

    #[tokio::test]
    async fn test_commit_failure_is_commit_error() {
        let mut backend = minting_backend();
        backend
            .expect_create_post()
            .times(1)
            .returning(|_| Err(RpcError::new(200, "FunctionError", "Unauthenticated")));

        let err = publisher(backend, uploader_answering(200, r#"{"storageId":"abc"}"#))
            .publish(&valid_draft())
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::Commit(_)));
        assert_eq!(err.user_message(), "Couldn't share your post. Please try again.");
    }

    #[tokio::test]
    async fn test_missing_category_commits_other() {
        let mut backend = minting_backend();
        backend
            .expect_create_post()
            .withf(|post| post.category == "Other")
            .times(1)
            .returning(|_| Ok(()));

        let mut draft = valid_draft();
        draft.category = None;

        publisher(backend, uploader_answering(200, r#"{"storageId":"abc"}"#))
            .publish(&draft)
            .await
            .unwrap();
    }
}
