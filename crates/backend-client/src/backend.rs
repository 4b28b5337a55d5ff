//! Typed backend operations
//!
//! [`BackendService`] is the seam the rest of the app programs against;
//! [`HttpBackend`] implements it on top of [`RpcClient`].

use async_trait::async_trait;

use crate::retry::network_retry;
use crate::rpc::{RpcClient, RpcError, RpcRequest};
use crate::types::{FeedPost, NewPost, UploadUrl};

/// Function path minting a one-time upload URL
pub const GENERATE_UPLOAD_URL: &str = "posts:generateUploadUrl";

/// Function path persisting a new post
pub const CREATE_POST: &str = "posts:createPost";

/// Function path returning the feed joined with author profiles
pub const GET_FEED_POSTS: &str = "posts:getFeedPosts";

/// Operations consumed from the backend data/storage service
#[async_trait]
pub trait BackendService: Send + Sync {
    /// Mint a one-time write target for a blob
    async fn generate_upload_url(&self) -> Result<UploadUrl, RpcError>;

    /// Persist a post referencing an already uploaded blob
    async fn create_post(&self, post: NewPost) -> Result<(), RpcError>;

    /// Fetch the feed, newest first
    async fn get_feed_posts(&self) -> Result<Vec<FeedPost>, RpcError>;
}

/// [`BackendService`] over the HTTP function API
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: RpcClient,
    feed_retries: usize,
}

impl HttpBackend {
    /// Create a backend over an RPC client
    pub fn new(client: RpcClient) -> Self {
        Self { client, feed_retries: 0 }
    }

    /// Retry the feed query this many times on network errors
    pub fn with_feed_retries(mut self, retries: usize) -> Self {
        self.feed_retries = retries;
        self
    }

    /// Underlying RPC client
    pub fn client(&self) -> &RpcClient {
        &self.client
    }
}

#[async_trait]
impl BackendService for HttpBackend {
    async fn generate_upload_url(&self) -> Result<UploadUrl, RpcError> {
        self.client.call(RpcRequest::mutation(GENERATE_UPLOAD_URL)).await
    }

    async fn create_post(&self, post: NewPost) -> Result<(), RpcError> {
        let request = RpcRequest::mutation(CREATE_POST)
            .args(&post)
            .map_err(|e| RpcError::new(0, "SerializationError", e.to_string()))?;

        // The mutation returns the new document id, which this client never reads
        let _id: serde_json::Value = self.client.call(request).await?;
        Ok(())
    }

    async fn get_feed_posts(&self) -> Result<Vec<FeedPost>, RpcError> {
        network_retry(self.feed_retries, || {
            self.client.call(RpcRequest::query(GET_FEED_POSTS))
        })
        .await
    }
}
