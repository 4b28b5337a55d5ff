//! Campus event feed
//!
//! Loads the feed from the backend and filters it by category. The backend
//! joins author profiles server-side, so a [`FeedItem`] is ready to render.

use backend_client::{BackendService, FeedPost, RpcError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::categories::DEFAULT_CATEGORY;

/// Label of the pseudo-category that shows everything
pub const ALL_LABEL: &str = "All";

/// Errors that can occur during feed operations
#[derive(Debug, Error)]
pub enum FeedError {
    /// The feed query failed
    #[error("Failed to load feed: {0}")]
    Backend(#[from] RpcError),
}

/// Result type for feed operations
pub type Result<T> = std::result::Result<T, FeedError>;

impl FeedError {
    /// Message to show in place of the feed
    pub fn user_message(&self) -> String {
        match self {
            FeedError::Backend(e) if e.is_network_error() => {
                "You're offline or the server is unreachable. Pull to retry.".to_string()
            }
            FeedError::Backend(_) => "Couldn't load posts. Pull to retry.".to_string(),
        }
    }
}

/// A post as shown in the feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Document id
    pub id: String,
    /// Title, empty when the post has none
    pub title: String,
    /// Body text
    pub content: String,
    /// Category name
    pub category: String,
    /// Image URL
    pub image_url: Option<String>,
    /// Author username
    pub author_username: String,
    /// Author avatar URL
    pub author_image: Option<String>,
}

impl From<FeedPost> for FeedItem {
    fn from(post: FeedPost) -> Self {
        Self {
            id: post.id,
            title: post.title.unwrap_or_default(),
            content: post.caption.unwrap_or_default(),
            category: post
                .category
                .unwrap_or_else(|| DEFAULT_CATEGORY.name.to_string()),
            image_url: post.image_url,
            author_username: post.author.username,
            author_image: post.author.image,
        }
    }
}

/// Category selection on the feed
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CategoryFilter {
    /// Every post
    #[default]
    All,
    /// Only posts with this exact category name
    Only(String),
}

impl CategoryFilter {
    /// Build a filter from a chip label
    pub fn from_label(label: &str) -> Self {
        if label == ALL_LABEL {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(label.to_string())
        }
    }

    /// Chip label for this filter
    pub fn label(&self) -> &str {
        match self {
            CategoryFilter::All => ALL_LABEL,
            CategoryFilter::Only(name) => name,
        }
    }

    /// Whether an item passes the filter
    pub fn matches(&self, item: &FeedItem) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(name) => item.category == *name,
        }
    }

    /// Items that pass the filter, in feed order
    pub fn apply(&self, items: &[FeedItem]) -> Vec<FeedItem> {
        items.iter().filter(|item| self.matches(item)).cloned().collect()
    }
}

/// Reads the feed from the backend
#[derive(Clone)]
pub struct FeedService {
    backend: Arc<dyn BackendService>,
}

impl FeedService {
    /// Create a feed service
    pub fn new(backend: Arc<dyn BackendService>) -> Self {
        Self { backend }
    }

    /// Fetch the whole feed
    pub async fn load(&self) -> Result<Vec<FeedItem>> {
        let posts = self.backend.get_feed_posts().await.map_err(|e| {
            tracing::warn!(error = %e, "feed query failed");
            FeedError::from(e)
        })?;

        tracing::debug!(count = posts.len(), "feed loaded");
        Ok(posts.into_iter().map(FeedItem::from).collect())
    }
}
