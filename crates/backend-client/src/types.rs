//! Wire types exchanged with the backend data service

use serde::{Deserialize, Serialize};

/// Server-assigned identifier of an uploaded blob
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageId(String);

impl StorageId {
    /// Wrap a raw storage id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StorageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One-time write URL for a single blob upload
///
/// Minted per submission attempt; a failed transfer needs a fresh one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UploadUrl(String);

impl UploadUrl {
    /// Wrap a raw URL
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Get the raw URL
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Body returned by the storage endpoint after a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    /// Id of the stored blob
    pub storage_id: StorageId,
}

/// Arguments of the `posts:createPost` mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    /// Uploaded image
    pub storage_id: StorageId,
    /// Post body (the draft's description)
    pub caption: String,
    /// Category name
    pub category: String,
    /// Post title
    pub title: String,
    /// Event location (may be empty)
    pub location: String,
    /// Event date as typed by the author (may be empty)
    pub event_date: String,
}

/// Author of a feed post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Display username
    pub username: String,
    /// Avatar URL
    #[serde(default)]
    pub image: Option<String>,
}

/// Feed entry returned by `posts:getFeedPosts`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPost {
    /// Document id
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Post title
    #[serde(default)]
    pub title: Option<String>,
    /// Post body
    #[serde(default)]
    pub caption: Option<String>,
    /// Category name
    #[serde(default)]
    pub category: Option<String>,
    /// Resolved image URL
    #[serde(default)]
    pub image_url: Option<String>,
    /// Joined author profile
    pub author: Author,
}
