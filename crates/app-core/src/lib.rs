//! Core application logic for Campus Feed
//!
//! This crate contains the business logic behind the screens: event
//! categories, post drafting and publication, the feed, authentication
//! flows, and the media picker boundary.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod categories;
pub mod feeds;
pub mod media;
pub mod posts;

pub use auth::{
    AttemptStatus, AuthAttempt, AuthError, AuthService, EmailDomainGate, IdentityProvider,
    ProviderError,
};
pub use categories::{Category, CATEGORIES, DEFAULT_CATEGORY};
pub use feeds::{CategoryFilter, FeedError, FeedItem, FeedService};
pub use media::{LocalImage, MediaError, MediaPicker, PickerOptions};
pub use posts::{DraftField, DraftPost, PostPublisher, PublishError, UploadFailure};
