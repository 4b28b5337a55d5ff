//! Media selection
//!
//! The device media picker is an external collaborator. This module defines
//! the seam to it ([`MediaPicker`]), the options the create screen asks it
//! for, and the local file handle it hands back.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while picking media
#[derive(Debug, Error)]
pub enum MediaError {
    /// The user has not granted library access
    #[error("Media library permission denied")]
    PermissionDenied,

    /// The picker failed
    #[error("Media picker failed: {0}")]
    Picker(String),
}

/// Result type for media operations
pub type Result<T> = std::result::Result<T, MediaError>;

/// Image formats the storage endpoint accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupportedFormat {
    /// JPEG format
    Jpeg,
    /// PNG format
    Png,
}

impl SupportedFormat {
    /// Get the MIME type for this format
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// Infer the format from a file extension
    ///
    /// Pickers re-encode edited images as JPEG, so anything that is not
    /// recognisably PNG is sent as JPEG.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("png") => Self::Png,
            _ => Self::Jpeg,
        }
    }
}

/// Reference to an image file on the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalImage {
    /// Local file path
    pub path: PathBuf,
    /// Format to declare on upload
    pub format: SupportedFormat,
}

impl LocalImage {
    /// Wrap a local file, inferring its format from the extension
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = SupportedFormat::from_path(&path);
        Self { path, format }
    }

    /// MIME type to upload with
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// Options passed to the picker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickerOptions {
    /// Let the user crop before returning
    pub allows_editing: bool,
    /// Crop aspect ratio (width, height)
    pub aspect: (u32, u32),
    /// Compression quality in `0.0..=1.0`
    pub quality: f32,
}

impl Default for PickerOptions {
    fn default() -> Self {
        Self {
            allows_editing: true,
            aspect: (1, 1),
            quality: 0.8,
        }
    }
}

/// Device media picker
#[async_trait]
pub trait MediaPicker: Send + Sync {
    /// Let the user choose an image; `Ok(None)` means they cancelled
    async fn pick_image(&self, options: &PickerOptions) -> Result<Option<LocalImage>>;
}
