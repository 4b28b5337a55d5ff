//! Create-post screen
//!
//! Holds the draft between edits and runs the publication pipeline when the
//! author taps share. The in-flight flag is the only mutual exclusion: while
//! it is set, a second share, the image picker, every field setter and the
//! back button are all no-ops. The flag is released by a drop guard, so it is
//! cleared on every exit path.

use app_core::categories::Category;
use app_core::media::{MediaPicker, PickerOptions};
use app_core::posts::{DraftPost, PostPublisher, PublishError};
use backend_client::StorageId;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::Alert;
use crate::navigation::{Navigator, Route};

/// Result of tapping share
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    /// The post was published; the draft was cleared
    Published(StorageId),
    /// A share was already running; nothing was done
    AlreadySharing,
}

/// Holds the in-flight flag until dropped
struct SharingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> SharingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for SharingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Controller for the create-post screen
pub struct CreateScreen {
    publisher: Arc<PostPublisher>,
    picker: Arc<dyn MediaPicker>,
    navigator: Arc<dyn Navigator>,
    picker_options: PickerOptions,
    draft: Mutex<DraftPost>,
    sharing: AtomicBool,
    last_error: Mutex<Option<String>>,
}

impl CreateScreen {
    /// Create the controller with an empty draft
    pub fn new(
        publisher: Arc<PostPublisher>,
        picker: Arc<dyn MediaPicker>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            publisher,
            picker,
            navigator,
            picker_options: PickerOptions::default(),
            draft: Mutex::new(DraftPost::new()),
            sharing: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    /// Snapshot of the draft
    pub fn draft(&self) -> DraftPost {
        self.draft.lock().clone()
    }

    /// Whether a share is in flight
    pub fn is_sharing(&self) -> bool {
        self.sharing.load(Ordering::Acquire)
    }

    /// Whether the share button is enabled
    pub fn can_share(&self) -> bool {
        !self.is_sharing() && self.draft.lock().is_valid()
    }

    /// Message of the last failed share
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }

    // The flag is checked under the draft lock so an edit either lands
    // before a share snapshots the draft or is dropped.
    fn edit(&self, f: impl FnOnce(&mut DraftPost)) -> bool {
        let mut draft = self.draft.lock();
        if self.is_sharing() {
            tracing::debug!("draft edit ignored while sharing");
            return false;
        }
        f(&mut draft);
        true
    }

    /// Set the title
    pub fn set_title(&self, title: impl Into<String>) -> bool {
        let title = title.into();
        self.edit(|d| d.title = title)
    }

    /// Set the description
    pub fn set_description(&self, description: impl Into<String>) -> bool {
        let description = description.into();
        self.edit(|d| d.description = description)
    }

    /// Set the location
    pub fn set_location(&self, location: impl Into<String>) -> bool {
        let location = location.into();
        self.edit(|d| d.location = location)
    }

    /// Set the event date
    pub fn set_event_date(&self, event_date: impl Into<String>) -> bool {
        let event_date = event_date.into();
        self.edit(|d| d.event_date = event_date)
    }

    /// Select a category
    pub fn select_category(&self, category: Category) -> bool {
        self.edit(|d| d.category = Some(category))
    }

    /// Let the author pick an image
    ///
    /// Returns whether the draft's image changed. Cancelling the picker, or
    /// a share starting while it was open, leaves the draft as it was.
    pub async fn pick_image(&self) -> Result<bool, Alert> {
        if self.is_sharing() {
            return Ok(false);
        }

        let picked = self
            .picker
            .pick_image(&self.picker_options)
            .await
            .map_err(|e| Alert::new("Couldn't open your photos", e.to_string()))?;

        match picked {
            Some(image) => Ok(self.edit(|d| d.image = Some(image))),
            None => Ok(false),
        }
    }

    /// Leave the screen; disabled while sharing
    pub fn cancel(&self) -> bool {
        if self.is_sharing() {
            return false;
        }
        self.navigator.back()
    }

    /// Publish the draft
    ///
    /// On success the draft is cleared and the feed is shown with no history
    /// behind it. On failure the
    /// draft is kept as it was so sharing again needs no re-entry.
    pub async fn share(&self) -> Result<ShareOutcome, Alert> {
        let Some(_sharing) = SharingGuard::acquire(&self.sharing) else {
            tracing::debug!("share ignored, already sharing");
            return Ok(ShareOutcome::AlreadySharing);
        };

        let draft = self.draft.lock().clone();
        match self.publisher.publish(&draft).await {
            Ok(storage_id) => {
                self.draft.lock().clear();
                *self.last_error.lock() = None;
                self.navigator.reset(Route::Feed);
                Ok(ShareOutcome::Published(storage_id))
            }
            Err(e) => {
                let message = e.user_message();
                *self.last_error.lock() = Some(message.clone());
                let title = match e {
                    PublishError::Validation { .. } => "Missing details",
                    _ => "Share failed",
                };
                Err(Alert::new(title, message))
            }
        }
    }
}
