//! Feed screen

use app_core::categories::Category;
use app_core::feeds::{CategoryFilter, FeedItem, FeedService, ALL_LABEL};
use parking_lot::Mutex;

/// What the feed screen shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedScreenState {
    /// First load in progress
    Loading,
    /// Loaded, nothing matches the selected category
    Empty,
    /// Posts matching the selected category
    Ready(Vec<FeedItem>),
    /// First load failed
    Failed(String),
}

#[derive(Debug, Default)]
struct FeedView {
    items: Option<Vec<FeedItem>>,
    filter: CategoryFilter,
    error: Option<String>,
}

/// Controller for the feed screen
pub struct FeedScreen {
    feed: FeedService,
    view: Mutex<FeedView>,
}

impl FeedScreen {
    /// Create the controller; call [`FeedScreen::refresh`] to load
    pub fn new(feed: FeedService) -> Self {
        Self {
            feed,
            view: Mutex::new(FeedView::default()),
        }
    }

    /// Chip labels: "All" followed by every category
    pub fn category_labels() -> Vec<&'static str> {
        std::iter::once(ALL_LABEL)
            .chain(Category::all().iter().map(|c| c.name))
            .collect()
    }

    /// Query the feed again
    ///
    /// On failure the previous items stay visible and the error is kept for
    /// [`FeedScreen::error`].
    pub async fn refresh(&self) {
        match self.feed.load().await {
            Ok(items) => {
                let mut view = self.view.lock();
                view.items = Some(items);
                view.error = None;
            }
            Err(e) => {
                self.view.lock().error = Some(e.user_message());
            }
        }
    }

    /// Select a category chip; no network call is made
    pub fn select_category(&self, filter: CategoryFilter) {
        self.view.lock().filter = filter;
    }

    /// Selected category
    pub fn filter(&self) -> CategoryFilter {
        self.view.lock().filter.clone()
    }

    /// Error from the latest refresh, if it failed
    pub fn error(&self) -> Option<String> {
        self.view.lock().error.clone()
    }

    /// What to render
    pub fn state(&self) -> FeedScreenState {
        let view = self.view.lock();
        match (&view.items, &view.error) {
            (None, Some(error)) => FeedScreenState::Failed(error.clone()),
            (None, None) => FeedScreenState::Loading,
            (Some(items), _) => {
                let visible = view.filter.apply(items);
                if visible.is_empty() {
                    FeedScreenState::Empty
                } else {
                    FeedScreenState::Ready(visible)
                }
            }
        }
    }
}
