/// Shared data structures for the gallery state
///
/// These structs represent the data model that flows between
/// the fetch layer and the UI layer.

use iced::widget::image::Handle;

/// A reference to one remote photo.
///
/// The same URL serves both the thumbnail download and the
/// full-resolution download; there is no separate thumbnail endpoint.
/// Immutable once obtained; equality and hashing go by URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhotoRef {
    url: String,
}

impl PhotoRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// The download URL, used for both thumbnail and full-resolution fetches
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Identity of one grid position.
///
/// Slot ids are process-unique and never reused, so a thumbnail result
/// arriving after its batch was replaced can always be told apart from
/// a live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub(crate) u64);

/// Loading state of one grid thumbnail
#[derive(Debug, Clone)]
pub enum ThumbState {
    /// Fetch in flight, placeholder shown
    Loading,
    /// Decoded pixels ready for display
    Ready(Handle),
    /// Fetch or decode failed; the placeholder stays
    Failed,
}

impl ThumbState {
    #[cfg(test)]
    pub fn is_ready(&self) -> bool {
        matches!(self, ThumbState::Ready(_))
    }
}

/// One cell of the gallery grid: a photo plus its thumbnail state
#[derive(Debug, Clone)]
pub struct GridItem {
    /// Unique slot identity, used to match fetcher results
    pub slot: SlotId,
    /// The photo shown in this cell
    pub photo: PhotoRef,
    /// Current thumbnail state
    pub thumb: ThumbState,
}
