/// Selection and exclusion state
///
/// This struct tracks which photos the user has picked for the next
/// wallpaper and which ones they never want offered again. Selection is
/// capacity-bounded and keeps insertion order, because the collage places
/// photos row-major in the order they were picked. It survives batch
/// replacement and is only cleared by restarting the app.

use std::collections::HashSet;

use super::data::PhotoRef;

/// Maximum number of photos that can be selected at once
pub const MAX_SELECTED: usize = 10;

/// Outcome of a toggle attempt
///
/// Toggling never fails hard; the caller turns the non-mutating outcomes
/// into user-facing notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The photo was added to the selection
    Selected,
    /// The photo was removed from the selection
    Deselected,
    /// The selection already holds the maximum; nothing changed
    AtCapacity,
    /// The photo is excluded; toggles on it are ignored
    Excluded,
}

/// The user's current picks plus their permanent rejects
#[derive(Debug, Default)]
pub struct SelectionSet {
    /// Selected photos in insertion order (first selected → top-left cell)
    selected: Vec<PhotoRef>,
    /// Photos the user opted never to reconsider
    excluded: HashSet<PhotoRef>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle a photo in or out of the selection.
    ///
    /// Excluded photos are ignored. Adding past `MAX_SELECTED` is refused
    /// and reported as `AtCapacity`; removing is always allowed.
    pub fn toggle(&mut self, photo: &PhotoRef) -> ToggleOutcome {
        if self.excluded.contains(photo) {
            return ToggleOutcome::Excluded;
        }

        if let Some(position) = self.selected.iter().position(|p| p == photo) {
            self.selected.remove(position);
            return ToggleOutcome::Deselected;
        }

        if self.selected.len() >= MAX_SELECTED {
            return ToggleOutcome::AtCapacity;
        }

        self.selected.push(photo.clone());
        ToggleOutcome::Selected
    }

    /// Exclude a photo from all future consideration.
    ///
    /// An excluded photo can never re-enter the selection, so if it is
    /// currently selected it is removed here as well.
    pub fn exclude(&mut self, photo: &PhotoRef) {
        if let Some(position) = self.selected.iter().position(|p| p == photo) {
            self.selected.remove(position);
        }
        self.excluded.insert(photo.clone());
    }

    pub fn is_selected(&self, photo: &PhotoRef) -> bool {
        self.selected.iter().any(|p| p == photo)
    }

    pub fn is_excluded(&self, photo: &PhotoRef) -> bool {
        self.excluded.contains(photo)
    }

    /// Selected photos in the order they were picked
    pub fn photos(&self) -> &[PhotoRef] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}
