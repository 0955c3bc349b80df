/// Gallery grid state
///
/// The grid owns the current batch of photos: which cells exist, which
/// page of the listing they came from, and how far along each thumbnail
/// is. Fetcher results are matched to cells by slot id, never by arrival
/// order, so late results from a replaced batch fall on the floor here.

use iced::widget::image::Handle;

use super::data::{GridItem, PhotoRef, SlotId, ThumbState};

/// The photo grid shown to the user
#[derive(Debug)]
pub struct Gallery {
    /// Grid cells in display order (row-major, three columns)
    items: Vec<GridItem>,
    /// Listing page the most recent batch came from
    page: u32,
    /// Source of process-unique slot ids; never reused
    next_slot: u64,
}

impl Gallery {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            next_slot: 0,
        }
    }

    /// Replace the whole grid with a fresh batch.
    ///
    /// Returns the newly created slots so the caller can start one
    /// thumbnail fetcher per slot. Existing cells are discarded; their
    /// slot ids are retired and will never resolve again.
    pub fn replace_batch(
        &mut self,
        page: u32,
        photos: Vec<PhotoRef>,
    ) -> Vec<(SlotId, PhotoRef)> {
        self.items.clear();
        self.page = page;
        self.append_batch(photos)
    }

    /// Append another page of photos without touching existing cells.
    ///
    /// Returns the newly created slots, same as `replace_batch`.
    pub fn append_batch(&mut self, photos: Vec<PhotoRef>) -> Vec<(SlotId, PhotoRef)> {
        let mut spawned = Vec::with_capacity(photos.len());

        for photo in photos {
            let slot = self.allocate_slot();
            self.items.push(GridItem {
                slot,
                photo: photo.clone(),
                thumb: ThumbState::Loading,
            });
            spawned.push((slot, photo));
        }

        spawned
    }

    fn allocate_slot(&mut self) -> SlotId {
        let slot = SlotId(self.next_slot);
        self.next_slot += 1;
        slot
    }

    /// Install decoded pixels for a slot.
    ///
    /// Returns `false` when the slot is no longer part of the grid, i.e.
    /// a stale result from a batch that has since been replaced.
    pub fn thumbnail_ready(&mut self, slot: SlotId, handle: Handle) -> bool {
        match self.item_mut(slot) {
            Some(item) => {
                item.thumb = ThumbState::Ready(handle);
                true
            }
            None => false,
        }
    }

    /// Record a failed fetch for a slot; the placeholder stays visible.
    ///
    /// Returns `false` for retired slots, same as `thumbnail_ready`.
    pub fn thumbnail_failed(&mut self, slot: SlotId) -> bool {
        match self.item_mut(slot) {
            Some(item) => {
                item.thumb = ThumbState::Failed;
                true
            }
            None => false,
        }
    }

    fn item_mut(&mut self, slot: SlotId) -> Option<&mut GridItem> {
        self.items.iter_mut().find(|item| item.slot == slot)
    }

    /// The photo behind a slot, if the slot is still live
    pub fn photo(&self, slot: SlotId) -> Option<&PhotoRef> {
        self.items
            .iter()
            .find(|item| item.slot == slot)
            .map(|item| &item.photo)
    }

    pub fn items(&self) -> &[GridItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[cfg(test)]
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Advance to the next listing page and return it.
    ///
    /// Called when "load more" fires, before the listing request goes out.
    pub fn advance_page(&mut self) -> u32 {
        self.page += 1;
        self.page
    }
}

impl Default for Gallery {
    fn default() -> Self {
        Self::new()
    }
}
