use crate::assets::cache::SourceKey;
use crate::scene::model::OverlayId;
use std::collections::HashMap;

/// The entity slot an asynchronous image load is destined for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoadSlot {
    /// The base picture.
    Base,
    /// A not-yet-created overlay, one slot per request.
    NewOverlay(u64),
    /// Replacing the image of an existing overlay.
    OverlaySource(OverlayId),
}

/// Handle returned when a load starts; hand it back together with the bytes once they arrive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    pub slot: LoadSlot,
    pub source: SourceKey,
    pub mime: Option<String>,
}

/// Tracks which source each slot currently wants.
///
/// A completed load is accepted only if its source is still the slot's wanted source, regardless
/// of the order in which requests were issued or completed.
#[derive(Debug, Default)]
pub struct LoadTracker {
    wanted: HashMap<LoadSlot, SourceKey>,
    next_new_overlay: u64,
}

impl LoadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, slot: LoadSlot, source: SourceKey, mime: Option<String>) -> LoadTicket {
        self.wanted.insert(slot, source.clone());
        LoadTicket { slot, source, mime }
    }

    pub fn begin_new_overlay(&mut self, source: SourceKey, mime: Option<String>) -> LoadTicket {
        let slot = LoadSlot::NewOverlay(self.next_new_overlay);
        self.next_new_overlay += 1;
        self.begin(slot, source, mime)
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        self.wanted.get(&ticket.slot) == Some(&ticket.source)
    }

    /// Consume the slot if `ticket` is still current. Stale tickets return `false`.
    pub fn accept(&mut self, ticket: &LoadTicket) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(slot = ?ticket.slot, source = %ticket.source, "discarding stale load");
            return false;
        }
        self.wanted.remove(&ticket.slot);
        true
    }

    /// Drop whatever a slot was waiting for (e.g. the overlay was removed).
    pub fn forget(&mut self, slot: LoadSlot) {
        self.wanted.remove(&slot);
    }

    pub fn pending(&self) -> usize {
        self.wanted.len()
    }

    pub fn clear(&mut self) {
        self.wanted.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loads.rs"]
mod tests;
