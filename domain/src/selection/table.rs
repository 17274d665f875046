//! Per-actor selection storage.

use super::region::{RegionSelection, SelectionKind};
use crate::core::ids::ActorId;
use std::collections::HashMap;

/// Build and context selections keyed by actor.
///
/// Entries are created lazily on the first corner event and removed on clear.
#[derive(Debug, Default)]
pub struct SelectionTable {
    entries: HashMap<(ActorId, SelectionKind), RegionSelection>,
}

impl SelectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, actor: &ActorId, kind: SelectionKind) -> Option<&RegionSelection> {
        self.entries.get(&(actor.clone(), kind))
    }

    /// Selection for the actor, or an empty one when none was recorded.
    pub fn get_or_empty(&self, actor: &ActorId, kind: SelectionKind) -> RegionSelection {
        self.get(actor, kind).copied().unwrap_or_default()
    }

    pub fn entry(&mut self, actor: &ActorId, kind: SelectionKind) -> &mut RegionSelection {
        self.entries.entry((actor.clone(), kind)).or_default()
    }

    pub fn clear(&mut self, actor: &ActorId, kind: SelectionKind) {
        self.entries.remove(&(actor.clone(), kind));
    }

    /// Forget everything recorded for an actor (e.g. on disconnect).
    pub fn forget_actor(&mut self, actor: &ActorId) {
        self.entries.retain(|(owner, _), _| owner != actor);
    }
}
