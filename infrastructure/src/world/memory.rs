//! Chunked in-memory world used by the CLI and by tests.
//!
//! Cells live in a sparse map. Writability is tracked per 16x16 column of
//! cells ("chunk"), matching how host simulations page terrain in and out.

use blueprint_application::{WorldHost, WorldStorage};
use blueprint_domain::{
    ActorId, CellState, DEFAULT_PALETTE, EMPTY_CELL, OperationTarget, Point3, WorldId,
};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Horizontal edge length of a chunk.
pub const CHUNK_SIZE: i32 = 16;

type ChunkPos = (i32, i32);

fn chunk_of(pos: Point3) -> ChunkPos {
    (pos.x.div_euclid(CHUNK_SIZE), pos.z.div_euclid(CHUNK_SIZE))
}

/// A single world held in memory.
#[derive(Debug, Clone)]
pub struct MemoryWorld {
    cells: HashMap<Point3, CellState>,
    loaded: HashSet<ChunkPos>,
    registry: HashSet<String>,
}

impl Default for MemoryWorld {
    fn default() -> Self {
        Self::with_registry(DEFAULT_PALETTE.iter().copied().chain([EMPTY_CELL]))
    }
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// World that resolves exactly `ids`.
    pub fn with_registry<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cells: HashMap::new(),
            loaded: HashSet::new(),
            registry: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn register(&mut self, id: impl Into<String>) {
        self.registry.insert(id.into());
    }

    /// Load every chunk touched by the box between `a` and `b`.
    pub fn load_area(&mut self, a: Point3, b: Point3) {
        let (min, max) = (chunk_of(a.min(b)), chunk_of(a.max(b)));
        for cx in min.0..=max.0 {
            for cz in min.1..=max.1 {
                self.loaded.insert((cx, cz));
            }
        }
    }

    /// Unload the chunk containing `pos`.
    pub fn unload(&mut self, pos: Point3) {
        self.loaded.remove(&chunk_of(pos));
    }

    pub fn loaded_chunks(&self) -> usize {
        self.loaded.len()
    }

    /// Non-empty cells in coordinate order.
    pub fn cells(&self) -> BTreeMap<Point3, &CellState> {
        self.cells.iter().map(|(pos, state)| (*pos, state)).collect()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl WorldStorage for MemoryWorld {
    fn is_loaded(&self, pos: Point3) -> bool {
        self.loaded.contains(&chunk_of(pos))
    }

    fn cell(&self, pos: Point3) -> Option<CellState> {
        self.cells.get(&pos).cloned()
    }

    fn set_cell(&mut self, pos: Point3, state: CellState) {
        if state.is_empty() {
            self.cells.remove(&pos);
        } else {
            self.cells.insert(pos, state);
        }
    }

    fn resolve(&self, target: &OperationTarget) -> Option<CellState> {
        self.registry
            .contains(target.as_str())
            .then(|| CellState::new(target.as_str()))
    }
}

/// Host with a fixed set of worlds and connected actors.
#[derive(Debug, Default)]
pub struct MemoryHost {
    worlds: HashMap<WorldId, MemoryWorld>,
    online: HashSet<ActorId>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_world(&mut self, id: WorldId, world: MemoryWorld) {
        self.worlds.insert(id, world);
    }

    pub fn memory_world(&self, id: &WorldId) -> Option<&MemoryWorld> {
        self.worlds.get(id)
    }

    pub fn memory_world_mut(&mut self, id: &WorldId) -> Option<&mut MemoryWorld> {
        self.worlds.get_mut(id)
    }

    pub fn connect(&mut self, actor: ActorId) {
        self.online.insert(actor);
    }

    pub fn disconnect(&mut self, actor: &ActorId) {
        self.online.remove(actor);
    }
}

impl WorldHost for MemoryHost {
    fn is_online(&self, actor: &ActorId) -> bool {
        self.online.contains(actor)
    }

    fn world(&self, id: &WorldId) -> Option<&dyn WorldStorage> {
        self.worlds.get(id).map(|w| w as &dyn WorldStorage)
    }

    fn world_mut(&mut self, id: &WorldId) -> Option<&mut dyn WorldStorage> {
        self.worlds.get_mut(id).map(|w| w as &mut dyn WorldStorage)
    }
}
