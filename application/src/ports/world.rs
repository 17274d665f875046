//! World access ports
//!
//! The host simulation owns the worlds; the application only reads and writes
//! cells through these traits, and only from the tick thread.

use blueprint_domain::{ActorId, CellState, OperationTarget, Point3, WorldId};

/// Cell storage of a single world.
pub trait WorldStorage {
    /// Whether the storage region containing `pos` is loaded and writable.
    fn is_loaded(&self, pos: Point3) -> bool;

    /// Current contents of a cell; `None` for empty.
    fn cell(&self, pos: Point3) -> Option<CellState>;

    fn set_cell(&mut self, pos: Point3, state: CellState);

    /// Map an operation target to a concrete cell value, if the world knows it.
    fn resolve(&self, target: &OperationTarget) -> Option<CellState>;
}

/// The host: connected actors and their worlds.
pub trait WorldHost {
    fn is_online(&self, actor: &ActorId) -> bool;

    fn world(&self, id: &WorldId) -> Option<&dyn WorldStorage>;

    fn world_mut(&mut self, id: &WorldId) -> Option<&mut dyn WorldStorage>;
}
