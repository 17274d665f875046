//! Region selection: two optional corners forming an inclusive box.
//!
//! - [`region::RegionSelection`]: the corner pair and derived min/max/size
//! - [`table::SelectionTable`]: per-actor build and context selections
//! - [`codec`]: the binary selection-update record exchanged with clients

pub mod codec;
pub mod region;
pub mod table;
