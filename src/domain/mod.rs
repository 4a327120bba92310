//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod geometry;
pub mod layout;

pub use arena::{ArenaNode, ForestArena};
pub use builder::{build_forest, ForestBuilder, OrphanPolicy};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use geometry::{staff_box_offset, staff_reservation, Geometry, StaffBoxOffset};
pub use layout::{classify, lay_out, CardKind, LanePartition, LayoutNode, NodeCard};
