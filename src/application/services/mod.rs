//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (NodeRepository, FileSystem)
//! but are themselves concrete structs, not traits.

mod structure;

pub use structure::{RefreshStatus, StructureService};
