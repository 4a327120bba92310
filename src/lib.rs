//! Organizational hierarchy engine.
//!
//! Turns flat, parent-referencing node records into a rooted forest,
//! splits every node's children into a standard and a staff lane, and
//! derives the spacing a renderer needs to keep staff boxes clear of
//! sibling subtrees.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
