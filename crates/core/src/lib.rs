//! Pure gallery domain logic shared by the store, engine and API crates.
//!
//! Nothing in here performs I/O: every function is deterministic given its
//! inputs, which keeps the layout and navigation rules testable in isolation.

pub mod columns;
pub mod error;
pub mod layout;
pub mod lightbox;
pub mod media;
pub mod settings;
pub mod shuffle;
pub mod types;
