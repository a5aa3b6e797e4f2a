//! Domain model structs read from the hosted store.
//!
//! Rows arrive as loosely typed JSON. Each submodule contains the typed
//! entity and, where the stored shape needs coercion, a raw `*Row` struct
//! converted with `TryFrom`.

pub mod category;
pub mod gallery_item;
pub mod hero_banner;
pub mod site_setting;
pub mod vr_entry;
