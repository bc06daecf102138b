//! On-disk JSON layouts. Converted into the records in `structs.rs` on load.

pub mod hideout;
pub mod items;
pub mod projects;
