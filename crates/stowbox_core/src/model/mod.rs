//! Domain model for stored items and the box grid.
//!
//! # Responsibility
//! - Define item records shared by storage, ranking and responses.
//! - Define grid coordinates and box size classes.
//!
//! # Invariants
//! - An item is identified by its canonical key, derived from its name.
//! - Optional item fields stay `None` until a caller sets them.

pub mod grid;
pub mod item;
