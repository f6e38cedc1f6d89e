//! Box grid layout and first-fit allocation.
//!
//! # Responsibility
//! - Describe which grid rows hold small boxes and which hold large ones.
//! - Pick the next free cell of a requested size class.
//!
//! # Invariants
//! - Size-class regions are static configuration, never inferred from data.
//! - Allocation only returns cells inside the requested region.
//! - Scan order is row ascending, then column ascending.

pub mod allocator;
pub mod layout;
