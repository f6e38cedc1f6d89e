//! Storage contracts and the SQLite implementation.
//!
//! # Responsibility
//! - Define the capability set the organizer needs from persistence.
//! - Keep SQL inside the repository boundary.
//!
//! # Invariants
//! - Multi-row writes (item plus tags) commit or roll back as one unit.
//! - Read paths reject invalid persisted rows instead of masking them.

pub mod item_repo;
