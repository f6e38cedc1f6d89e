//! Wire-facing response envelopes.
//!
//! # Invariants
//! - Every response carries `Command` and `Success`.
//! - Absent optional fields are omitted from JSON, never written as `null`.

pub mod response;
