//! Free-text normalization into canonical keys and tags.
//!
//! # Responsibility
//! - Reduce surface forms ("LEDs", "Led") to one lowercase singular token.
//! - Build order-irrelevant tag sets from spoken phrases.
//!
//! # Invariants
//! - Normalization is pure and idempotent.
//! - No process-wide normalizer instance; callers construct and pass one.

pub mod singularize;
pub mod tagger;
