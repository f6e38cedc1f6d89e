//! Organizer use cases.
//!
//! # Responsibility
//! - Turn decoded commands into repository calls and responses.
//! - Keep the CLI decoupled from storage and parsing details.

pub mod organizer_service;
