//! Core logic for the stowbox storage organizer.
//! Commands in, responses out; storage, parsing and box allocation live here.

pub mod command;
pub mod config;
pub mod db;
pub mod grid;
pub mod logging;
pub mod model;
pub mod protocol;
pub mod repo;
pub mod search;
pub mod service;
pub mod text;

pub use command::{Command, CommandKind, UnknownReason};
pub use config::{ConfigError, OrganizerConfig, RankingConfig};
pub use db::{open_db, open_db_in_memory, DbError};
pub use grid::allocator::BoxAllocator;
pub use grid::layout::{GridLayout, RowRange};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::grid::{CellRef, GridCell, SizeClass};
pub use model::item::{CanonicalKey, Item, TaggedItem};
pub use protocol::response::CommandResponse;
pub use repo::item_repo::{ItemRepository, RepoError, RepoResult, SqliteItemRepository};
pub use service::organizer_service::OrganizerService;
pub use text::singularize::Singularizer;
pub use text::tagger::{TagSet, Tagger};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
