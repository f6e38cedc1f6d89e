//! Organizer configuration loaded from TOML.
//!
//! # Responsibility
//! - Declare the box grid layout and ranking limits up front.
//! - Reject layouts the allocator or the coordinate encoding cannot serve.
//!
//! # Invariants
//! - Every field has a default; an empty file is a valid configuration.
//! - A loaded configuration has already passed `validate()`.

use crate::grid::layout::{GridLayout, GridLayoutError};
use crate::search::rank::{DEFAULT_BUNDLE_CANDIDATE_LIMIT, DEFAULT_FIND_TAGS_LIMIT};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DEFAULT_FIND_ITEM_FALLBACK_LIMIT: usize = 3;

/// Result caps for tag ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RankingConfig {
    pub find_tags_limit: usize,
    pub bundle_candidate_limit: usize,
    /// Hits returned by `FindItem` when the exact name is unknown.
    pub find_item_fallback_limit: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            find_tags_limit: DEFAULT_FIND_TAGS_LIMIT,
            bundle_candidate_limit: DEFAULT_BUNDLE_CANDIDATE_LIMIT,
            find_item_fallback_limit: DEFAULT_FIND_ITEM_FALLBACK_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrganizerConfig {
    pub grid: GridLayout,
    pub ranking: RankingConfig,
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    InvalidGrid(GridLayoutError),
    /// A ranking limit of zero would make every lookup empty.
    ZeroLimit(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::InvalidGrid(err) => write!(f, "invalid grid layout: {err}"),
            Self::ZeroLimit(field) => write!(f, "ranking.{field} must be greater than zero"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidGrid(err) => Some(err),
            Self::ZeroLimit(_) => None,
        }
    }
}

impl From<GridLayoutError> for ConfigError {
    fn from(value: GridLayoutError) -> Self {
        Self::InvalidGrid(value)
    }
}

impl OrganizerConfig {
    /// Parses and validates TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()?;
        let limits = [
            ("find_tags_limit", self.ranking.find_tags_limit),
            ("bundle_candidate_limit", self.ranking.bundle_candidate_limit),
            ("find_item_fallback_limit", self.ranking.find_item_fallback_limit),
        ];
        if let Some((field, _)) = limits.into_iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::ZeroLimit(field));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, OrganizerConfig};
    use crate::grid::layout::{GridLayoutError, RowRange};

    #[test]
    fn empty_config_uses_defaults() {
        let config = OrganizerConfig::from_toml_str("").unwrap();
        assert_eq!(config, OrganizerConfig::default());
        assert_eq!(config.ranking.find_tags_limit, 10);
        assert_eq!(config.ranking.bundle_candidate_limit, 3);
    }

    #[test]
    fn grid_section_overrides_layout() {
        let config = OrganizerConfig::from_toml_str(
            r#"
            [grid]
            columns = 5
            small_rows = { start = 0, end = 2 }
            large_rows = { start = 2, end = 3 }
            "#,
        )
        .unwrap();
        assert_eq!(config.grid.columns, 5);
        assert_eq!(config.grid.small_rows, RowRange::new(0, 2));
        assert_eq!(config.grid.large_rows, RowRange::new(2, 3));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = OrganizerConfig::from_toml_str("[grid]\ncolumns = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGrid(GridLayoutError::NoColumns)));

        let err = OrganizerConfig::from_toml_str("[ranking]\nfind_tags_limit = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ZeroLimit("find_tags_limit")));

        let err = OrganizerConfig::from_toml_str("[grid]\nrows = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
