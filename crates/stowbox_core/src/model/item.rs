//! Item record and canonical key.
//!
//! # Invariants
//! - `CanonicalKey` is never empty for a name with at least one token.
//! - The key is derived from a name on demand and never stored on `Item`.

use super::grid::{CellRef, SizeClass};
use crate::text::singularize::Singularizer;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Lowercase singular identity of an item name.
///
/// "Green LEDs", "green led" and "GREEN Led" share the key `green led`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// Derives the key from a free-form name.
    ///
    /// Returns `None` when the name has no tokens.
    pub fn derive(name: &str, singularizer: &Singularizer) -> Option<Self> {
        let key = name
            .split_whitespace()
            .map(|token| singularizer.singularize(token))
            .filter(|token| !token.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if key.is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CanonicalKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored item, possibly partially populated for selective transport.
///
/// Serialized with PascalCase field names; absent fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Item {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_small_box: Option<bool>,
    /// Epoch milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    /// Epoch milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl Item {
    /// Creates an item with only a name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Creates an item placed in `cell` and ready for insertion.
    pub fn placed(name: impl Into<String>, quantity: i64, cell: CellRef, size: SizeClass) -> Self {
        Self {
            name: name.into(),
            quantity: Some(quantity),
            row: Some(cell.row),
            col: Some(cell.col),
            is_small_box: Some(size.is_small()),
            created_at: None,
            updated_at: None,
        }
    }

    /// Box coordinates when both row and column are known.
    pub fn cell(&self) -> Option<CellRef> {
        match (self.row, self.col) {
            (Some(row), Some(col)) => Some(CellRef { row, col }),
            _ => None,
        }
    }

    pub fn size_class(&self) -> Option<SizeClass> {
        self.is_small_box.map(SizeClass::from_is_small)
    }

    /// Projection sent back to displays: name, quantity and location only.
    pub fn summary(&self) -> Self {
        Self {
            name: self.name.clone(),
            quantity: self.quantity,
            row: self.row,
            col: self.col,
            ..Self::default()
        }
    }
}

/// Item paired with how many query tags it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedItem {
    pub item: Item,
    pub tags_matched: u32,
}
