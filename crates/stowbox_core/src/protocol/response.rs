//! One response shape per command, serialized with PascalCase keys.

use crate::command::{CommandKind, UnknownReason};
use crate::model::grid::CellRef;
use crate::model::item::{Item, TaggedItem};
use crate::search::rank::{RankOutcome, NO_QUERY_COUNT};
use serde::Serialize;

/// Item lookup result, also used by quantity updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FindItemResponse {
    pub command: CommandKind,
    pub success: bool,
    /// Number of results, or `-1` when there is no result list.
    pub count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<Item>>,
    /// Set when results came from tag ranking instead of the exact name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuzzy: Option<bool>,
    /// Name that was asked for, echoed on misses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl FindItemResponse {
    pub fn found(command: CommandKind, items: Vec<Item>) -> Self {
        Self {
            command,
            success: !items.is_empty(),
            count: items.len() as i64,
            result: Some(items),
            fuzzy: None,
            name: None,
        }
    }

    pub fn fuzzy(items: Vec<Item>) -> Self {
        Self {
            fuzzy: Some(true),
            ..Self::found(CommandKind::FindItem, items)
        }
    }

    pub fn not_found(command: CommandKind, name: impl Into<String>) -> Self {
        Self {
            command,
            success: false,
            count: NO_QUERY_COUNT,
            result: None,
            fuzzy: None,
            name: Some(name.into()),
        }
    }
}

/// One ranked tag-search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TagHit {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col: Option<u32>,
    pub tags_matched: u32,
}

impl From<&TaggedItem> for TagHit {
    fn from(value: &TaggedItem) -> Self {
        Self {
            name: value.item.name.clone(),
            row: value.item.row,
            col: value.item.col,
            tags_matched: value.tags_matched,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FindTagsResponse {
    pub command: CommandKind,
    pub success: bool,
    /// Size of the query tag set, or `-1` when no tags could be read.
    pub count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<TagHit>>,
}

impl FindTagsResponse {
    pub fn from_outcome(outcome: &RankOutcome) -> Self {
        let result = match outcome {
            RankOutcome::NoQuery => None,
            RankOutcome::Ranked { hits, .. } => Some(hits.iter().map(TagHit::from).collect()),
        };
        Self {
            command: CommandKind::FindTags,
            success: !outcome.hits().is_empty(),
            count: outcome.wire_count(),
            result,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InsertItemResponse {
    pub command: CommandKind,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Set when the item was already stored and nothing was allocated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_stored: Option<bool>,
}

impl InsertItemResponse {
    pub fn inserted(name: impl Into<String>, cell: CellRef) -> Self {
        Self {
            command: CommandKind::InsertItem,
            success: true,
            row: Some(cell.row),
            col: Some(cell.col),
            name: Some(name.into()),
            already_stored: None,
        }
    }

    pub fn existing(item: &Item) -> Self {
        Self {
            command: CommandKind::InsertItem,
            success: true,
            row: item.row,
            col: item.col,
            name: Some(item.name.clone()),
            already_stored: Some(true),
        }
    }

    pub fn failed(name: Option<String>) -> Self {
        Self {
            command: CommandKind::InsertItem,
            success: false,
            row: None,
            col: None,
            name,
            already_stored: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RemoveItemResponse {
    pub command: CommandKind,
    pub success: bool,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col: Option<u32>,
}

impl RemoveItemResponse {
    pub fn removed(name: impl Into<String>, cell: Option<CellRef>) -> Self {
        Self {
            command: CommandKind::RemoveItem,
            success: true,
            name: name.into(),
            row: cell.map(|c| c.row),
            col: cell.map(|c| c.col),
        }
    }

    pub fn failed(name: impl Into<String>) -> Self {
        Self {
            command: CommandKind::RemoveItem,
            success: false,
            name: name.into(),
            row: None,
            col: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddTagsResponse {
    pub command: CommandKind,
    pub success: bool,
    /// Tags newly linked, or `-1` when nothing could be attempted.
    pub tags_added: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl AddTagsResponse {
    pub fn added(name: impl Into<String>, tags_added: usize) -> Self {
        Self {
            command: CommandKind::AddTags,
            success: true,
            tags_added: tags_added as i64,
            name: Some(name.into()),
        }
    }

    pub fn failed(name: Option<String>) -> Self {
        Self {
            command: CommandKind::AddTags,
            success: false,
            tags_added: -1,
            name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShowAllBoxesResponse {
    pub command: CommandKind,
    pub success: bool,
    pub count: i64,
    /// Two letters per box: row then column, `a` = 0.
    pub coordinates: String,
}

impl ShowAllBoxesResponse {
    pub fn from_cells(cells: &[CellRef]) -> Self {
        let coordinates = encode_cells(cells);
        Self {
            command: CommandKind::ShowAllBoxes,
            success: true,
            count: (coordinates.len() / 2) as i64,
            coordinates,
        }
    }

    pub fn failed() -> Self {
        Self {
            command: CommandKind::ShowAllBoxes,
            success: false,
            count: NO_QUERY_COUNT,
            coordinates: String::new(),
        }
    }
}

/// Encodes cells as `row letter, column letter` pairs.
///
/// Cells beyond `z` cannot be encoded and are skipped.
pub fn encode_cells(cells: &[CellRef]) -> String {
    cells
        .iter()
        .filter_map(|cell| Some([coordinate_letter(cell.row)?, coordinate_letter(cell.col)?]))
        .flatten()
        .collect()
}

fn coordinate_letter(value: u32) -> Option<char> {
    u8::try_from(value)
        .ok()
        .filter(|v| *v < 26)
        .map(|v| char::from(b'a' + v))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BundleWithResponse {
    pub command: CommandKind,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundled_with: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col: Option<u32>,
}

impl BundleWithResponse {
    pub fn bundled(name: &str, quantity: i64, bundled_with: &str, cell: CellRef) -> Self {
        Self {
            command: CommandKind::BundleWith,
            success: true,
            name: Some(name.to_string()),
            quantity: Some(quantity),
            bundled_with: Some(bundled_with.to_string()),
            row: Some(cell.row),
            col: Some(cell.col),
        }
    }

    /// Resolution succeeded but the write did not.
    pub fn not_stored(name: &str, quantity: i64, bundled_with: &str) -> Self {
        Self {
            command: CommandKind::BundleWith,
            success: false,
            name: Some(name.to_string()),
            quantity: Some(quantity),
            bundled_with: Some(bundled_with.to_string()),
            row: None,
            col: None,
        }
    }

    pub fn failed() -> Self {
        Self {
            command: CommandKind::BundleWith,
            success: false,
            name: None,
            quantity: None,
            bundled_with: None,
            row: None,
            col: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct HowManyResponse {
    pub command: CommandKind,
    pub success: bool,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col: Option<u32>,
}

impl HowManyResponse {
    pub fn counted(item: &Item) -> Self {
        Self {
            command: CommandKind::HowMany,
            success: true,
            name: item.name.clone(),
            quantity: item.quantity,
            row: item.row,
            col: item.col,
        }
    }

    pub fn failed(name: impl Into<String>) -> Self {
        Self {
            command: CommandKind::HowMany,
            success: false,
            name: name.into(),
            quantity: None,
            row: None,
            col: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UnknownCommandResponse {
    pub command: CommandKind,
    pub success: bool,
    pub unknown_command: String,
    pub reason: &'static str,
}

impl UnknownCommandResponse {
    pub fn new(unknown_command: impl Into<String>, reason: UnknownReason) -> Self {
        Self {
            command: CommandKind::UnknownCommand,
            success: false,
            unknown_command: unknown_command.into(),
            reason: reason.as_str(),
        }
    }
}

/// Response for any command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CommandResponse {
    FindItem(FindItemResponse),
    FindTags(FindTagsResponse),
    InsertItem(InsertItemResponse),
    RemoveItem(RemoveItemResponse),
    AddTags(AddTagsResponse),
    ShowAllBoxes(ShowAllBoxesResponse),
    BundleWith(BundleWithResponse),
    HowMany(HowManyResponse),
    Unknown(UnknownCommandResponse),
}

impl CommandResponse {
    pub fn command(&self) -> CommandKind {
        match self {
            Self::FindItem(r) => r.command,
            Self::FindTags(r) => r.command,
            Self::InsertItem(r) => r.command,
            Self::RemoveItem(r) => r.command,
            Self::AddTags(r) => r.command,
            Self::ShowAllBoxes(r) => r.command,
            Self::BundleWith(r) => r.command,
            Self::HowMany(r) => r.command,
            Self::Unknown(r) => r.command,
        }
    }

    pub fn success(&self) -> bool {
        match self {
            Self::FindItem(r) => r.success,
            Self::FindTags(r) => r.success,
            Self::InsertItem(r) => r.success,
            Self::RemoveItem(r) => r.success,
            Self::AddTags(r) => r.success,
            Self::ShowAllBoxes(r) => r.success,
            Self::BundleWith(r) => r.success,
            Self::HowMany(r) => r.success,
            Self::Unknown(r) => r.success,
        }
    }

    /// Serializes to JSON, optionally indented.
    pub fn to_json_string(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

macro_rules! impl_from_response {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for CommandResponse {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_response! {
    FindItem => FindItemResponse,
    FindTags => FindTagsResponse,
    InsertItem => InsertItemResponse,
    RemoveItem => RemoveItemResponse,
    AddTags => AddTagsResponse,
    ShowAllBoxes => ShowAllBoxesResponse,
    BundleWith => BundleWithResponse,
    HowMany => HowManyResponse,
    Unknown => UnknownCommandResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_fields_are_omitted_not_null() {
        let response = CommandResponse::from(InsertItemResponse::failed(None));
        let value: serde_json::Value =
            serde_json::from_str(&response.to_json_string(false).unwrap()).unwrap();
        assert_eq!(value, json!({"Command": "InsertItem", "Success": false}));
    }

    #[test]
    fn find_item_not_found_reports_minus_one() {
        let response = FindItemResponse::not_found(CommandKind::SetQuantity, "fuses");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({"Command": "SetQuantity", "Success": false, "Count": -1, "Name": "fuses"})
        );
    }

    #[test]
    fn show_all_boxes_encodes_two_letters_per_cell() {
        let cells = [CellRef::new(0, 0), CellRef::new(1, 2), CellRef::new(5, 7)];
        let response = ShowAllBoxesResponse::from_cells(&cells);
        assert_eq!(response.coordinates, "aabcfh");
        assert_eq!(response.count, 3);
    }

    #[test]
    fn unknown_command_echoes_original_name() {
        let response = UnknownCommandResponse::new("Dance", UnknownReason::UnrecognizedCommand);
        let value = serde_json::to_value(CommandResponse::from(response)).unwrap();
        assert_eq!(value["Command"], "UnknownCommand");
        assert_eq!(value["UnknownCommand"], "Dance");
        assert_eq!(value["Success"], false);
    }
}
