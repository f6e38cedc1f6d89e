//! Inbound commands decoded into a closed set of typed variants.
//!
//! # Responsibility
//! - Map the textual command name plus its payload to one `Command`.
//! - Parse free-text phrases (box size, tags, connectives) for handlers.
//!
//! # Invariants
//! - Decoding never fails: unknown names and malformed payloads become
//!   `Command::Unknown`.
//! - Payloads are inspected once here; handlers only see typed fields.

pub mod phrase;

use serde::Deserialize;
use serde_json::Value;

/// Quantity assumed when an insert or bundle request omits it.
pub const DEFAULT_INSERT_QUANTITY: i64 = 1;

/// Command names as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    FindItem,
    FindTags,
    InsertItem,
    RemoveItem,
    AddTags,
    UpdateQuantity,
    SetQuantity,
    ShowAllBoxes,
    BundleWith,
    HowMany,
    UnknownCommand,
}

impl CommandKind {
    pub const ALL: [CommandKind; 11] = [
        Self::FindItem,
        Self::FindTags,
        Self::InsertItem,
        Self::RemoveItem,
        Self::AddTags,
        Self::UpdateQuantity,
        Self::SetQuantity,
        Self::ShowAllBoxes,
        Self::BundleWith,
        Self::HowMany,
        Self::UnknownCommand,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FindItem => "FindItem",
            Self::FindTags => "FindTags",
            Self::InsertItem => "InsertItem",
            Self::RemoveItem => "RemoveItem",
            Self::AddTags => "AddTags",
            Self::UpdateQuantity => "UpdateQuantity",
            Self::SetQuantity => "SetQuantity",
            Self::ShowAllBoxes => "ShowAllBoxes",
            Self::BundleWith => "BundleWith",
            Self::HowMany => "HowMany",
            Self::UnknownCommand => "UnknownCommand",
        }
    }

    /// Exact, case-sensitive lookup of a recognized command name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .filter(|kind| *kind != Self::UnknownCommand)
            .find(|kind| kind.as_str() == name)
    }
}

impl serde::Serialize for CommandKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Why a request could not be mapped to a known command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownReason {
    /// Request text was not a JSON object with `command`.
    MalformedRequest,
    /// Command name is not recognized.
    UnrecognizedCommand,
    /// Command is known but its `data` has the wrong shape.
    MalformedPayload,
}

impl UnknownReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MalformedRequest => "malformed_request",
            Self::UnrecognizedCommand => "unrecognized_command",
            Self::MalformedPayload => "malformed_payload",
        }
    }
}

/// Decoded command with its strongly typed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FindItem { item: String },
    FindTags { text: String },
    InsertItem { info: String, quantity: i64 },
    RemoveItem { item: String },
    AddTags { text: String },
    UpdateQuantity { item: String, quantity: i64, add: bool },
    SetQuantity { item: String, quantity: i64 },
    ShowAllBoxes,
    BundleWith { info: String, quantity: i64 },
    HowMany { item: String },
    Unknown { command: String, reason: UnknownReason },
}

#[derive(Debug, Deserialize)]
struct RawRequest {
    command: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InfoPayload {
    #[serde(alias = "Item")]
    info: String,
    #[serde(default = "default_insert_quantity")]
    quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct QuantityPayload {
    #[serde(alias = "Info")]
    item: String,
    quantity: i64,
    #[serde(default = "default_add")]
    add: bool,
}

fn default_insert_quantity() -> i64 {
    DEFAULT_INSERT_QUANTITY
}

fn default_add() -> bool {
    true
}

impl Command {
    /// Decodes a full request document `{"command": ..., "data": ...}`.
    pub fn from_json_str(request: &str) -> Self {
        match serde_json::from_str::<RawRequest>(request) {
            Ok(raw) => Self::parse(&raw.command, &raw.data),
            Err(_) => Self::Unknown {
                command: String::new(),
                reason: UnknownReason::MalformedRequest,
            },
        }
    }

    /// Maps a command name and its payload to a typed command.
    pub fn parse(command: &str, payload: &Value) -> Self {
        let Some(kind) = CommandKind::parse(command) else {
            return Self::unknown(command, UnknownReason::UnrecognizedCommand);
        };

        let decoded = match kind {
            CommandKind::FindItem => query_payload(payload).map(|item| Self::FindItem { item }),
            CommandKind::FindTags => query_payload(payload).map(|text| Self::FindTags { text }),
            CommandKind::RemoveItem => text_payload(payload).map(|item| Self::RemoveItem { item }),
            CommandKind::AddTags => text_payload(payload).map(|text| Self::AddTags { text }),
            CommandKind::HowMany => text_payload(payload).map(|item| Self::HowMany { item }),
            CommandKind::InsertItem => object_payload::<InfoPayload>(payload)
                .map(|p| Self::InsertItem {
                    info: p.info,
                    quantity: p.quantity,
                }),
            CommandKind::BundleWith => object_payload::<InfoPayload>(payload)
                .map(|p| Self::BundleWith {
                    info: p.info,
                    quantity: p.quantity,
                }),
            CommandKind::UpdateQuantity => {
                object_payload::<QuantityPayload>(payload).map(|p| Self::UpdateQuantity {
                    item: p.item,
                    quantity: p.quantity,
                    add: p.add,
                })
            }
            CommandKind::SetQuantity => {
                object_payload::<QuantityPayload>(payload).map(|p| Self::SetQuantity {
                    item: p.item,
                    quantity: p.quantity,
                })
            }
            CommandKind::ShowAllBoxes => Some(Self::ShowAllBoxes),
            CommandKind::UnknownCommand => None,
        };

        decoded.unwrap_or_else(|| Self::unknown(command, UnknownReason::MalformedPayload))
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Self::FindItem { .. } => CommandKind::FindItem,
            Self::FindTags { .. } => CommandKind::FindTags,
            Self::InsertItem { .. } => CommandKind::InsertItem,
            Self::RemoveItem { .. } => CommandKind::RemoveItem,
            Self::AddTags { .. } => CommandKind::AddTags,
            Self::UpdateQuantity { .. } => CommandKind::UpdateQuantity,
            Self::SetQuantity { .. } => CommandKind::SetQuantity,
            Self::ShowAllBoxes => CommandKind::ShowAllBoxes,
            Self::BundleWith { .. } => CommandKind::BundleWith,
            Self::HowMany { .. } => CommandKind::HowMany,
            Self::Unknown { .. } => CommandKind::UnknownCommand,
        }
    }

    fn unknown(command: &str, reason: UnknownReason) -> Self {
        Self::Unknown {
            command: command.to_string(),
            reason,
        }
    }
}

fn text_payload(payload: &Value) -> Option<String> {
    payload
        .as_str()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Like `text_payload` but keeps blank text, which lookups answer as "no query".
fn query_payload(payload: &Value) -> Option<String> {
    payload.as_str().map(|text| text.trim().to_string())
}

fn object_payload<T: for<'de> Deserialize<'de>>(payload: &Value) -> Option<T> {
    if !payload.is_object() {
        return None;
    }
    serde_json::from_value(payload.clone()).ok()
}
