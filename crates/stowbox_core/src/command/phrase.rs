//! Phrase-marker parsing of free-text command payloads.
//!
//! # Invariants
//! - Marker scans run over an ASCII-lowercased copy, so byte offsets stay
//!   valid for slicing the original text.
//! - Box-phrase precedence is prefix, then size, then noun. The first phrase
//!   found by that nested scan wins even when another phrase appears earlier
//!   in the text.

use crate::model::grid::SizeClass;
use crate::text::tagger::{TagSet, Tagger};

const BOX_PREFIXES: &[&str] = &["into a", "in a"];
const BOX_SIZES: &[(&str, SizeClass)] = &[
    ("big", SizeClass::Large),
    ("large", SizeClass::Large),
    ("small", SizeClass::Small),
    ("little", SizeClass::Small),
];
const BOX_NOUNS: &[&str] = &["box", "container"];

pub const TAGS_MARKER: &str = " with tags ";
pub const TO_MARKER: &str = " to ";
pub const ADD_TAGS_MARKER: &str = " add tags ";
pub const WITH_MARKER: &str = " with ";

/// Size used when the text names no box.
pub const DEFAULT_BOX_SIZE: SizeClass = SizeClass::Small;

/// Box phrase located in an info string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxPhrase {
    /// Byte offset of the phrase's leading space.
    pub start: usize,
    pub phrase: String,
    pub size: SizeClass,
}

/// Tag phrase located in an info string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagsPhrase {
    /// Byte offset of the `" with tags "` marker.
    pub start: usize,
    pub tags: TagSet,
}

/// Item name, requested box size and tags pulled from one info string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemInfo {
    pub item_name: String,
    pub box_size: Option<SizeClass>,
    pub tags: TagSet,
}

impl ItemInfo {
    /// Requested size, or the small-box fallback.
    pub fn size_or_default(&self) -> SizeClass {
        self.box_size.unwrap_or(DEFAULT_BOX_SIZE)
    }
}

/// Finds the box phrase using the fixed nested precedence.
pub fn find_box_phrase(info: &str) -> Option<BoxPhrase> {
    let lower = info.to_ascii_lowercase();
    for prefix in BOX_PREFIXES {
        for (size_word, size) in BOX_SIZES {
            for noun in BOX_NOUNS {
                let phrase = format!(" {prefix} {size_word} {noun}");
                if let Some(start) = lower.find(&phrase) {
                    return Some(BoxPhrase {
                        start,
                        phrase,
                        size: *size,
                    });
                }
            }
        }
    }
    None
}

/// Finds `" with tags "` and the tag list that follows it.
///
/// The list ends at the box phrase when the box phrase comes after the
/// marker, otherwise at end of text. Blank lists count as absent.
pub fn find_tags_phrase(
    info: &str,
    box_start: Option<usize>,
    tagger: &Tagger,
) -> Option<TagsPhrase> {
    let lower = info.to_ascii_lowercase();
    let start = lower.find(TAGS_MARKER)?;
    let tags_start = start + TAGS_MARKER.len();

    let tags_text = match box_start {
        Some(box_start) if start < box_start => info.get(tags_start..box_start).unwrap_or(""),
        _ => &info[tags_start..],
    };

    let tags = tagger.normalize(tags_text);
    if tags.is_empty() {
        return None;
    }
    Some(TagsPhrase { start, tags })
}

/// Splits an info string into item name, box size and tags.
pub fn parse_item_info(info: &str, tagger: &Tagger) -> ItemInfo {
    let box_phrase = find_box_phrase(info);
    let box_start = box_phrase.as_ref().map(|phrase| phrase.start);
    let tags_phrase = find_tags_phrase(info, box_start, tagger);
    let tags_start = tags_phrase.as_ref().map(|phrase| phrase.start);

    let name_end = match (box_start, tags_start) {
        (Some(b), Some(t)) => b.min(t),
        (Some(b), None) => b,
        (None, Some(t)) => t,
        (None, None) => info.len(),
    };

    ItemInfo {
        item_name: info[..name_end].trim().to_string(),
        box_size: box_phrase.map(|phrase| phrase.size),
        tags: tags_phrase.map(|phrase| phrase.tags).unwrap_or_default(),
    }
}

/// Splits on the first `marker`, trimming both sides.
///
/// Returns `None` when the marker is missing or either side is blank.
pub fn split_once_trimmed<'a>(text: &'a str, marker: &str) -> Option<(&'a str, &'a str)> {
    let lower = text.to_ascii_lowercase();
    let at = lower.find(marker)?;
    let left = text[..at].trim();
    let right = text[at + marker.len()..].trim();
    if left.is_empty() || right.is_empty() {
        return None;
    }
    Some((left, right))
}

fn contains_marker(text: &str, marker: &str) -> bool {
    text.to_ascii_lowercase().contains(marker)
}

/// Target item and tags of an `AddTags` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddTagsRequest {
    pub item: String,
    pub tags: TagSet,
}

/// Parses `"<tags> to <item>"`, `"<item> add tags <tags>"` or
/// `"<item> with tags <tags>"`, tried in that order.
pub fn parse_add_tags(text: &str, tagger: &Tagger) -> Option<AddTagsRequest> {
    let (item, tags_text) = if contains_marker(text, TO_MARKER) {
        let (tags, item) = split_once_trimmed(text, TO_MARKER)?;
        (item, tags)
    } else if contains_marker(text, ADD_TAGS_MARKER) {
        split_once_trimmed(text, ADD_TAGS_MARKER)?
    } else if contains_marker(text, TAGS_MARKER) {
        split_once_trimmed(text, TAGS_MARKER)?
    } else {
        return None;
    };

    let tags = tagger.normalize(tags_text);
    if tags.is_empty() {
        return None;
    }
    Some(AddTagsRequest {
        item: item.to_string(),
        tags,
    })
}

/// How a `BundleWith` request names the box to share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleTarget {
    /// `"<new> with <existing> [add tags <tags>]"`.
    Item {
        existing_item: String,
        extra_tags: TagSet,
    },
    /// `"<new> with tags <tags>"`: the single fully matched item.
    Tags { tags: TagSet },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleRequest {
    pub new_item: String,
    pub target: BundleTarget,
}

/// Parses a bundle instruction. `" with tags "` is tried before the bare
/// `" with "` so the tag form is not split as an item name.
pub fn parse_bundle(text: &str, tagger: &Tagger) -> Option<BundleRequest> {
    if contains_marker(text, TAGS_MARKER) {
        let (new_item, tags_text) = split_once_trimmed(text, TAGS_MARKER)?;
        let tags = tagger.normalize(tags_text);
        if tags.is_empty() {
            return None;
        }
        return Some(BundleRequest {
            new_item: new_item.to_string(),
            target: BundleTarget::Tags { tags },
        });
    }

    if !contains_marker(text, WITH_MARKER) {
        return None;
    }

    let (items_text, extra_tags) = if contains_marker(text, ADD_TAGS_MARKER) {
        let (items, tags) = split_once_trimmed(text, ADD_TAGS_MARKER)?;
        (items, tagger.normalize(tags))
    } else {
        (text, TagSet::new())
    };

    let (new_item, existing_item) = split_once_trimmed(items_text, WITH_MARKER)?;
    Some(BundleRequest {
        new_item: new_item.to_string(),
        target: BundleTarget::Item {
            existing_item: existing_item.to_string(),
            extra_tags,
        },
    })
}
