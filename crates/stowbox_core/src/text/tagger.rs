//! Tag sets and the tagger that builds them from spoken phrases.
//!
//! # Invariants
//! - Every tag is lowercase, singular, non-empty and whitespace-free.
//! - An empty `TagSet` means "no tag constraint", never "match nothing".

use super::singularize::Singularizer;
use std::collections::BTreeSet;

/// Order-irrelevant set of normalized tags.
///
/// Backed by a sorted set so that iteration (and therefore SQL parameter
/// order) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: BTreeSet<String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Merges another set into this one.
    pub fn extend(&mut self, other: &TagSet) {
        self.tags.extend(other.tags.iter().cloned());
    }

    fn insert(&mut self, tag: String) -> bool {
        self.tags.insert(tag)
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}

/// Turns free text into tags and canonical keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tagger {
    singularizer: Singularizer,
}

impl Tagger {
    pub fn new(singularizer: Singularizer) -> Self {
        Self { singularizer }
    }

    pub fn singularizer(&self) -> Singularizer {
        self.singularizer
    }

    /// Builds a fresh tag set from whitespace-separated text.
    pub fn normalize(&self, text: &str) -> TagSet {
        let mut tags = TagSet::new();
        self.union(&mut tags, text);
        tags
    }

    /// Adds the tags of `text` to `tags` without clearing it.
    ///
    /// Returns how many tags were new.
    pub fn union(&self, tags: &mut TagSet, text: &str) -> usize {
        self.tokens(text)
            .filter(|token| tags.insert(token.clone()))
            .count()
    }

    /// Lowercase singular tokens of `text`, in textual order.
    pub fn tokens<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        text.split_whitespace()
            .map(move |token| self.singularizer.singularize(token))
            .filter(|token| !token.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::{TagSet, Tagger};

    #[test]
    fn union_collects_three_distinct_tags_and_is_stable() {
        let tagger = Tagger::default();
        let mut tags = TagSet::new();
        assert_eq!(tagger.union(&mut tags, "Green motor driver"), 3);
        assert_eq!(tags.len(), 3);
        for tag in ["green", "motor", "driver"] {
            assert!(tags.contains(tag), "missing {tag}");
        }

        assert_eq!(tagger.union(&mut tags, "Green motor driver"), 0);
        assert_eq!(tags.len(), 3);
    }

    #[test]
    fn normalize_collapses_case_and_plural_duplicates() {
        let tagger = Tagger::default();
        let tags = tagger.normalize("  LEDs led  Led\tleds ");
        assert_eq!(tags.iter().collect::<Vec<_>>(), vec!["led"]);
    }

    #[test]
    fn empty_text_yields_empty_set() {
        let tagger = Tagger::default();
        assert!(tagger.normalize("").is_empty());
        assert!(tagger.normalize("   \n ").is_empty());
    }
}
