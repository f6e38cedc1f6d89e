//! Ranks candidate items by how many query tags they carry.
//!
//! # Invariants
//! - Order is descending `tags_matched`; ties keep storage order.
//! - Results never exceed the requested limit.

use crate::model::item::TaggedItem;
use crate::text::tagger::TagSet;

/// Result cap for free tag searches.
pub const DEFAULT_FIND_TAGS_LIMIT: usize = 10;
/// Result cap when resolving the item to bundle with.
pub const DEFAULT_BUNDLE_CANDIDATE_LIMIT: usize = 3;
/// Wire count reported when no query could be formed.
pub const NO_QUERY_COUNT: i64 = -1;

/// Outcome of ranking candidates against a tag set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankOutcome {
    /// Query tag set was empty; nothing was asked.
    NoQuery,
    Ranked {
        query_size: usize,
        hits: Vec<TaggedItem>,
    },
}

/// Fully matched candidates among ranked hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullMatch<'a> {
    None,
    Unique(&'a TaggedItem),
    Ambiguous(usize),
}

impl RankOutcome {
    pub fn hits(&self) -> &[TaggedItem] {
        match self {
            Self::NoQuery => &[],
            Self::Ranked { hits, .. } => hits,
        }
    }

    pub fn into_hits(self) -> Vec<TaggedItem> {
        match self {
            Self::NoQuery => Vec::new(),
            Self::Ranked { hits, .. } => hits,
        }
    }

    /// Query tag count, or `-1` when there was no query.
    pub fn wire_count(&self) -> i64 {
        match self {
            Self::NoQuery => NO_QUERY_COUNT,
            Self::Ranked { query_size, .. } => *query_size as i64,
        }
    }

    /// Hits whose overlap equals the whole query tag set.
    pub fn fully_matched(&self) -> FullMatch<'_> {
        let Self::Ranked { query_size, hits } = self else {
            return FullMatch::None;
        };
        let mut full = hits
            .iter()
            .filter(|hit| hit.tags_matched as usize == *query_size);
        match (full.next(), full.count()) {
            (None, _) => FullMatch::None,
            (Some(hit), 0) => FullMatch::Unique(hit),
            (Some(_), rest) => FullMatch::Ambiguous(rest + 1),
        }
    }
}

/// Sorts `candidates` by overlap, keeping storage order on ties, and keeps
/// the first `limit`.
pub fn rank_by_tags(query: &TagSet, mut candidates: Vec<TaggedItem>, limit: usize) -> RankOutcome {
    if query.is_empty() {
        return RankOutcome::NoQuery;
    }
    candidates.sort_by(|a, b| b.tags_matched.cmp(&a.tags_matched));
    candidates.truncate(limit);
    RankOutcome::Ranked {
        query_size: query.len(),
        hits: candidates,
    }
}

#[cfg(test)]
mod tests {
    use super::{rank_by_tags, FullMatch, RankOutcome};
    use crate::model::item::{Item, TaggedItem};
    use crate::text::tagger::Tagger;

    fn hit(name: &str, tags_matched: u32) -> TaggedItem {
        TaggedItem {
            item: Item::named(name),
            tags_matched,
        }
    }

    fn names(outcome: &RankOutcome) -> Vec<&str> {
        outcome
            .hits()
            .iter()
            .map(|hit| hit.item.name.as_str())
            .collect()
    }

    #[test]
    fn more_overlap_ranks_higher_and_full_match_is_unique() {
        let query = Tagger::default().normalize("a b c");
        let outcome = rank_by_tags(
            &query,
            vec![hit("only-a", 1), hit("a-and-b", 2), hit("all", 3)],
            10,
        );
        assert_eq!(names(&outcome), vec!["all", "a-and-b", "only-a"]);
        match outcome.fully_matched() {
            FullMatch::Unique(found) => assert_eq!(found.item.name, "all"),
            other => panic!("expected unique full match, got {other:?}"),
        }
        assert_eq!(outcome.wire_count(), 3);
    }

    #[test]
    fn ties_keep_storage_order_and_limit_truncates() {
        let query = Tagger::default().normalize("x y");
        let outcome = rank_by_tags(
            &query,
            vec![hit("first", 1), hit("second", 2), hit("third", 1), hit("fourth", 1)],
            3,
        );
        assert_eq!(names(&outcome), vec!["second", "first", "third"]);
    }

    #[test]
    fn several_full_matches_are_ambiguous() {
        let query = Tagger::default().normalize("red");
        let outcome = rank_by_tags(&query, vec![hit("one", 1), hit("two", 1)], 3);
        assert_eq!(outcome.fully_matched(), FullMatch::Ambiguous(2));

        let partial = rank_by_tags(
            &Tagger::default().normalize("red blue"),
            vec![hit("one", 1)],
            3,
        );
        assert_eq!(partial.fully_matched(), FullMatch::None);
    }

    #[test]
    fn empty_query_is_no_query_not_zero_hits() {
        let outcome = rank_by_tags(&Tagger::default().normalize(""), vec![hit("x", 1)], 10);
        assert_eq!(outcome, RankOutcome::NoQuery);
        assert_eq!(outcome.wire_count(), -1);

        let none = rank_by_tags(&Tagger::default().normalize("ghost"), Vec::new(), 10);
        assert_eq!(none.wire_count(), 1);
        assert!(none.hits().is_empty());
    }
}
