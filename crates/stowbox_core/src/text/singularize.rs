//! Rule-based English singularization for single lowercase tokens.

use once_cell::sync::Lazy;
use regex::Regex;

const MIN_INFLECTED_LEN: usize = 3;

const UNINFLECTED: &[&str] = &[
    "bass",
    "deer",
    "electronics",
    "equipment",
    "fish",
    "gas",
    "glasses",
    "hardware",
    "news",
    "pants",
    "pliers",
    "scissors",
    "series",
    "sheep",
    "shorts",
    "species",
    "tongs",
    "tweezers",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("axes", "axis"),
    ("children", "child"),
    ("dice", "die"),
    ("feet", "foot"),
    ("geese", "goose"),
    ("halves", "half"),
    ("indices", "index"),
    ("knives", "knife"),
    ("leaves", "leaf"),
    ("lives", "life"),
    ("matrices", "matrix"),
    ("men", "man"),
    ("mice", "mouse"),
    ("people", "person"),
    ("shelves", "shelf"),
    ("teeth", "tooth"),
    ("vertices", "vertex"),
    ("wives", "wife"),
    ("women", "woman"),
];

// Ordered; the first matching pattern wins.
static SUFFIX_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"^(.+[^aeiou])ies$", "${1}y"),
        (r"^(.+)(ss|sh|ch|x|z)es$", "${1}${2}"),
        (r"^(.+)(ss|us|is)$", "${1}${2}"),
        (r"^(.*[^s])s$", "${1}"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("valid singular suffix regex"),
            replacement,
        )
    })
    .collect()
});

/// Stateless plural-to-singular converter.
///
/// Cheap to construct and `Copy`; hand one to every component that needs
/// canonical forms instead of sharing a global.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Singularizer;

impl Singularizer {
    pub fn new() -> Self {
        Self
    }

    /// Lowercases and singularizes one whitespace-free token.
    ///
    /// Rewrites repeat until the token is stable, so the result is a fixed
    /// point: `singularize(singularize(t)) == singularize(t)`.
    pub fn singularize(&self, token: &str) -> String {
        let mut word = token.to_lowercase();
        while let Some(next) = singular_step(&word) {
            word = next;
        }
        word
    }
}

/// One rewrite of `word`, or `None` when no rule changes it.
fn singular_step(word: &str) -> Option<String> {
    if word.chars().count() < MIN_INFLECTED_LEN || UNINFLECTED.contains(&word) {
        return None;
    }
    if let Some((_, singular)) = IRREGULAR.iter().find(|(plural, _)| *plural == word) {
        return Some((*singular).to_string());
    }
    let (pattern, replacement) = SUFFIX_RULES
        .iter()
        .find(|(pattern, _)| pattern.is_match(word))?;
    let rewritten = pattern.replace(word, *replacement);
    (rewritten != word).then(|| rewritten.into_owned())
}

#[cfg(test)]
mod tests {
    use super::Singularizer;

    #[test]
    fn strips_regular_plural_suffixes() {
        let s = Singularizer::new();
        assert_eq!(s.singularize("LEDs"), "led");
        assert_eq!(s.singularize("batteries"), "battery");
        assert_eq!(s.singularize("boxes"), "box");
        assert_eq!(s.singularize("switches"), "switch");
        assert_eq!(s.singularize("resistors"), "resistor");
        assert_eq!(s.singularize("AAs"), "aa");
    }

    #[test]
    fn leaves_singular_and_short_tokens_alone() {
        let s = Singularizer::new();
        assert_eq!(s.singularize("glass"), "glass");
        assert_eq!(s.singularize("bus"), "bus");
        assert_eq!(s.singularize("axis"), "axis");
        assert_eq!(s.singularize("AA"), "aa");
        assert_eq!(s.singularize("9v"), "9v");
        assert_eq!(s.singularize("pliers"), "pliers");
    }

    #[test]
    fn maps_irregular_plurals() {
        let s = Singularizer::new();
        assert_eq!(s.singularize("Knives"), "knife");
        assert_eq!(s.singularize("mice"), "mouse");
        assert_eq!(s.singularize("Peoples"), "person");
        assert_eq!(s.singularize("mens"), "man");
    }

    #[test]
    fn singularize_is_idempotent() {
        let s = Singularizer::new();
        let words = [
            "batteries", "LEDs", "wires", "boxes", "series", "ties", "mens", "peoples",
            "childrens", "dices",
        ];
        for word in words {
            let once = s.singularize(word);
            assert_eq!(s.singularize(&once), once, "not idempotent for {word}");
        }
    }
}
