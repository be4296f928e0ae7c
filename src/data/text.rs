//! Word tokenization and stop-word handling for the title / abstract
//! frequency tables.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Word-bounded runs of at least three ASCII letters.
static WORD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-zA-Z]{3,}\b").expect("static word pattern"));

/// Articles, prepositions and auxiliary verbs that never carry topic.
pub const BASELINE_STOP_WORDS: &[&str] = &[
    "the", "and", "of", "in", "to", "a", "for", "with", "on", "by", "as", "an", "from", "that",
    "this", "is", "are", "was", "were", "be", "been", "have", "has", "had", "but", "not", "at",
    "which",
];

/// Lower-case `text` and return its words in order of appearance.
///
/// Punctuation splits words and shorter runs are dropped, so
/// `"SARS-CoV-2 in Wuhan"` yields `["sars", "cov", "wuhan"]`.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    WORD_REGEX
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Baseline stop words plus any the caller adds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopWords {
    words: BTreeSet<String>,
}

impl Default for StopWords {
    fn default() -> Self {
        Self::baseline()
    }
}

impl StopWords {
    pub fn baseline() -> Self {
        Self {
            words: BASELINE_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Add words from a comma-separated list; entries are trimmed and
    /// lower-cased, blanks ignored.
    pub fn with_extra_csv(mut self, list: &str) -> Self {
        self.words.extend(parse_word_list(list));
        self
    }

    pub fn with_extra<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.words
            .extend(words.into_iter().map(|w| w.as_ref().trim().to_lowercase()));
        self
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Split a comma-separated word list as typed into the stop-word box.
pub fn parse_word_list(list: &str) -> impl Iterator<Item = String> + '_ {
    list.split(',')
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_keeps_runs_of_three_or_more_letters() {
        assert_eq!(
            tokenize("SARS-CoV-2 in Wuhan: a study!"),
            vec!["sars", "cov", "wuhan", "study"]
        );
    }

    #[test]
    fn tokenize_skips_words_glued_to_digits() {
        assert_eq!(tokenize("covid19 covid 19th"), vec!["covid"]);
    }

    #[test]
    fn tokenize_empty_text() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("a b 12 -- !!").is_empty());
    }

    #[test]
    fn extra_stop_words_are_trimmed_and_lowercased() {
        let stop = StopWords::baseline().with_extra_csv(" Covid, CORONAVIRUS ,, sars");
        assert!(stop.contains("covid"));
        assert!(stop.contains("coronavirus"));
        assert!(stop.contains("sars"));
        assert!(stop.contains("the"));
        assert!(!stop.contains(""));
        assert_eq!(stop.len(), BASELINE_STOP_WORDS.len() + 3);
    }

    #[test]
    fn with_extra_accepts_any_strings() {
        let stop = StopWords::baseline().with_extra(["Paper"]);
        assert!(stop.contains("paper"));
    }
}
