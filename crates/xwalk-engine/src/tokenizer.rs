//! # Control Tokenizer
//!
//! Turns a control's textual fields into normalized tokens and a raw
//! term-frequency vector.
//!
//! ## Rules
//!
//! 1. Concatenate `id`, `title`, `description`, `family` (skipping an
//!    absent description) separated by spaces.
//! 2. Lowercase.
//! 3. Split on every run of non-alphanumeric characters.
//! 4. Keep tokens longer than two characters that are not stop words.
//!
//! A control whose token list ends up empty takes no part in similarity
//! ranking, neither as a source nor as a target.

use std::collections::{BTreeSet, HashMap};

use xwalk_core::Control;

/// Articles, prepositions, and conjunctions that survive the length filter
/// but carry no matching signal.
pub const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "from", "into", "onto", "upon", "that", "this", "these",
    "those", "are", "was", "were", "been", "has", "have", "its", "any", "all", "nor", "but",
    "per", "via",
];

/// Minimum token length is three characters.
const MIN_TOKEN_CHARS: usize = 3;

/// Raw term-frequency vector: term → occurrence count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermVector {
    counts: HashMap<String, u32>,
}

impl TermVector {
    /// Count occurrences of each token.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut counts: HashMap<String, u32> = HashMap::new();
        for token in tokens {
            *counts.entry(token.into()).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Occurrence count of `term` (0 when absent).
    pub fn get(&self, term: &str) -> u32 {
        self.counts.get(term).copied().unwrap_or(0)
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Euclidean norm of the count vector.
    pub fn magnitude(&self) -> f64 {
        self.counts
            .values()
            .map(|&c| f64::from(c) * f64::from(c))
            .sum::<f64>()
            .sqrt()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(term, &count)| (term.as_str(), count))
    }
}

/// A control together with its token stream, term set, and term vector.
#[derive(Debug, Clone)]
pub struct TokenizedControl<'a> {
    pub control: &'a Control,
    pub tokens: Vec<String>,
    pub term_set: BTreeSet<String>,
    pub vector: TermVector,
}

impl<'a> TokenizedControl<'a> {
    pub fn new(control: &'a Control) -> Self {
        let text = control.text_fields().collect::<Vec<_>>().join(" ");
        let tokens = tokenize(&text);
        let term_set = tokens.iter().cloned().collect();
        let vector = TermVector::from_tokens(tokens.iter().cloned());
        Self {
            control,
            tokens,
            term_set,
            vector,
        }
    }

    /// True when nothing survived filtering; such controls are never ranked.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Terms present in both controls, sorted, at most `limit` entries.
    pub fn shared_terms(&self, other: &TokenizedControl<'_>, limit: usize) -> Vec<String> {
        self.term_set
            .intersection(&other.term_set)
            .take(limit)
            .cloned()
            .collect()
    }
}

/// Lowercase `text`, split on non-alphanumerics, and drop short tokens and
/// stop words.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .filter(|token| !STOP_WORDS.contains(token))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_lowercases_and_splits_on_punctuation() {
        let tokens = tokenize("Multi-Factor AUTHENTICATION (MFA), enforced.");
        assert_eq!(
            tokens,
            vec!["multi", "factor", "authentication", "mfa", "enforced"]
        );
    }

    #[test]
    fn tokenize_drops_short_tokens_and_stop_words() {
        let tokens = tokenize("Monitor and scan for the vulnerabilities of a system");
        assert_eq!(tokens, vec!["monitor", "scan", "vulnerabilities", "system"]);
    }

    #[test]
    fn tokenize_keeps_duplicates_in_order() {
        let tokens = tokenize("scan scan SCAN");
        assert_eq!(tokens, vec!["scan", "scan", "scan"]);
    }

    #[test]
    fn tokenize_empty_and_symbol_only_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("-- / ** ::").is_empty());
        assert!(tokenize("a an of to").is_empty());
    }

    #[test]
    fn control_tokens_cover_all_fields() {
        let control = Control::new("ra-5", "nist", "Vulnerability Monitoring", "Risk Assessment")
            .with_description("Scan for vulnerabilities.");
        let tokenized = TokenizedControl::new(&control);
        assert_eq!(
            tokenized.tokens,
            vec![
                "vulnerability",
                "monitoring",
                "scan",
                "vulnerabilities",
                "risk",
                "assessment"
            ]
        );
        assert_eq!(tokenized.vector.get("scan"), 1);
        assert_eq!(tokenized.term_set.len(), 6);
    }

    #[test]
    fn term_vector_counts_repeats() {
        let vector = TermVector::from_tokens(["access", "control", "access"]);
        assert_eq!(vector.get("access"), 2);
        assert_eq!(vector.get("control"), 1);
        assert_eq!(vector.get("missing"), 0);
        assert_eq!(vector.len(), 2);
        assert!((vector.magnitude() - 5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn control_with_only_noise_is_empty() {
        let control = Control::new("a-1", "fw", "Of", "");
        assert!(TokenizedControl::new(&control).is_empty());
    }

    #[test]
    fn shared_terms_sorted_and_capped() {
        let a = Control::new("x-1", "fw-a", "delta alpha charlie bravo echo", "");
        let b = Control::new("y-1", "fw-b", "echo charlie alpha delta bravo", "");
        let ta = TokenizedControl::new(&a);
        let tb = TokenizedControl::new(&b);
        assert_eq!(ta.shared_terms(&tb, 3), vec!["alpha", "bravo", "charlie"]);
        assert_eq!(ta.shared_terms(&tb, 10).len(), 5);
    }
}
