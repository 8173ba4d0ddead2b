//! Query spelling suggestions by weighted edit distance against the raw vocabulary.

use crate::error::Result;
use crate::index::InvertedIndex;
use crate::wildcard::WILDCARD;
use crate::DocKey;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Observed substitution errors: `counts[intended][typed]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfusionMatrix {
    counts: BTreeMap<char, BTreeMap<char, u32>>,
}

impl ConfusionMatrix {
    pub fn new() -> Self { Self::default() }

    /// Parse `{"intended": {"typed": count}}`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_count(mut self, intended: char, typed: char, count: u32) -> Self {
        self.counts.entry(intended).or_default().insert(typed, count);
        self
    }

    pub fn count(&self, intended: char, typed: char) -> u32 {
        self.counts.get(&intended).and_then(|row| row.get(&typed)).copied().unwrap_or(0)
    }

    /// `1 + 1 / (count + 1)`: frequent confusions approach 1, unseen ones cost 2.
    pub fn substitution_cost(&self, intended: char, typed: char) -> f64 {
        1.0 + 1.0 / (self.count(intended, typed) as f64 + 1.0)
    }
}

/// Edit distance from `source` (as typed) to `target` (a lexicon word).
/// Insertions and deletions cost 1, substitutions come from `confusion`.
pub fn weighted_edit_distance(source: &str, target: &str, confusion: &ConfusionMatrix) -> f64 {
    let source: Vec<char> = source.chars().collect();
    let target: Vec<char> = target.chars().collect();
    let (n, m) = (source.len(), target.len());

    let mut table = vec![vec![0.0f64; m + 1]; n + 1];
    for (i, row) in table.iter_mut().enumerate() {
        row[0] = i as f64;
    }
    for j in 0..=m {
        table[0][j] = j as f64;
    }

    for i in 1..=n {
        for j in 1..=m {
            let insert = table[i - 1][j] + 1.0;
            let delete = table[i][j - 1] + 1.0;
            let substitute = table[i - 1][j - 1]
                + if source[i - 1] == target[j - 1] { 0.0 } else { confusion.substitution_cost(target[j - 1], source[i - 1]) };
            table[i][j] = insert.min(delete).min(substitute);
        }
    }
    table[n][m]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellingConfig {
    /// Only compare against lexicon words sharing the first letter.
    pub same_first_letter: bool,
    /// Candidates kept per misspelled word before combining them into queries.
    pub max_candidates_per_word: usize,
    /// Observed typing errors. With an empty table every substitution costs 2,
    /// the same as a deletion plus an insertion, so ranking is plain edit
    /// distance until counts are loaded (`"confusion"` in the engine config).
    pub confusion: ConfusionMatrix,
}

impl Default for SpellingConfig {
    fn default() -> Self {
        Self { same_first_letter: true, max_candidates_per_word: 10, confusion: ConfusionMatrix::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub text: String,
    pub cost: f64,
}

#[derive(Debug, Clone)]
pub struct SpellingCorrector {
    lexicon: BTreeSet<String>,
    config: SpellingConfig,
}

/// Lower-case ASCII letters only.
fn clean(word: &str) -> String {
    word.chars().filter(char::is_ascii_alphabetic).map(|c| c.to_ascii_lowercase()).collect()
}

fn is_operator(token: &str) -> bool {
    matches!(token.to_lowercase().as_str(), "and" | "or" | "and_not")
}

fn by_cost(a: &Suggestion, b: &Suggestion) -> Ordering {
    a.cost.partial_cmp(&b.cost).unwrap_or(Ordering::Equal).then_with(|| a.text.cmp(&b.text))
}

enum Slot {
    Fixed(String),
    Replace { prefix: String, suffix: String, candidates: Vec<Suggestion> },
}

impl SpellingCorrector {
    pub fn new<I, S>(words: I, config: SpellingConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lexicon = words.into_iter().map(|w| clean(w.as_ref())).filter(|w| !w.is_empty()).collect();
        Self { lexicon, config }
    }

    /// Lexicon from the raw (unstemmed) vocabulary of an index.
    pub fn from_index<D: DocKey>(index: &InvertedIndex<D>, config: SpellingConfig) -> Self {
        Self::new(index.dictionary().raw_words(), config)
    }

    pub fn contains(&self, word: &str) -> bool { self.lexicon.contains(&clean(word)) }

    pub fn lexicon_len(&self) -> usize { self.lexicon.len() }

    /// Closest lexicon words to `word`, cheapest first. A known word comes back alone with cost 0.
    pub fn check_word(&self, word: &str, limit: usize) -> Vec<Suggestion> {
        let word = clean(word);
        if word.is_empty() {
            return Vec::new();
        }
        if self.lexicon.contains(&word) {
            return vec![Suggestion { text: word, cost: 0.0 }];
        }
        let first = word.chars().next();
        let mut scored: Vec<Suggestion> = self
            .lexicon
            .iter()
            .filter(|w| !self.config.same_first_letter || w.chars().next() == first)
            .map(|w| Suggestion { text: w.clone(), cost: weighted_edit_distance(&word, w, &self.config.confusion) })
            .collect();
        scored.sort_by(by_cost);
        scored.truncate(limit);
        scored
    }

    /// Alternative queries, cheapest first. Empty when every word is already known.
    ///
    /// Wildcard terms and boolean operators pass through unchanged, as do words
    /// without any candidate. Brackets around a replaced word are preserved.
    pub fn check_query(&self, query: &str, limit: usize) -> Vec<Suggestion> {
        let tokens: Vec<&str> = query.split_whitespace().collect();
        if tokens.is_empty() {
            return Vec::new();
        }

        let mut slots = Vec::with_capacity(tokens.len());
        let mut misspelled = false;
        for token in &tokens {
            if token.contains(WILDCARD) || is_operator(token) {
                slots.push(Slot::Fixed(token.to_string()));
                continue;
            }
            let (Some(start), Some(end)) = (
                token.find(|c: char| c.is_ascii_alphabetic()),
                token.rfind(|c: char| c.is_ascii_alphabetic()),
            ) else {
                slots.push(Slot::Fixed(token.to_string()));
                continue;
            };
            let word = clean(&token[start..=end]);
            if !self.lexicon.contains(&word) {
                misspelled = true;
            }
            let candidates = self.check_word(&word, self.config.max_candidates_per_word);
            if candidates.is_empty() {
                slots.push(Slot::Fixed(token.to_string()));
            } else {
                slots.push(Slot::Replace {
                    prefix: token[..start].to_string(),
                    suffix: token[end + 1..].to_string(),
                    candidates,
                });
            }
        }
        if !misspelled {
            return Vec::new();
        }

        let mut combos: Vec<(Vec<String>, f64)> = vec![(Vec::new(), 0.0)];
        for slot in &slots {
            combos = match slot {
                Slot::Fixed(token) => combos
                    .into_iter()
                    .map(|(mut words, cost)| {
                        words.push(token.clone());
                        (words, cost)
                    })
                    .collect(),
                Slot::Replace { prefix, suffix, candidates } => combos
                    .iter()
                    .flat_map(|(words, cost)| {
                        candidates.iter().map(move |c| {
                            let mut words = words.clone();
                            words.push(format!("{prefix}{}{suffix}", c.text));
                            (words, cost + c.cost)
                        })
                    })
                    .collect(),
            };
        }

        let original = tokens.join(" ").to_lowercase();
        let mut suggestions: Vec<Suggestion> = combos
            .into_iter()
            .map(|(words, cost)| Suggestion { text: words.join(" "), cost })
            .filter(|s| s.text.to_lowercase() != original)
            .collect();
        suggestions.sort_by(by_cost);
        suggestions.truncate(limit);
        tracing::debug!(query, suggestions = suggestions.len(), "spelling suggestions");
        suggestions
    }

    /// `check_query` without costs.
    pub fn suggest(&self, query: &str, limit: usize) -> Vec<String> {
        self.check_query(query, limit).into_iter().map(|s| s.text).collect()
    }
}
