//! Bigram index over the raw vocabulary for resolving `*` wildcard terms.
//!
//! Every word is indexed under each of its interior bigrams plus two boundary
//! grams, `$` + first char and last char + `$`. A pattern such as `se*ch`
//! demands `$s`, `se`, `ch` and `h$`; the candidate words are the
//! intersection of those buckets, post-filtered against the pattern.

use crate::index::InvertedIndex;
use crate::DocKey;
use std::collections::{BTreeSet, HashMap};

pub const BOUNDARY: char = '$';
pub const WILDCARD: char = '*';

#[derive(Debug, Clone, Default)]
pub struct WildcardIndex {
    grams: HashMap<String, BTreeSet<String>>,
    words: BTreeSet<String>,
}

/// Interior bigrams of `fragment`, plus boundary grams when it touches the start/end of a word.
pub fn fragment_bigrams(fragment: &str, at_start: bool, at_end: bool) -> BTreeSet<String> {
    let chars: Vec<char> = fragment.chars().collect();
    let mut grams: BTreeSet<String> = chars.windows(2).map(|w| w.iter().collect()).collect();
    if let (Some(first), Some(last)) = (chars.first(), chars.last()) {
        if at_start { grams.insert(format!("{BOUNDARY}{first}")); }
        if at_end { grams.insert(format!("{last}{BOUNDARY}")); }
    }
    grams
}

/// Every bigram a word is indexed under.
pub fn word_bigrams(word: &str) -> BTreeSet<String> {
    fragment_bigrams(word, true, true)
}

/// Bigrams a matching word must contain: the union over all non-empty fragments.
pub fn pattern_bigrams(pattern: &str) -> BTreeSet<String> {
    let fragments: Vec<&str> = pattern.split(WILDCARD).collect();
    let last = fragments.len() - 1;
    let mut grams = BTreeSet::new();
    for (i, fragment) in fragments.iter().enumerate() {
        if fragment.is_empty() { continue; }
        grams.extend(fragment_bigrams(fragment, i == 0, i == last));
    }
    grams
}

/// Glob match where `*` stands for any run of characters, including none.
pub fn matches_pattern(word: &str, pattern: &str) -> bool {
    let fragments: Vec<&str> = pattern.split(WILDCARD).collect();
    if fragments.len() == 1 {
        return word == pattern;
    }
    let (first, rest) = (fragments[0], &fragments[1..]);
    let (last, middle) = (rest[rest.len() - 1], &rest[..rest.len() - 1]);
    if word.len() < first.len() + last.len() || !word.starts_with(first) || !word.ends_with(last) {
        return false;
    }
    let mut remaining = &word[first.len()..word.len() - last.len()];
    for fragment in middle {
        match remaining.find(fragment) {
            Some(pos) => remaining = &remaining[pos + fragment.len()..],
            None => return false,
        }
    }
    true
}

impl WildcardIndex {
    pub fn build<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::default();
        for word in words {
            let word = word.as_ref();
            if word.is_empty() { continue; }
            for gram in word_bigrams(word) {
                index.grams.entry(gram).or_default().insert(word.to_string());
            }
            index.words.insert(word.to_string());
        }
        index
    }

    /// Index the raw (unstemmed) vocabulary of an inverted index.
    pub fn from_index<D: DocKey>(index: &InvertedIndex<D>) -> Self {
        Self::build(index.dictionary().raw_words())
    }

    /// Vocabulary words matching a wildcard pattern, in lexicographic order.
    pub fn indexed_words(&self, pattern: &str) -> BTreeSet<String> {
        let grams = pattern_bigrams(pattern);
        let mut candidates: Option<BTreeSet<String>> = None;
        for gram in &grams {
            let Some(bucket) = self.grams.get(gram) else {
                return BTreeSet::new();
            };
            candidates = Some(match candidates {
                None => bucket.clone(),
                Some(current) => current.intersection(bucket).cloned().collect(),
            });
        }
        let candidates = candidates.unwrap_or_else(|| self.words.clone());
        let matched: BTreeSet<String> = candidates.into_iter().filter(|w| matches_pattern(w, pattern)).collect();
        tracing::debug!(pattern, grams = grams.len(), matched = matched.len(), "expanded wildcard");
        matched
    }

    pub fn len(&self) -> usize { self.words.len() }

    pub fn is_empty(&self) -> bool { self.words.is_empty() }
}
