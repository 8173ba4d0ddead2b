//! Term dictionary: the vocabulary the index is built over, and the text
//! normalization that maps documents and queries onto it.

use crate::tokenizer::{tokenize, DEFAULT_STOPWORDS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryConfig {
    pub stopwords: BTreeSet<String>,
    /// Reduce words to their English Snowball stem.
    pub stem: bool,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self { stopwords: DEFAULT_STOPWORDS.iter().map(|s| s.to_string()).collect(), stem: true }
    }
}

impl DictionaryConfig {
    /// Keep every word; stemming stays on.
    pub fn without_stopwords() -> Self {
        Self { stopwords: BTreeSet::new(), ..Self::default() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dictionary {
    config: DictionaryConfig,
    /// Normalized (stemmed) terms, the index vocabulary.
    terms: BTreeSet<String>,
    /// Lower-cased surface words before stemming.
    raw_words: BTreeSet<String>,
}

impl Dictionary {
    /// Collect the vocabulary of a document collection.
    pub fn build<S: AsRef<str>>(documents: &[S], config: DictionaryConfig) -> Self {
        let mut terms = BTreeSet::new();
        let mut raw_words = BTreeSet::new();
        for doc in documents {
            for token in tokenize(doc.as_ref(), &config) {
                terms.insert(token.term);
                raw_words.insert(token.raw);
            }
        }
        Self { config, terms, raw_words }
    }

    /// A dictionary over an explicit word list. Each word is normalized the same
    /// way document text is; the surface forms become the raw vocabulary.
    pub fn from_words<I, S>(words: I, config: DictionaryConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dict = Self { config, terms: BTreeSet::new(), raw_words: BTreeSet::new() };
        for word in words {
            for token in tokenize(word.as_ref(), &dict.config) {
                dict.terms.insert(token.term);
                dict.raw_words.insert(token.raw);
            }
        }
        dict
    }

    /// Normalize free text into the term sequence used for indexing and querying.
    pub fn normalize(&self, text: &str) -> Vec<String> {
        tokenize(text, &self.config).into_iter().map(|t| t.term).collect()
    }

    /// Normalize a single query word. `None` when the word is a stopword or has no letters.
    pub fn normalize_word(&self, word: &str) -> Option<String> {
        tokenize(word, &self.config).into_iter().next().map(|t| t.term)
    }

    pub fn contains(&self, term: &str) -> bool { self.terms.contains(term) }

    pub fn terms(&self) -> impl Iterator<Item = &str> + '_ { self.terms.iter().map(String::as_str) }

    pub fn raw_words(&self) -> impl Iterator<Item = &str> + '_ { self.raw_words.iter().map(String::as_str) }

    pub fn len(&self) -> usize { self.terms.len() }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }

    pub fn config(&self) -> &DictionaryConfig { &self.config }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_keeps_raw_and_stemmed_forms() {
        let dict = Dictionary::build(&["Searching the archives", "searched"], DictionaryConfig::default());
        assert!(dict.contains("search"));
        assert!(!dict.contains("the"));
        let raw: Vec<&str> = dict.raw_words().collect();
        assert_eq!(raw, vec!["archives", "searched", "searching"]);
    }

    #[test]
    fn normalize_word_drops_stopwords() {
        let dict = Dictionary::build(&["cats"], DictionaryConfig::default());
        assert_eq!(dict.normalize_word("Cats"), Some("cat".to_string()));
        assert_eq!(dict.normalize_word("the"), None);
        assert_eq!(dict.normalize_word("42"), None);
    }
}
