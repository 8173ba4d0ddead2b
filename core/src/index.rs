use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use crate::DocKey;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Frequency and weight of one term in one document. Absent pairs are never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub frequency: u32,
    pub tf_idf: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DocumentEntry {
    /// Terms with a posting in this document, sorted.
    terms: Vec<String>,
    /// Euclidean length of the document's tf-idf vector.
    norm: f64,
}

/// Weighted inverted index: term -> document -> posting.
///
/// Built once from a fixed collection and read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "D: Deserialize<'de> + Ord"))]
pub struct InvertedIndex<D> {
    dictionary: Dictionary,
    postings: BTreeMap<String, BTreeMap<D, Posting>>,
    documents: BTreeMap<D, DocumentEntry>,
}

/// `log10(1 + tf) * log10(n / df)`.
pub fn tf_idf(frequency: u32, document_frequency: usize, num_docs: usize) -> f64 {
    if frequency == 0 || document_frequency == 0 { return 0.0; }
    let tf = (1.0 + frequency as f64).log10();
    let idf = (num_docs as f64 / document_frequency as f64).log10();
    tf * idf
}

impl<D: DocKey> InvertedIndex<D> {
    /// Index `documents` under the parallel `ids`. Tokens outside the dictionary are dropped.
    pub fn build<S: AsRef<str>>(dictionary: Dictionary, documents: &[S], ids: &[D]) -> Result<Self> {
        if documents.len() != ids.len() {
            return Err(Error::LengthMismatch { documents: documents.len(), ids: ids.len() });
        }
        if dictionary.is_empty() {
            return Err(Error::EmptyVocabulary);
        }

        let mut postings: BTreeMap<String, BTreeMap<D, Posting>> = BTreeMap::new();
        let mut documents_out: BTreeMap<D, DocumentEntry> = BTreeMap::new();
        let mut dropped = 0usize;

        // Raw frequencies for the whole collection first; idf needs final document frequencies.
        for (body, id) in documents.iter().zip(ids) {
            if documents_out.contains_key(id) {
                return Err(Error::DuplicateDocument(format!("{id:?}")));
            }
            let mut counts: BTreeMap<String, u32> = BTreeMap::new();
            for term in dictionary.normalize(body.as_ref()) {
                if !dictionary.contains(&term) {
                    dropped += 1;
                    continue;
                }
                *counts.entry(term).or_insert(0) += 1;
            }
            let terms: Vec<String> = counts.keys().cloned().collect();
            for (term, frequency) in counts {
                postings.entry(term).or_default().insert(id.clone(), Posting { frequency, tf_idf: 0.0 });
            }
            documents_out.insert(id.clone(), DocumentEntry { terms, norm: 0.0 });
        }

        let num_docs = documents_out.len();
        let mut squared: BTreeMap<D, f64> = BTreeMap::new();
        for plist in postings.values_mut() {
            let df = plist.len();
            for (doc, posting) in plist.iter_mut() {
                posting.tf_idf = tf_idf(posting.frequency, df, num_docs);
                *squared.entry(doc.clone()).or_insert(0.0) += posting.tf_idf * posting.tf_idf;
            }
        }
        for (doc, sum) in squared {
            if let Some(entry) = documents_out.get_mut(&doc) {
                entry.norm = sum.sqrt();
            }
        }

        tracing::info!(num_docs, num_terms = postings.len(), dropped_tokens = dropped, "built inverted index");
        Ok(Self { dictionary, postings, documents: documents_out })
    }

    /// Sorted ids of the documents containing `term`; `None` for unknown terms.
    pub fn postings(&self, term: &str) -> Option<Vec<D>> {
        self.postings.get(term).map(|plist| plist.keys().cloned().collect())
    }

    /// The full posting list of `term`, keyed by document.
    pub fn posting_list(&self, term: &str) -> Option<&BTreeMap<D, Posting>> {
        self.postings.get(term)
    }

    pub fn frequency(&self, term: &str, doc: &D) -> Option<u32> {
        self.postings.get(term)?.get(doc).map(|p| p.frequency)
    }

    pub fn tf_idf(&self, term: &str, doc: &D) -> Option<f64> {
        self.postings.get(term)?.get(doc).map(|p| p.tf_idf)
    }

    pub fn document_frequency(&self, term: &str) -> usize {
        self.postings.get(term).map_or(0, BTreeMap::len)
    }

    /// Terms with a posting in `doc`, sorted.
    pub fn document_terms(&self, doc: &D) -> Option<&[String]> {
        self.documents.get(doc).map(|entry| entry.terms.as_slice())
    }

    /// Length of the document's tf-idf vector.
    pub fn document_norm(&self, doc: &D) -> Option<f64> {
        self.documents.get(doc).map(|entry| entry.norm)
    }

    /// Sparse tf-idf weights of `doc`, in term order.
    pub fn document_weights<'a>(&'a self, doc: &'a D) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        self.document_terms(doc)
            .unwrap_or_default()
            .iter()
            .filter_map(move |term| self.tf_idf(term, doc).map(|w| (term.as_str(), w)))
    }

    /// Dense tf-idf vector over the whole vocabulary in lexicographic term order.
    pub fn document_vector(&self, doc: &D) -> Option<Vec<f64>> {
        if !self.documents.contains_key(doc) { return None; }
        Some(self.dictionary.terms().map(|term| self.tf_idf(term, doc).unwrap_or(0.0)).collect())
    }

    pub fn contains_document(&self, doc: &D) -> bool { self.documents.contains_key(doc) }

    pub fn document_ids(&self) -> impl Iterator<Item = &D> + '_ { self.documents.keys() }

    pub fn num_docs(&self) -> usize { self.documents.len() }

    /// Vocabulary terms in lexicographic order, including those without postings.
    pub fn terms(&self) -> impl Iterator<Item = &str> + '_ { self.dictionary.terms() }

    pub fn num_terms(&self) -> usize { self.dictionary.len() }

    pub fn dictionary(&self) -> &Dictionary { &self.dictionary }

    /// Union of the documents of every term; unknown terms contribute nothing.
    pub fn documents_with_any<'a, I>(&self, terms: I) -> BTreeSet<D>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut out = BTreeSet::new();
        for term in terms {
            if let Some(plist) = self.postings.get(term) {
                out.extend(plist.keys().cloned());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::DictionaryConfig;

    fn sample() -> InvertedIndex<u32> {
        let docs = ["the cat sat on the mat", "the dog ran", "cat and dog"];
        let dict = Dictionary::build(&docs, DictionaryConfig::without_stopwords());
        InvertedIndex::build(dict, &docs, &[1, 2, 3]).unwrap()
    }

    #[test]
    fn postings_and_frequencies_agree() {
        let index = sample();
        for term in index.terms().map(str::to_string).collect::<Vec<_>>() {
            let docs = index.postings(&term).unwrap_or_default();
            for id in index.document_ids() {
                let present = index.frequency(&term, id).map_or(false, |f| f > 0);
                assert_eq!(present, docs.contains(id), "term {term} doc {id}");
            }
        }
    }

    #[test]
    fn unknown_lookups_are_absent() {
        let index = sample();
        assert_eq!(index.postings("zebra"), None);
        assert_eq!(index.frequency("cat", &2), None);
        assert_eq!(index.tf_idf("cat", &99), None);
        assert!(index.document_terms(&99).is_none());
        assert!(index.document_vector(&99).is_none());
    }

    #[test]
    fn weights_follow_log_tf_idf() {
        let index = sample();
        assert_eq!(index.frequency("the", &1), Some(2));
        let expected = 3f64.log10() * (3.0f64 / 2.0).log10();
        assert!((index.tf_idf("the", &1).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn tf_idf_is_monotone() {
        assert!(tf_idf(2, 3, 10) >= tf_idf(1, 3, 10));
        assert!(tf_idf(5, 3, 10) >= tf_idf(2, 3, 10));
        assert!(tf_idf(2, 2, 10) >= tf_idf(2, 3, 10));
        assert!(tf_idf(2, 3, 10) >= tf_idf(2, 10, 10));
        assert_eq!(tf_idf(4, 10, 10), 0.0);
    }

    #[test]
    fn document_vector_is_dense_and_sorted() {
        let index = sample();
        let vector = index.document_vector(&2).unwrap();
        assert_eq!(vector.len(), index.num_terms());
        let terms: Vec<&str> = index.terms().collect();
        let dog = terms.iter().position(|t| *t == "dog").unwrap();
        let mat = terms.iter().position(|t| *t == "mat").unwrap();
        assert_eq!(vector[dog], index.tf_idf("dog", &2).unwrap());
        assert_eq!(vector[mat], 0.0);
    }

    #[test]
    fn document_norm_matches_weights() {
        let index = sample();
        let sum: f64 = index.document_weights(&1).map(|(_, w)| w * w).sum();
        assert!((index.document_norm(&1).unwrap() - sum.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn malformed_input_is_rejected() {
        let docs = ["a b", "c"];
        let dict = Dictionary::build(&docs, DictionaryConfig::without_stopwords());
        assert!(matches!(
            InvertedIndex::build(dict.clone(), &docs, &[1u32]),
            Err(Error::LengthMismatch { documents: 2, ids: 1 })
        ));
        assert!(matches!(InvertedIndex::build(dict, &docs, &[1u32, 1]), Err(Error::DuplicateDocument(_))));
        let empty = Dictionary::build::<&str>(&[], DictionaryConfig::default());
        assert!(matches!(InvertedIndex::<u32>::build(empty, &docs[..0], &[]), Err(Error::EmptyVocabulary)));
    }

    #[test]
    fn tokens_outside_vocabulary_are_dropped() {
        let dict = Dictionary::from_words(["cat"], DictionaryConfig::without_stopwords());
        let index = InvertedIndex::build(dict, &["cat dog dog"], &["a".to_string()]).unwrap();
        assert_eq!(index.postings("dog"), None);
        assert_eq!(index.document_terms(&"a".to_string()).unwrap(), &["cat".to_string()]);
    }
}
