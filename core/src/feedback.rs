//! Relevance feedback: the caller-owned judgement sets and the Rocchio query update.

use crate::index::InvertedIndex;
use crate::vector::QueryVector;
use crate::DocKey;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RocchioConfig {
    /// Weight of the original query once feedback is present.
    pub alpha: f64,
    /// Weight of the mean relevant document vector.
    pub beta: f64,
    /// Weight of the mean non-relevant document vector.
    pub gamma: f64,
}

impl Default for RocchioConfig {
    fn default() -> Self {
        Self { alpha: 0.8, beta: 0.3, gamma: 0.1 }
    }
}

/// Documents a user marked relevant or non-relevant for one query. The two sets stay disjoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelevanceFeedback<D> {
    relevant: BTreeSet<D>,
    non_relevant: BTreeSet<D>,
}

impl<D> Default for RelevanceFeedback<D> {
    fn default() -> Self {
        Self { relevant: BTreeSet::new(), non_relevant: BTreeSet::new() }
    }
}

impl<D: DocKey> RelevanceFeedback<D> {
    pub fn new() -> Self { Self::default() }

    pub fn mark_relevant(&mut self, doc: D) {
        self.non_relevant.remove(&doc);
        self.relevant.insert(doc);
    }

    pub fn mark_non_relevant(&mut self, doc: D) {
        self.relevant.remove(&doc);
        self.non_relevant.insert(doc);
    }

    pub fn unmark(&mut self, doc: &D) {
        self.relevant.remove(doc);
        self.non_relevant.remove(doc);
    }

    pub fn clear(&mut self) {
        self.relevant.clear();
        self.non_relevant.clear();
    }

    pub fn relevant(&self) -> &BTreeSet<D> { &self.relevant }

    pub fn non_relevant(&self) -> &BTreeSet<D> { &self.non_relevant }

    pub fn is_empty(&self) -> bool { self.relevant.is_empty() && self.non_relevant.is_empty() }
}

/// Feedback keyed by (corpus, query string). Not synchronized; share it behind a lock.
#[derive(Debug, Clone)]
pub struct FeedbackStore<D> {
    entries: HashMap<(String, String), RelevanceFeedback<D>>,
}

impl<D> Default for FeedbackStore<D> {
    fn default() -> Self {
        Self { entries: HashMap::new() }
    }
}

impl<D: DocKey> FeedbackStore<D> {
    pub fn new() -> Self { Self::default() }

    pub fn get(&self, corpus: &str, query: &str) -> Option<&RelevanceFeedback<D>> {
        self.entries.get(&(corpus.to_string(), query.to_string()))
    }

    pub fn entry(&mut self, corpus: &str, query: &str) -> &mut RelevanceFeedback<D> {
        self.entries.entry((corpus.to_string(), query.to_string())).or_default()
    }

    pub fn remove(&mut self, corpus: &str, query: &str) -> Option<RelevanceFeedback<D>> {
        self.entries.remove(&(corpus.to_string(), query.to_string()))
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Rocchio {
    config: RocchioConfig,
}

impl Rocchio {
    pub fn new(config: RocchioConfig) -> Self { Self { config } }

    pub fn config(&self) -> &RocchioConfig { &self.config }

    /// `alpha * q + beta * mean(relevant) - gamma * mean(non_relevant)`, keeping only positive weights.
    ///
    /// Without any judgement the query is returned as is. Ids the index does not
    /// know are ignored; a side whose ids are all unknown is omitted.
    pub fn update<D: DocKey>(
        &self,
        index: &InvertedIndex<D>,
        query: &QueryVector,
        relevant: &BTreeSet<D>,
        non_relevant: &BTreeSet<D>,
    ) -> QueryVector {
        if relevant.is_empty() && non_relevant.is_empty() {
            return query.clone();
        }

        let mut weights: BTreeMap<String, f64> =
            query.iter().map(|(term, w)| (term.to_string(), self.config.alpha * w)).collect();
        add_centroid(index, &mut weights, relevant, self.config.beta);
        add_centroid(index, &mut weights, non_relevant, -self.config.gamma);

        let updated = QueryVector::from_weights(weights);
        tracing::debug!(
            relevant = relevant.len(),
            non_relevant = non_relevant.len(),
            terms_before = query.len(),
            terms_after = updated.len(),
            "applied rocchio feedback"
        );
        updated
    }
}

fn add_centroid<D: DocKey>(index: &InvertedIndex<D>, weights: &mut BTreeMap<String, f64>, docs: &BTreeSet<D>, factor: f64) {
    let known: Vec<&D> = docs
        .iter()
        .filter(|doc| {
            let found = index.contains_document(doc);
            if !found {
                tracing::warn!(doc = ?doc, "feedback document is not in the index");
            }
            found
        })
        .collect();
    if known.is_empty() {
        return;
    }
    let scale = factor / known.len() as f64;
    for doc in known {
        for (term, w) in index.document_weights(doc) {
            *weights.entry(term.to_string()).or_insert(0.0) += scale * w;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{Dictionary, DictionaryConfig};

    fn index() -> InvertedIndex<u32> {
        let docs = ["apple banana", "banana cherry", "cherry durian", "elder fig"];
        let config = DictionaryConfig { stem: false, ..DictionaryConfig::without_stopwords() };
        InvertedIndex::build(Dictionary::build(&docs, config), &docs, &[1, 2, 3, 4]).unwrap()
    }

    #[test]
    fn judgements_stay_disjoint() {
        let mut feedback = RelevanceFeedback::new();
        feedback.mark_relevant(3u32);
        feedback.mark_non_relevant(3);
        assert!(feedback.relevant().is_empty());
        assert!(feedback.non_relevant().contains(&3));
        feedback.mark_relevant(3);
        assert!(feedback.non_relevant().is_empty());
        feedback.unmark(&3);
        assert!(feedback.is_empty());
    }

    #[test]
    fn store_is_keyed_by_corpus_and_query() {
        let mut store = FeedbackStore::new();
        store.entry("news", "cherry").mark_relevant(2u32);
        assert!(store.get("news", "cherry").unwrap().relevant().contains(&2));
        assert!(store.get("courses", "cherry").is_none());
        assert!(store.remove("news", "cherry").is_some());
        assert!(store.is_empty());
    }

    #[test]
    fn no_feedback_leaves_query_unchanged() {
        let index = index();
        let query = QueryVector::from_terms(["banana"]);
        let updated = Rocchio::default().update(&index, &query, &BTreeSet::new(), &BTreeSet::new());
        assert_eq!(updated, query);
    }

    #[test]
    fn relevant_documents_pull_in_their_terms() {
        let index = index();
        let query = QueryVector::from_terms(["banana"]);
        let relevant: BTreeSet<u32> = [2].into();
        let updated = Rocchio::default().update(&index, &query, &relevant, &BTreeSet::new());
        let cherry = 0.3 * index.tf_idf("cherry", &2).unwrap();
        assert!((updated.weight("cherry").unwrap() - cherry).abs() < 1e-12);
        let banana = 0.8 + 0.3 * index.tf_idf("banana", &2).unwrap();
        assert!((updated.weight("banana").unwrap() - banana).abs() < 1e-12);
    }

    #[test]
    fn non_positive_dimensions_are_dropped() {
        let index = index();
        let query = QueryVector::from_terms(["banana"]);
        let non_relevant: BTreeSet<u32> = [2, 3].into();
        let updated = Rocchio::default().update(&index, &query, &BTreeSet::new(), &non_relevant);
        assert!(updated.weight("cherry").is_none());
        assert!(updated.weight("durian").is_none());
        assert!(updated.weight("banana").unwrap() > 0.0);
    }

    #[test]
    fn unknown_feedback_ids_are_ignored() {
        let index = index();
        let query = QueryVector::from_terms(["banana"]);
        let relevant: BTreeSet<u32> = [42].into();
        let updated = Rocchio::default().update(&index, &query, &relevant, &BTreeSet::new());
        assert_eq!(updated.len(), 1);
        assert!((updated.weight("banana").unwrap() - 0.8).abs() < 1e-12);
    }
}
