//! k-nearest-neighbour topic assignment on top of vector space retrieval.

use crate::feedback::RelevanceFeedback;
use crate::index::InvertedIndex;
use crate::vector::{Similarity, VectorSpaceModel};
use crate::DocKey;
use std::collections::{BTreeMap, HashMap};

pub struct KnnClassifier<'a, D> {
    vsm: VectorSpaceModel<'a, D>,
    labels: &'a BTreeMap<D, Vec<String>>,
    k: usize,
    similarity: Similarity,
}

impl<'a, D: DocKey> KnnClassifier<'a, D> {
    pub fn new(index: &'a InvertedIndex<D>, labels: &'a BTreeMap<D, Vec<String>>, k: usize) -> Self {
        Self { vsm: VectorSpaceModel::new(index), labels, k, similarity: Similarity::InnerProduct }
    }

    pub fn with_similarity(mut self, similarity: Similarity) -> Self {
        self.similarity = similarity;
        self
    }

    /// Topics of the `k` nearest documents, most common first, stopping once the
    /// chosen topics account for more than half of all neighbour topics.
    pub fn predict(&self, text: &str) -> Vec<String> {
        let neighbours = self.vsm.search_ids(text, self.similarity, Some(self.k), &RelevanceFeedback::new());

        let mut order: Vec<&str> = Vec::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for doc in &neighbours {
            for topic in self.labels.get(doc).into_iter().flatten() {
                let count = counts.entry(topic.as_str()).or_insert(0);
                if *count == 0 {
                    order.push(topic.as_str());
                }
                *count += 1;
            }
        }
        let total: usize = counts.values().sum();
        if total == 0 {
            return Vec::new();
        }

        // Stable: equally common topics keep first-seen order.
        order.sort_by(|a, b| counts[b].cmp(&counts[a]));
        let mut chosen = Vec::new();
        let mut covered = 0usize;
        for topic in order {
            chosen.push(topic.to_string());
            covered += counts[topic];
            if covered * 2 > total {
                break;
            }
        }
        tracing::debug!(neighbours = neighbours.len(), topics = chosen.len(), "classified text");
        chosen
    }
}
