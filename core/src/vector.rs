//! Vector space retrieval over the tf-idf weights of the inverted index.

use crate::error::{Error, Result};
use crate::feedback::{RelevanceFeedback, Rocchio, RocchioConfig};
use crate::index::InvertedIndex;
use crate::DocKey;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Similarity {
    #[default]
    InnerProduct,
    Cosine,
}

impl FromStr for Similarity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "inner-product" => Ok(Self::InnerProduct),
            "cosine" => Ok(Self::Cosine),
            other => Err(Error::Config(format!("unknown similarity {other:?}, expected inner-product or cosine"))),
        }
    }
}

impl fmt::Display for Similarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InnerProduct => write!(f, "inner-product"),
            Self::Cosine => write!(f, "cosine"),
        }
    }
}

/// Sparse query vector in term order. Only positive weights are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryVector {
    weights: BTreeMap<String, f64>,
}

impl QueryVector {
    /// Weight 1.0 for every distinct term.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { weights: terms.into_iter().map(|t| (t.into(), 1.0)).collect() }
    }

    pub fn from_weights<I: IntoIterator<Item = (String, f64)>>(weights: I) -> Self {
        Self { weights: weights.into_iter().filter(|(_, w)| *w > 0.0).collect() }
    }

    pub fn weight(&self, term: &str) -> Option<f64> { self.weights.get(term).copied() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.weights.iter().map(|(t, w)| (t.as_str(), *w))
    }

    pub fn norm(&self) -> f64 { self.weights.values().map(|w| w * w).sum::<f64>().sqrt() }

    pub fn len(&self) -> usize { self.weights.len() }

    pub fn is_empty(&self) -> bool { self.weights.is_empty() }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDoc<D> {
    pub doc: D,
    pub score: f64,
}

pub struct VectorSpaceModel<'a, D> {
    index: &'a InvertedIndex<D>,
    rocchio: Rocchio,
}

impl<'a, D: DocKey> VectorSpaceModel<'a, D> {
    pub fn new(index: &'a InvertedIndex<D>) -> Self {
        Self::with_rocchio(index, RocchioConfig::default())
    }

    pub fn with_rocchio(index: &'a InvertedIndex<D>, config: RocchioConfig) -> Self {
        Self { index, rocchio: Rocchio::new(config) }
    }

    /// Normalize the query text into a unit-weight term vector.
    pub fn query_vector(&self, query: &str) -> QueryVector {
        QueryVector::from_terms(self.index.dictionary().normalize(query))
    }

    /// Rank documents for `query`, applying relevance feedback when any is given.
    /// `limit = None` returns every document with a non-zero score.
    pub fn search(
        &self,
        query: &str,
        similarity: Similarity,
        limit: Option<usize>,
        feedback: &RelevanceFeedback<D>,
    ) -> Vec<ScoredDoc<D>> {
        let mut vector = self.query_vector(query);
        if !feedback.is_empty() {
            vector = self.rocchio.update(self.index, &vector, feedback.relevant(), feedback.non_relevant());
        }
        self.rank(&vector, similarity, limit)
    }

    /// `search` without scores.
    pub fn search_ids(
        &self,
        query: &str,
        similarity: Similarity,
        limit: Option<usize>,
        feedback: &RelevanceFeedback<D>,
    ) -> Vec<D> {
        self.search(query, similarity, limit, feedback).into_iter().map(|hit| hit.doc).collect()
    }

    pub fn rank(&self, vector: &QueryVector, similarity: Similarity, limit: Option<usize>) -> Vec<ScoredDoc<D>> {
        let mut scores: BTreeMap<&D, f64> = BTreeMap::new();
        for (term, q_w) in vector.iter() {
            if let Some(plist) = self.index.posting_list(term) {
                for (doc, posting) in plist {
                    *scores.entry(doc).or_insert(0.0) += q_w * posting.tf_idf;
                }
            }
        }

        if similarity == Similarity::Cosine {
            let q_norm = vector.norm();
            for (doc, score) in scores.iter_mut() {
                let d_norm = self.index.document_norm(doc).unwrap_or(0.0);
                let denom = q_norm * d_norm;
                *score = if denom > 0.0 { *score / denom } else { 0.0 };
            }
        }

        let mut ranked: Vec<ScoredDoc<D>> = scores
            .into_iter()
            .filter(|(_, score)| *score != 0.0)
            .map(|(doc, score)| ScoredDoc { doc: doc.clone(), score })
            .collect();
        // Stable sort over id order keeps ties deterministic.
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        if let Some(k) = limit {
            ranked.truncate(k);
        }
        ranked
    }
}
