use crate::boolean::BooleanModel;
use crate::classify::KnnClassifier;
use crate::dictionary::{Dictionary, DictionaryConfig};
use crate::error::Result;
use crate::feedback::{RelevanceFeedback, RocchioConfig};
use crate::index::InvertedIndex;
use crate::spelling::{SpellingConfig, SpellingCorrector, Suggestion};
use crate::vector::{ScoredDoc, Similarity, VectorSpaceModel};
use crate::wildcard::WildcardIndex;
use crate::DocKey;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub dictionary: DictionaryConfig,
    pub rocchio: RocchioConfig,
    pub spelling: SpellingConfig,
    /// Similarity used by `Engine::vector`.
    pub similarity: Similarity,
    /// Neighbours consulted by the topic classifier.
    pub knn_k: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dictionary: DictionaryConfig::default(),
            rocchio: RocchioConfig::default(),
            spelling: SpellingConfig::default(),
            similarity: Similarity::default(),
            knn_k: 5,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

/// One corpus: its index plus the structures derived from it.
pub struct Engine<D> {
    index: InvertedIndex<D>,
    wildcards: WildcardIndex,
    speller: SpellingCorrector,
    config: EngineConfig,
}

impl<D: DocKey> Engine<D> {
    pub fn build<S: AsRef<str>>(documents: &[S], ids: &[D], config: EngineConfig) -> Result<Self> {
        let dictionary = Dictionary::build(documents, config.dictionary.clone());
        let index = InvertedIndex::build(dictionary, documents, ids)?;
        Ok(Self::from_index(index, config))
    }

    /// Wrap a loaded index. Text keeps being normalized with the index's own dictionary settings.
    pub fn from_index(index: InvertedIndex<D>, config: EngineConfig) -> Self {
        let wildcards = WildcardIndex::from_index(&index);
        let speller = SpellingCorrector::from_index(&index, config.spelling.clone());
        tracing::info!(words = wildcards.len(), lexicon = speller.lexicon_len(), "prepared engine");
        Self { index, wildcards, speller, config }
    }

    pub fn boolean(&self, query: &str) -> BTreeSet<D> {
        BooleanModel::new(&self.index, &self.wildcards).retrieve(query)
    }

    pub fn vector(&self, query: &str, limit: Option<usize>, feedback: &RelevanceFeedback<D>) -> Vec<ScoredDoc<D>> {
        self.vector_with(query, self.config.similarity, limit, feedback)
    }

    pub fn vector_with(
        &self,
        query: &str,
        similarity: Similarity,
        limit: Option<usize>,
        feedback: &RelevanceFeedback<D>,
    ) -> Vec<ScoredDoc<D>> {
        VectorSpaceModel::with_rocchio(&self.index, self.config.rocchio).search(query, similarity, limit, feedback)
    }

    pub fn suggest(&self, query: &str, limit: usize) -> Vec<Suggestion> {
        self.speller.check_query(query, limit)
    }

    pub fn classifier<'a>(&'a self, labels: &'a BTreeMap<D, Vec<String>>) -> KnnClassifier<'a, D> {
        KnnClassifier::new(&self.index, labels, self.config.knn_k).with_similarity(self.config.similarity)
    }

    pub fn index(&self) -> &InvertedIndex<D> { &self.index }

    pub fn wildcards(&self) -> &WildcardIndex { &self.wildcards }

    pub fn speller(&self) -> &SpellingCorrector { &self.speller }

    pub fn config(&self) -> &EngineConfig { &self.config }

    pub fn into_index(self) -> InvertedIndex<D> { self.index }
}
