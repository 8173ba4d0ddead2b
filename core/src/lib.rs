//! Weighted inverted index with boolean, wildcard, ranked and fuzzy retrieval.

pub mod boolean;
pub mod classify;
pub mod dictionary;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod index;
pub mod persist;
pub mod spelling;
pub mod tokenizer;
pub mod vector;
pub mod wildcard;

use std::fmt::Debug;

/// Anything usable as a document identifier: integers, strings, ...
pub trait DocKey: Ord + Clone + Debug {}

impl<T: Ord + Clone + Debug> DocKey for T {}

pub use boolean::{BooleanModel, Query, QueryError};
pub use classify::KnnClassifier;
pub use dictionary::{Dictionary, DictionaryConfig};
pub use engine::{Engine, EngineConfig};
pub use error::{Error, Result};
pub use feedback::{FeedbackStore, RelevanceFeedback, Rocchio, RocchioConfig};
pub use index::{InvertedIndex, Posting};
pub use spelling::{ConfusionMatrix, SpellingConfig, SpellingCorrector, Suggestion};
pub use vector::{QueryVector, ScoredDoc, Similarity, VectorSpaceModel};
pub use wildcard::WildcardIndex;
