//! On-disk layout: `index.bin` holds the bincode-encoded index, `meta.json` describes it.

use crate::error::{Error, Result};
use crate::index::InvertedIndex;
use crate::DocKey;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: usize,
    pub num_terms: usize,
    pub created_at: String,
    pub version: u32,
}

impl MetaFile {
    pub fn describe<D: DocKey>(index: &InvertedIndex<D>, created_at: impl Into<String>) -> Self {
        Self {
            num_docs: index.num_docs(),
            num_terms: index.num_terms(),
            created_at: created_at.into(),
            version: FORMAT_VERSION,
        }
    }
}

/// Directory holding one saved index.
#[derive(Debug, Clone)]
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    pub fn index_file(&self) -> PathBuf { self.root.join("index.bin") }

    pub fn meta_file(&self) -> PathBuf { self.root.join("meta.json") }
}

/// Write the index (dictionary included) and its metadata. Returns the metadata written.
pub fn save_index<D: DocKey + Serialize>(
    paths: &IndexPaths,
    index: &InvertedIndex<D>,
    created_at: impl Into<String>,
) -> Result<MetaFile> {
    fs::create_dir_all(&paths.root)?;
    let bytes = bincode::serialize(index)?;
    fs::write(paths.index_file(), &bytes)?;

    let meta = MetaFile::describe(index, created_at);
    fs::write(paths.meta_file(), serde_json::to_vec_pretty(&meta)?)?;
    tracing::debug!(root = %paths.root.display(), bytes = bytes.len(), docs = meta.num_docs, "saved index");
    Ok(meta)
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    Ok(serde_json::from_slice(&fs::read(paths.meta_file())?)?)
}

/// Load a saved index after checking its metadata. Other format versions are refused.
pub fn load_index<D: DocKey + DeserializeOwned>(paths: &IndexPaths) -> Result<(InvertedIndex<D>, MetaFile)> {
    let meta = load_meta(paths)?;
    if meta.version != FORMAT_VERSION {
        return Err(Error::UnsupportedFormat { found: meta.version, expected: FORMAT_VERSION });
    }
    let index: InvertedIndex<D> = bincode::deserialize(&fs::read(paths.index_file())?)?;
    if index.num_docs() != meta.num_docs {
        tracing::warn!(meta = meta.num_docs, index = index.num_docs(), "meta.json disagrees with index.bin");
    }
    Ok((index, meta))
}
