use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use sift_core::persist::{load_index, save_index, IndexPaths};
use sift_core::{Dictionary, Engine, EngineConfig, InvertedIndex, RelevanceFeedback, Similarity};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct InputDoc {
    id: DocId,
    body: String,
}

/// Input ids may be JSON strings or integers; both are keyed as strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DocId {
    Text(String),
    Number(u64),
}

impl From<DocId> for String {
    fn from(id: DocId) -> Self {
        match id {
            DocId::Text(s) => s,
            DocId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Parser)]
#[command(name = "sift-indexer")]
#[command(about = "Build and query a weighted inverted index", long_about = None)]
struct Cli {
    /// Engine configuration (JSON); missing fields take their defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Boolean,
    Vector,
    Suggest,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from input JSON/JSONL files or a directory
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long)]
        output: String,
    },
    /// Run one query against a built index and print JSON
    Query {
        /// Index directory
        #[arg(long, default_value = "./index")]
        index: String,
        #[arg(long, value_enum, default_value_t = Mode::Vector)]
        mode: Mode,
        /// inner-product or cosine; defaults to the configured similarity
        #[arg(long)]
        similarity: Option<String>,
        /// Maximum results; 0 means unbounded for vector queries
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Document ids judged relevant
        #[arg(long)]
        relevant: Vec<String>,
        /// Document ids judged non-relevant
        #[arg(long)]
        non_relevant: Vec<String>,
        query: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Build { input, output } => build_index(&input, &output, &config),
        Commands::Query { index, mode, similarity, limit, relevant, non_relevant, query } => {
            let similarity = match similarity {
                Some(s) => s.parse::<Similarity>()?,
                None => config.similarity,
            };
            let mut feedback = RelevanceFeedback::new();
            relevant.into_iter().for_each(|id| feedback.mark_relevant(id));
            non_relevant.into_iter().for_each(|id| feedback.mark_non_relevant(id));
            run_query(&index, config, mode, similarity, limit, &feedback, &query)
        }
    }
}

fn build_index(input: &str, output: &str, config: &EngineConfig) -> Result<()> {
    let input_path = Path::new(input);
    let out_paths = IndexPaths::new(output);

    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
        files.sort();
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    } else {
        bail!("input path {input} does not exist");
    }

    let mut ids: Vec<String> = Vec::new();
    let mut bodies: Vec<String> = Vec::new();
    for file in files {
        let docs = if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file)?
        } else {
            read_json(&file)?
        };
        for doc in docs {
            ids.push(doc.id.into());
            bodies.push(doc.body);
        }
    }
    tracing::info!(num_docs = ids.len(), "ingested documents");

    let dictionary = Dictionary::build(&bodies, config.dictionary.clone());
    let index = InvertedIndex::build(dictionary, &bodies, &ids)?;
    let created_at = time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339)?;
    let meta = save_index(&out_paths, &index, created_at)?;

    tracing::info!(output, num_terms = meta.num_terms, "index build complete");
    Ok(())
}

fn read_jsonl(file: &Path) -> Result<Vec<InputDoc>> {
    let reader = BufReader::new(File::open(file)?);
    let mut docs = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        docs.push(serde_json::from_str(&line)?);
    }
    Ok(docs)
}

fn read_json(file: &Path) -> Result<Vec<InputDoc>> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    let docs = match json {
        serde_json::Value::Array(arr) => arr.into_iter().map(serde_json::from_value).collect::<Result<Vec<_>, _>>()?,
        serde_json::Value::Object(_) => vec![serde_json::from_value(json)?],
        _ => Vec::new(),
    };
    Ok(docs)
}

fn run_query(
    index_dir: &str,
    config: EngineConfig,
    mode: Mode,
    similarity: Similarity,
    limit: usize,
    feedback: &RelevanceFeedback<String>,
    query: &str,
) -> Result<()> {
    let (index, meta) = load_index::<String>(&IndexPaths::new(index_dir))?;
    tracing::debug!(created_at = %meta.created_at, num_docs = meta.num_docs, "loaded index");
    let engine = Engine::from_index(index, config);
    let start = std::time::Instant::now();

    let results = match mode {
        Mode::Boolean => {
            let docs: BTreeSet<String> = engine.boolean(query);
            serde_json::to_value(docs)?
        }
        Mode::Vector => {
            let limit = (limit > 0).then_some(limit);
            serde_json::to_value(engine.vector_with(query, similarity, limit, feedback))?
        }
        Mode::Suggest => serde_json::to_value(engine.suggest(query, limit))?,
    };

    let elapsed = start.elapsed();
    let out = serde_json::json!({ "query": query, "took_s": elapsed.as_secs_f64(), "results": results });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_string_ids_are_accepted() {
        let numeric: InputDoc = serde_json::from_str(r#"{"id": 7, "body": "seven"}"#).unwrap();
        let text: InputDoc = serde_json::from_str(r#"{"id": "d7", "body": "seven"}"#).unwrap();
        assert_eq!(String::from(numeric.id), "7");
        assert_eq!(String::from(text.id), "d7");
        assert!(serde_json::from_str::<InputDoc>(r#"{"id": 1.5, "body": "x"}"#).is_err());
    }
}
