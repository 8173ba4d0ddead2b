use criterion::{criterion_group, criterion_main, Criterion};
use sift_core::{Engine, EngineConfig, RelevanceFeedback, Similarity};

const TEXT: &str = "An inverted index maps every term of a collection to the documents that contain it. \
Boolean retrieval intersects and unions those posting lists, while the vector space model weighs \
terms by tf-idf and ranks documents by their similarity to the query. Relevance feedback moves the \
query towards documents a reader marked as useful, and spelling correction proposes nearby words \
from the vocabulary when a query term is unknown.";

fn corpus() -> (Vec<String>, Vec<u32>) {
    let sentences: Vec<&str> = TEXT.split(". ").collect();
    let docs: Vec<String> = (0..400)
        .map(|i| format!("{} {}", sentences[i % sentences.len()], sentences[(i * 7 + 3) % sentences.len()]))
        .collect();
    let ids = (0..docs.len() as u32).collect();
    (docs, ids)
}

fn bench_build(c: &mut Criterion) {
    let (docs, ids) = corpus();
    c.bench_function("build_engine", |b| b.iter(|| Engine::build(&docs, &ids, EngineConfig::default())));
}

fn bench_queries(c: &mut Criterion) {
    let (docs, ids) = corpus();
    let engine = match Engine::build(&docs, &ids, EngineConfig::default()) {
        Ok(engine) => engine,
        Err(err) => panic!("bench corpus failed to index: {err}"),
    };
    let feedback = RelevanceFeedback::new();
    c.bench_function("vector_cosine", |b| {
        b.iter(|| engine.vector_with("ranked retrieval of documents", Similarity::Cosine, Some(10), &feedback))
    });
    c.bench_function("boolean_wildcard", |b| b.iter(|| engine.boolean("(retriev* OR vector) AND_NOT spelling")));
    c.bench_function("spelling_query", |b| b.iter(|| engine.suggest("revelance fedback", 5)));
}

criterion_group!(benches, bench_build, bench_queries);
criterion_main!(benches);
