use sift_core::tokenizer::{tokenize, words};
use sift_core::DictionaryConfig;

#[test]
fn it_normalizes_and_stems() {
    let toks = tokenize("Running Runners RUN! The ﬁle's menu.", &DictionaryConfig::default());
    let terms: Vec<String> = toks.iter().map(|t| t.term.clone()).collect();
    // Stemming to "run" should appear
    assert!(terms.contains(&"run".to_string()));
    // NFKC folds the "ﬁ" ligature
    assert!(toks.iter().any(|t| t.raw == "files"));
}

#[test]
fn it_filters_stopwords() {
    let toks = tokenize("The quick brown fox and the lazy dog", &DictionaryConfig::default());
    let terms: Vec<String> = toks.into_iter().map(|t| t.term).collect();
    assert!(!terms.contains(&"the".to_string()));
    assert!(!terms.contains(&"and".to_string()));
}

#[test]
fn it_keeps_stopwords_when_configured() {
    let toks = tokenize("The quick fox", &DictionaryConfig::without_stopwords());
    assert_eq!(toks[0].term, "the");
}

#[test]
fn words_skip_punctuation_and_digits() {
    assert_eq!(words("(cat) 42 dog-house"), vec!["cat", "dog", "house"]);
}
