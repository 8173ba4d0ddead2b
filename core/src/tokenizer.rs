use crate::dictionary::DictionaryConfig;
use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

/// Built-in English stopword list, used by `DictionaryConfig::default()`.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
    "be","because","been","before","being","below","between","both","but","by",
    "can","can't","cannot","could","couldn't",
    "did","didn't","do","does","doesn't","doing","don't","down","during",
    "each","few","for","from","further",
    "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
    "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
    "let's","me","more","most","mustn't","my","myself",
    "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
    "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
    "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
    "under","until","up","very",
    "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
    "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves",
];

/// One surviving word of a text: the lower-cased surface form and its normalized term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub raw: String,
    pub term: String,
}

/// Split text into lower-cased words after NFKC normalization. No filtering.
pub fn words(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    RE.find_iter(&normalized).map(|m| m.as_str().to_string()).collect()
}

/// Tokenize text using NFKC normalization, lowercase, stopword removal, and optional stemming.
pub fn tokenize(text: &str, config: &DictionaryConfig) -> Vec<Token> {
    let mut tokens = Vec::new();
    for word in words(text) {
        if config.stopwords.contains(&word) { continue; }
        let raw: String = word.chars().filter(|c| *c != '\'').collect();
        if raw.is_empty() { continue; }
        let term = if config.stem { STEMMER.stem(&raw).to_string() } else { raw.clone() };
        tokens.push(Token { raw, term });
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("Running, runner's run!", &DictionaryConfig::default());
        assert!(t.iter().any(|tok| tok.term == "run"));
        assert!(t.iter().any(|tok| tok.raw == "runners"));
    }

    #[test]
    fn stopwords_are_dropped() {
        let t = tokenize("the cat", &DictionaryConfig::default());
        assert_eq!(t, vec![Token { raw: "cat".into(), term: "cat".into() }]);
    }

    #[test]
    fn stemming_can_be_disabled() {
        let config = DictionaryConfig { stem: false, ..DictionaryConfig::default() };
        let t = tokenize("Searching", &config);
        assert_eq!(t[0].term, "searching");
    }
}
