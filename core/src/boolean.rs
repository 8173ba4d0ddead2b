//! Boolean retrieval over `AND`, `OR` and `AND_NOT` with parentheses and `*` wildcards.
//!
//! There is no operator precedence. The top-level operator of an expression is
//! the leftmost one sitting outside every parenthesis, so `a OR b AND c`
//! evaluates as `a OR (b AND c)` and `a AND b OR c` as `a AND (b OR c)`.

use crate::index::InvertedIndex;
use crate::wildcard::{WildcardIndex, WILDCARD};
use crate::DocKey;
use std::collections::BTreeSet;
use std::fmt;
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("empty query")]
    Empty,
    #[error("unbalanced parentheses")]
    UnbalancedParens,
    #[error("operator {0} is missing an operand")]
    MissingOperand(Operator),
    #[error("unexpected parenthesis inside a term")]
    StrayParen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
    AndNot,
}

impl Operator {
    fn from_word(word: &str) -> Option<Self> {
        match word {
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "AND_NOT" => Some(Self::AndNot),
            _ => None,
        }
    }

    fn apply<D: DocKey>(self, left: BTreeSet<D>, right: BTreeSet<D>) -> BTreeSet<D> {
        match self {
            Self::And => left.intersection(&right).cloned().collect(),
            Self::Or => left.union(&right).cloned().collect(),
            Self::AndNot => left.difference(&right).cloned().collect(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
            Self::AndNot => write!(f, "AND_NOT"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(String),
    Op(Operator),
    LParen,
    RParen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Term(String),
    Wildcard(String),
    Binary(Operator, Box<Query>, Box<Query>),
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Term(term) | Query::Wildcard(term) => write!(f, "{term}"),
            Query::Binary(op, left, right) => write!(f, "({left} {op} {right})"),
        }
    }
}

/// Split a query into words, operators and parentheses. Operators are
/// case-sensitive whole words.
pub fn tokenize(query: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    let flush = |word: &mut String, tokens: &mut Vec<Token>| {
        if word.is_empty() { return; }
        let taken = std::mem::take(word);
        match Operator::from_word(&taken) {
            Some(op) => tokens.push(Token::Op(op)),
            None => tokens.push(Token::Word(taken)),
        }
    };
    for c in query.chars() {
        match c {
            '(' | ')' => {
                flush(&mut word, &mut tokens);
                tokens.push(if c == '(' { Token::LParen } else { Token::RParen });
            }
            c if c.is_whitespace() => flush(&mut word, &mut tokens),
            c => word.push(c),
        }
    }
    flush(&mut word, &mut tokens);
    tokens
}

pub fn parse(query: &str) -> Result<Query, QueryError> {
    let tokens = tokenize(query);
    let mut depth = 0i64;
    for token in &tokens {
        match token {
            Token::LParen => depth += 1,
            Token::RParen => depth -= 1,
            _ => {}
        }
    }
    if depth != 0 {
        return Err(QueryError::UnbalancedParens);
    }
    parse_tokens(&tokens)
}

// Callers guarantee `tokens` has as many '(' as ')'.
fn parse_tokens(tokens: &[Token]) -> Result<Query, QueryError> {
    if tokens.is_empty() {
        return Err(QueryError::Empty);
    }

    // Leftmost operator with balanced text on both sides.
    let mut depth = 0i64;
    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::LParen => depth += 1,
            Token::RParen => depth -= 1,
            Token::Op(op) if depth == 0 => {
                let (left, right) = (&tokens[..i], &tokens[i + 1..]);
                if left.is_empty() || right.is_empty() {
                    return Err(QueryError::MissingOperand(*op));
                }
                return Ok(Query::Binary(*op, Box::new(parse_tokens(left)?), Box::new(parse_tokens(right)?)));
            }
            _ => {}
        }
    }

    if tokens.first() == Some(&Token::LParen) && tokens.last() == Some(&Token::RParen) && outer_parens_match(tokens) {
        return parse_tokens(&tokens[1..tokens.len() - 1]);
    }

    let mut words = Vec::new();
    for token in tokens {
        match token {
            Token::Word(w) => words.push(w.as_str()),
            Token::LParen | Token::RParen => return Err(QueryError::StrayParen),
            Token::Op(op) => return Err(QueryError::MissingOperand(*op)),
        }
    }
    if let Some(pattern) = words.iter().find(|w| w.contains(WILDCARD)) {
        return Ok(Query::Wildcard(pattern.nfkc().collect::<String>().to_lowercase()));
    }
    Ok(Query::Term(words.join(" ")))
}

/// True when the first token's parenthesis closes at the last token.
fn outer_parens_match(tokens: &[Token]) -> bool {
    let mut depth = 0i64;
    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::LParen => depth += 1,
            Token::RParen => depth -= 1,
            _ => {}
        }
        if depth == 0 {
            return i == tokens.len() - 1;
        }
    }
    false
}

pub struct BooleanModel<'a, D> {
    index: &'a InvertedIndex<D>,
    wildcards: &'a WildcardIndex,
}

impl<'a, D: DocKey> BooleanModel<'a, D> {
    pub fn new(index: &'a InvertedIndex<D>, wildcards: &'a WildcardIndex) -> Self {
        Self { index, wildcards }
    }

    /// Documents matching a boolean query. Malformed queries match nothing.
    pub fn retrieve(&self, query: &str) -> BTreeSet<D> {
        match parse(query) {
            Ok(parsed) => self.evaluate(&parsed),
            Err(err) => {
                tracing::debug!(query, error = %err, "rejected boolean query");
                BTreeSet::new()
            }
        }
    }

    pub fn evaluate(&self, query: &Query) -> BTreeSet<D> {
        match query {
            Query::Term(word) => self.resolve_term(word),
            Query::Wildcard(pattern) => self.resolve_wildcard(pattern),
            Query::Binary(op, left, right) => op.apply(self.evaluate(left), self.evaluate(right)),
        }
    }

    /// Postings of the first term that survives normalization of `text`.
    fn resolve_term(&self, text: &str) -> BTreeSet<D> {
        let terms = self.index.dictionary().normalize(text);
        if terms.len() > 1 {
            tracing::debug!(text, ignored = ?&terms[1..], "boolean term has several words, using the first");
        }
        match terms.first() {
            Some(term) => self.index.documents_with_any([term.as_str()]),
            None => BTreeSet::new(),
        }
    }

    fn resolve_wildcard(&self, pattern: &str) -> BTreeSet<D> {
        let mut out = BTreeSet::new();
        for word in self.wildcards.indexed_words(pattern) {
            out.extend(self.resolve_term(&word));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(t: &str) -> Box<Query> { Box::new(Query::Term(t.to_string())) }

    #[test]
    fn tokenizes_operators_and_parens() {
        let tokens = tokenize("(cat OR dog) AND_NOT bird");
        assert_eq!(tokens, vec![
            Token::LParen,
            Token::Word("cat".into()),
            Token::Op(Operator::Or),
            Token::Word("dog".into()),
            Token::RParen,
            Token::Op(Operator::AndNot),
            Token::Word("bird".into()),
        ]);
        // Operators are case-sensitive.
        assert_eq!(tokenize("cat and dog").len(), 3);
        assert!(tokenize("cat and dog").iter().all(|t| matches!(t, Token::Word(_))));
    }

    #[test]
    fn leftmost_balanced_operator_wins() {
        assert_eq!(parse("a OR b AND c").unwrap(), Query::Binary(
            Operator::Or, term("a"), Box::new(Query::Binary(Operator::And, term("b"), term("c"))),
        ));
        assert_eq!(parse("(a OR b) AND c").unwrap(), Query::Binary(
            Operator::And, Box::new(Query::Binary(Operator::Or, term("a"), term("b"))), term("c"),
        ));
    }

    #[test]
    fn strips_redundant_parentheses() {
        assert_eq!(parse("((a))").unwrap(), Query::Term("a".into()));
        assert_eq!(parse("(((a OR b)) AND c)").unwrap(), parse("(a OR b) AND c").unwrap());
        assert_eq!(parse("(a) AND (b)").unwrap(), Query::Binary(Operator::And, term("a"), term("b")));
    }

    #[test]
    fn malformed_queries_are_errors() {
        assert_eq!(parse(""), Err(QueryError::Empty));
        assert_eq!(parse("()"), Err(QueryError::Empty));
        assert_eq!(parse("(a AND b"), Err(QueryError::UnbalancedParens));
        assert_eq!(parse("a AND"), Err(QueryError::MissingOperand(Operator::And)));
        assert_eq!(parse("(a) (b)"), Err(QueryError::StrayParen));
    }

    #[test]
    fn wildcard_terms_are_lowercased() {
        assert_eq!(parse("Se*CH").unwrap(), Query::Wildcard("se*ch".into()));
    }

    #[test]
    fn multi_word_leaf_keeps_every_word() {
        assert_eq!(parse("the cat").unwrap(), Query::Term("the cat".into()));
        assert_eq!(parse("the se*ch").unwrap(), Query::Wildcard("se*ch".into()));
    }

    #[test]
    fn display_is_fully_parenthesized() {
        assert_eq!(parse("a AND b OR c").unwrap().to_string(), "(a AND (b OR c))");
    }
}
