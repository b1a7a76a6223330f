use crate::tokenizer::Tokenizer;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

lazy_static! {
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").expect("valid regex");
    // Alphanumerics, whitespace and a small punctuation allowlist survive
    // cleaning; everything else is stripped before tokenization.
    static ref DISALLOWED_RE: Regex = Regex::new(r"[^\p{L}\p{N}\s\-_.,!?]").expect("valid regex");
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryInfo {
    pub terms: Vec<String>,
    pub term_count: usize,
    pub unique_terms: usize,
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Validates and normalizes raw query strings into query terms using the
/// same tokenizer as document ingestion. Pure transformation; never touches
/// the index or storage.
pub struct QueryProcessor {
    tokenizer: Tokenizer,
}

impl QueryProcessor {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self { tokenizer }
    }

    pub fn process(&self, raw_query: &str) -> Vec<String> {
        let trimmed = raw_query.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }
        let cleaned = DISALLOWED_RE.replace_all(trimmed, "");
        let cleaned = WHITESPACE_RE.replace_all(&cleaned, " ");
        self.tokenizer.tokenize(&cleaned)
    }

    /// True iff at least one non-empty term survived normalization.
    pub fn validate(&self, terms: &[String]) -> bool {
        terms.iter().any(|term| !term.trim().is_empty())
    }

    pub fn query_info(&self, terms: &[String]) -> QueryInfo {
        let unique: HashSet<&str> = terms.iter().map(String::as_str).collect();
        QueryInfo {
            terms: terms.to_vec(),
            term_count: terms.len(),
            unique_terms: unique.len(),
            is_valid: self.validate(terms),
            error: None,
            message: None,
        }
    }
}
