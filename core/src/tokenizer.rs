use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref TOKEN_RE: Regex = Regex::new(r"(?u)[\p{L}\p{N}]+").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","after","also","an","and","are","as","at",
            "be","before","being","but","by",
            "can",
            "each",
            "first","for","from",
            "get",
            "had","has","have","he","her","here","him","his",
            "if","in","into","is","it","its",
            "just",
            "know",
            "life","like",
            "made","make","many","more",
            "now",
            "of","on","only","out","over",
            "said","should","so","some","still",
            "that","the","their","them","then","these","they","think","this","through","time","to","two",
            "up",
            "very",
            "was","what","when","where","which","will","with","work","would",
            "your",
        ];
        words.iter().copied().collect()
    };
}

fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Turns raw text into a filtered token sequence: NFKC fold, lowercase,
/// alphanumeric runs only, minimum-length and optional stopword filters.
/// Pure; the same input always yields the same output.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    remove_stopwords: bool,
    min_token_length: usize,
}

impl Tokenizer {
    pub fn new(remove_stopwords: bool, min_token_length: usize) -> Self {
        Self { remove_stopwords, min_token_length }
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized = text.nfkc().collect::<String>().to_lowercase();
        let mut tokens = Vec::new();
        for mat in TOKEN_RE.find_iter(&normalized) {
            let token = mat.as_str();
            if token.chars().count() < self.min_token_length {
                continue;
            }
            if self.remove_stopwords && is_stopword(token) {
                continue;
            }
            tokens.push(token.to_string());
        }
        tokens
    }
}
