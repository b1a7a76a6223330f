use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

fn default_settings() -> Value {
    json!({
        "text_preprocessing": {
            "remove_stopwords": true,
            "min_token_length": 3,
        },
        "search": {
            "max_results": 10,
            "min_similarity_score": 0.01,
            "preview_length": 200,
        },
        "storage": {
            "documents_path": "documents",
        },
    })
}

/// Immutable settings tree with dotted-key-path lookup. Constructed once
/// and handed to components by their constructors; nothing reads it through
/// global state.
#[derive(Debug, Clone)]
pub struct Settings {
    root: Value,
}

impl Default for Settings {
    fn default() -> Self {
        Self { root: default_settings() }
    }
}

impl Settings {
    /// Loads a JSON settings file and deep-merges it over the defaults, so
    /// a file only needs to name the keys it overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read settings file {}", path.display()))?;
        let overlay: Value = serde_json::from_str(&raw)
            .with_context(|| format!("parse settings file {}", path.display()))?;
        Ok(Self::from_value(overlay))
    }

    pub fn from_value(overlay: Value) -> Self {
        let mut root = default_settings();
        deep_merge(&mut root, overlay);
        Self { root }
    }

    fn lookup(&self, key_path: &str) -> Option<&Value> {
        let mut value = &self.root;
        for key in key_path.split('.') {
            value = value.get(key)?;
        }
        Some(value)
    }

    pub fn get_bool(&self, key_path: &str, default: bool) -> bool {
        self.lookup(key_path).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn get_u64(&self, key_path: &str, default: u64) -> u64 {
        self.lookup(key_path).and_then(Value::as_u64).unwrap_or(default)
    }

    pub fn get_f64(&self, key_path: &str, default: f64) -> f64 {
        self.lookup(key_path).and_then(Value::as_f64).unwrap_or(default)
    }

    pub fn get_str(&self, key_path: &str, default: &str) -> String {
        self.lookup(key_path)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    }
}

fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(slot) if slot.is_object() && value.is_object() => {
                        deep_merge(slot, value);
                    }
                    _ => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Typed view of the settings the search engine consumes.
#[derive(Debug, Clone, Serialize)]
pub struct SearchConfig {
    pub remove_stopwords: bool,
    pub min_token_length: usize,
    pub max_results: usize,
    pub min_similarity_score: f64,
    pub preview_length: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl SearchConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            remove_stopwords: settings.get_bool("text_preprocessing.remove_stopwords", true),
            min_token_length: settings.get_u64("text_preprocessing.min_token_length", 3) as usize,
            max_results: settings.get_u64("search.max_results", 10) as usize,
            min_similarity_score: settings.get_f64("search.min_similarity_score", 0.01),
            preview_length: settings.get_u64("search.preview_length", 200) as usize,
        }
    }
}
