use crate::DocId;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub filename: String,
    pub size: usize,
    pub added_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentInfo {
    pub doc_id: DocId,
    pub content_length: usize,
    pub filename: String,
    pub added_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StorageStats {
    pub total_documents: usize,
    pub total_size_chars: usize,
    pub avg_document_size: f64,
}

/// Narrow storage interface the search engine consumes. The engine never
/// reads or writes files itself; persistence is entirely the store's
/// concern.
pub trait DocumentStore {
    fn add_document(&mut self, doc_id: &str, content: &str) -> Result<()>;
    fn remove_document(&mut self, doc_id: &str) -> Result<bool>;
    fn get_document_content(&self, doc_id: &str) -> Option<String>;
    fn get_all_documents(&self) -> BTreeMap<DocId, String>;
    fn list_documents(&self) -> Vec<DocumentInfo>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn storage_stats(&self) -> StorageStats {
        let documents = self.get_all_documents();
        let total_size_chars: usize = documents.values().map(|c| c.chars().count()).sum();
        StorageStats {
            total_documents: documents.len(),
            total_size_chars,
            avg_document_size: total_size_chars as f64 / documents.len().max(1) as f64,
        }
    }
}

fn timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "".into())
}

/// In-memory store for tests and embedded use.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: BTreeMap<DocId, String>,
    metadata: BTreeMap<DocId, DocumentMeta>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn add_document(&mut self, doc_id: &str, content: &str) -> Result<()> {
        self.metadata.insert(
            doc_id.to_string(),
            DocumentMeta {
                filename: format!("{doc_id}.txt"),
                size: content.chars().count(),
                added_at: timestamp(),
            },
        );
        self.documents.insert(doc_id.to_string(), content.to_string());
        Ok(())
    }

    fn remove_document(&mut self, doc_id: &str) -> Result<bool> {
        self.metadata.remove(doc_id);
        Ok(self.documents.remove(doc_id).is_some())
    }

    fn get_document_content(&self, doc_id: &str) -> Option<String> {
        self.documents.get(doc_id).cloned()
    }

    fn get_all_documents(&self) -> BTreeMap<DocId, String> {
        self.documents.clone()
    }

    fn list_documents(&self) -> Vec<DocumentInfo> {
        self.documents
            .iter()
            .map(|(doc_id, content)| {
                let meta = self.metadata.get(doc_id);
                DocumentInfo {
                    doc_id: doc_id.clone(),
                    content_length: content.chars().count(),
                    filename: meta.map(|m| m.filename.clone()).unwrap_or_default(),
                    added_at: meta.map(|m| m.added_at.clone()).unwrap_or_default(),
                }
            })
            .collect()
    }

    fn len(&self) -> usize {
        self.documents.len()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct IndexFile {
    metadata: BTreeMap<DocId, DocumentMeta>,
    #[serde(default)]
    last_updated: String,
}

/// File-backed store: one `.txt` file per document plus an `index.json`
/// metadata file in the root directory. Contents are mirrored in memory;
/// every mutation rewrites the metadata index.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    documents: BTreeMap<DocId, String>,
    metadata: BTreeMap<DocId, DocumentMeta>,
}

impl FileStore {
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)
            .with_context(|| format!("create store directory {}", root.display()))?;

        let mut store = Self {
            root,
            documents: BTreeMap::new(),
            metadata: BTreeMap::new(),
        };
        store.load_index()?;
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn index_path(&self) -> PathBuf {
        self.root.join("index.json")
    }

    fn document_path(&self, doc_id: &str) -> PathBuf {
        self.root.join(format!("{doc_id}.txt"))
    }

    fn load_index(&mut self) -> Result<()> {
        let index_path = self.index_path();
        if !index_path.exists() {
            return Ok(());
        }

        let raw = fs::read_to_string(&index_path)
            .with_context(|| format!("read store index {}", index_path.display()))?;
        let index: IndexFile = serde_json::from_str(&raw)
            .with_context(|| format!("parse store index {}", index_path.display()))?;

        for (doc_id, meta) in index.metadata {
            let path = self.document_path(&doc_id);
            if !path.exists() {
                tracing::debug!(doc_id, "indexed document file missing, skipping");
                continue;
            }
            let content = fs::read_to_string(&path)
                .with_context(|| format!("read document {}", path.display()))?;
            self.documents.insert(doc_id.clone(), content);
            self.metadata.insert(doc_id, meta);
        }
        Ok(())
    }

    fn save_index(&self) -> Result<()> {
        let index = IndexFile {
            metadata: self.metadata.clone(),
            last_updated: timestamp(),
        };
        let json = serde_json::to_string_pretty(&index)?;
        fs::write(self.index_path(), json)
            .with_context(|| format!("write store index {}", self.index_path().display()))?;
        Ok(())
    }
}

impl DocumentStore for FileStore {
    fn add_document(&mut self, doc_id: &str, content: &str) -> Result<()> {
        let path = self.document_path(doc_id);
        fs::write(&path, content)
            .with_context(|| format!("write document {}", path.display()))?;

        self.metadata.insert(
            doc_id.to_string(),
            DocumentMeta {
                filename: format!("{doc_id}.txt"),
                size: content.chars().count(),
                added_at: timestamp(),
            },
        );
        self.documents.insert(doc_id.to_string(), content.to_string());
        self.save_index()
    }

    fn remove_document(&mut self, doc_id: &str) -> Result<bool> {
        if self.documents.remove(doc_id).is_none() {
            return Ok(false);
        }
        self.metadata.remove(doc_id);

        let path = self.document_path(doc_id);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("remove document {}", path.display()))?;
        }
        self.save_index()?;
        Ok(true)
    }

    fn get_document_content(&self, doc_id: &str) -> Option<String> {
        self.documents.get(doc_id).cloned()
    }

    fn get_all_documents(&self) -> BTreeMap<DocId, String> {
        self.documents.clone()
    }

    fn list_documents(&self) -> Vec<DocumentInfo> {
        self.documents
            .iter()
            .map(|(doc_id, content)| {
                let meta = self.metadata.get(doc_id);
                DocumentInfo {
                    doc_id: doc_id.clone(),
                    content_length: content.chars().count(),
                    filename: meta.map(|m| m.filename.clone()).unwrap_or_default(),
                    added_at: meta.map(|m| m.added_at.clone()).unwrap_or_default(),
                }
            })
            .collect()
    }

    fn len(&self) -> usize {
        self.documents.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips_documents() {
        let mut store = MemoryStore::new();
        store.add_document("d1", "first document").unwrap();
        store.add_document("d2", "second document").unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get_document_content("d1").as_deref(), Some("first document"));
        assert!(store.get_document_content("missing").is_none());

        assert!(store.remove_document("d1").unwrap());
        assert!(!store.remove_document("d1").unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn memory_store_lists_metadata() {
        let mut store = MemoryStore::new();
        store.add_document("d1", "hello world").unwrap();
        let listing = store.list_documents();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].doc_id, "d1");
        assert_eq!(listing[0].content_length, 11);
        assert_eq!(listing[0].filename, "d1.txt");
    }

    #[test]
    fn storage_stats_average_over_documents() {
        let mut store = MemoryStore::new();
        store.add_document("d1", "abcd").unwrap();
        store.add_document("d2", "ab").unwrap();
        let stats = store.storage_stats();
        assert_eq!(stats.total_documents, 2);
        assert_eq!(stats.total_size_chars, 6);
        assert!((stats.avg_document_size - 3.0).abs() < 1e-12);
    }
}
