use rummage::config::SearchConfig;
use rummage::store::{DocumentStore, FileStore};
use rummage::SearchEngine;
use tempfile::tempdir;

#[test]
fn documents_survive_a_reopen() {
    let dir = tempdir().unwrap();

    {
        let mut store = FileStore::open(dir.path()).unwrap();
        store.add_document("d1", "persistent machine learning notes").unwrap();
        store.add_document("d2", "cooking recipes").unwrap();
    }

    let store = FileStore::open(dir.path()).unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(
        store.get_document_content("d1").as_deref(),
        Some("persistent machine learning notes")
    );

    let listing = store.list_documents();
    assert_eq!(listing.len(), 2);
    assert!(listing.iter().all(|info| !info.added_at.is_empty()));
}

#[test]
fn removal_deletes_the_document_file() {
    let dir = tempdir().unwrap();
    let mut store = FileStore::open(dir.path()).unwrap();
    store.add_document("d1", "to be removed").unwrap();
    assert!(dir.path().join("d1.txt").exists());

    assert!(store.remove_document("d1").unwrap());
    assert!(!dir.path().join("d1.txt").exists());
    assert!(!store.remove_document("d1").unwrap());

    let reopened = FileStore::open(dir.path()).unwrap();
    assert_eq!(reopened.len(), 0);
}

#[test]
fn missing_document_files_are_skipped_on_open() {
    let dir = tempdir().unwrap();
    {
        let mut store = FileStore::open(dir.path()).unwrap();
        store.add_document("d1", "kept").unwrap();
        store.add_document("d2", "lost").unwrap();
    }
    std::fs::remove_file(dir.path().join("d2.txt")).unwrap();

    let store = FileStore::open(dir.path()).unwrap();
    assert_eq!(store.len(), 1);
    assert!(store.get_document_content("d2").is_none());
}

#[test]
fn engine_searches_a_file_backed_store() {
    let dir = tempdir().unwrap();
    {
        let mut store = FileStore::open(dir.path()).unwrap();
        store.add_document("notes", "rust systems programming notes").unwrap();
        store.add_document("menu", "cooking recipes collection").unwrap();
    }

    // a fresh engine picks the documents up from disk
    let store = FileStore::open(dir.path()).unwrap();
    let mut engine = SearchEngine::new(SearchConfig::default(), store);
    let response = engine.search("programming");
    assert_eq!(response.total_results, 1);
    assert_eq!(response.results[0].doc_id, "notes");
}
