use crate::{DocId, TermId};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

/// Sparse TF-IDF vector keyed by stable term id; absent terms are omitted.
/// Ordered so that norm and dot-product accumulation never depend on hash
/// iteration order.
pub type SparseVector = BTreeMap<TermId, f64>;

#[derive(Debug, Clone, Serialize)]
pub struct IndexStatistics {
    pub total_documents: usize,
    pub vocabulary_size: usize,
    pub average_document_length: f64,
}

/// Immutable, fully consistent product of one `build()` call. The whole
/// query path (vectorization, candidate lookup, scoring) works against a
/// single snapshot, so a concurrent rebuild is never observed half-done.
#[derive(Debug, Default)]
pub struct BuiltIndex {
    vocabulary: HashMap<String, TermId>,
    postings: HashMap<TermId, BTreeSet<DocId>>,
    document_frequencies: HashMap<TermId, u32>,
    vectors: HashMap<DocId, SparseVector>,
    norms: HashMap<DocId, f64>,
    total_documents: usize,
}

impl BuiltIndex {
    pub fn total_documents(&self) -> usize {
        self.total_documents
    }

    pub fn vector(&self, doc_id: &str) -> Option<&SparseVector> {
        self.vectors.get(doc_id)
    }

    pub fn norm(&self, doc_id: &str) -> f64 {
        self.norms.get(doc_id).copied().unwrap_or(0.0)
    }

    /// Union of the posting sets of every query term known to this build.
    /// Unknown terms contribute nothing; they are not an error.
    pub fn candidates(&self, query_terms: &[String]) -> BTreeSet<DocId> {
        let mut candidates = BTreeSet::new();
        for term in query_terms {
            if let Some(term_id) = self.vocabulary.get(term) {
                if let Some(docs) = self.postings.get(term_id) {
                    candidates.extend(docs.iter().cloned());
                }
            }
        }
        candidates
    }

    /// TF-IDF vector for a query. Term frequency is taken over the query's
    /// full length (dropped terms still count toward it); IDF comes from
    /// this build's document frequencies. Terms absent from the vocabulary
    /// are silently dropped; an empty query yields an empty map.
    pub fn query_vector(&self, query_terms: &[String]) -> SparseVector {
        if query_terms.is_empty() || self.total_documents == 0 {
            return SparseVector::new();
        }

        let mut counts: HashMap<TermId, u32> = HashMap::new();
        for term in query_terms {
            if let Some(&term_id) = self.vocabulary.get(term) {
                if self.document_frequencies.contains_key(&term_id) {
                    *counts.entry(term_id).or_insert(0) += 1;
                }
            }
        }

        let query_length = query_terms.len() as f64;
        let n = self.total_documents as f64;
        let mut vector = SparseVector::new();
        for (term_id, count) in counts {
            let df = self.document_frequencies.get(&term_id).copied().unwrap_or(1).max(1);
            let tf = count as f64 / query_length;
            let idf = (n / df as f64).ln();
            vector.insert(term_id, tf * idf);
        }
        vector
    }
}

/// Owns the mutable ingest state (vocabulary, inverted index, per-document
/// token sequences) and publishes query-ready [`BuiltIndex`] snapshots.
///
/// Vocabulary ids are assigned monotonically on first sighting and never
/// reused; the vocabulary never shrinks, even when every document that used
/// a term has been re-ingested without it.
pub struct TfIdfIndex {
    vocabulary: HashMap<String, TermId>,
    inverted: HashMap<TermId, BTreeSet<DocId>>,
    documents: HashMap<DocId, Vec<TermId>>,
    snapshot: RwLock<Arc<BuiltIndex>>,
}

impl Default for TfIdfIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl TfIdfIndex {
    pub fn new() -> Self {
        Self {
            vocabulary: HashMap::new(),
            inverted: HashMap::new(),
            documents: HashMap::new(),
            snapshot: RwLock::new(Arc::new(BuiltIndex::default())),
        }
    }

    /// Registers a document's token sequence. Re-ingesting an existing
    /// doc_id retracts its previous posting entries before inserting the
    /// new ones, so the inverted index never carries rows for tokens the
    /// current version of the document no longer contains.
    pub fn ingest(&mut self, doc_id: &str, tokens: &[String]) {
        if let Some(previous) = self.documents.remove(doc_id) {
            let distinct: BTreeSet<TermId> = previous.into_iter().collect();
            for term_id in distinct {
                if let Some(docs) = self.inverted.get_mut(&term_id) {
                    docs.remove(doc_id);
                }
            }
        }

        let mut term_ids = Vec::with_capacity(tokens.len());
        for token in tokens {
            let term_id = match self.vocabulary.get(token) {
                Some(&id) => id,
                None => {
                    let id = self.vocabulary.len() as TermId;
                    self.vocabulary.insert(token.clone(), id);
                    id
                }
            };
            self.inverted.entry(term_id).or_default().insert(doc_id.to_string());
            term_ids.push(term_id);
        }
        self.documents.insert(doc_id.to_string(), term_ids);
    }

    /// Recomputes document frequencies, TF-IDF vectors and L2 norms for the
    /// whole corpus and publishes them as a fresh snapshot in one swap.
    /// Deterministic for a given ingested corpus; N=0 publishes an empty
    /// snapshot.
    pub fn build(&self) -> Arc<BuiltIndex> {
        let total_documents = self.documents.len();

        let mut postings: HashMap<TermId, BTreeSet<DocId>> = HashMap::new();
        let mut document_frequencies: HashMap<TermId, u32> = HashMap::new();
        for (&term_id, docs) in &self.inverted {
            if docs.is_empty() {
                continue;
            }
            document_frequencies.insert(term_id, docs.len() as u32);
            postings.insert(term_id, docs.clone());
        }

        let mut vectors: HashMap<DocId, SparseVector> = HashMap::new();
        let mut norms: HashMap<DocId, f64> = HashMap::new();
        if total_documents > 0 {
            let n = total_documents as f64;
            for (doc_id, term_ids) in &self.documents {
                let doc_length = term_ids.len() as f64;
                let mut counts: HashMap<TermId, u32> = HashMap::new();
                for &term_id in term_ids {
                    *counts.entry(term_id).or_insert(0) += 1;
                }

                let mut vector = SparseVector::new();
                for (term_id, count) in counts {
                    let df = document_frequencies.get(&term_id).copied().unwrap_or(1).max(1);
                    let tf = count as f64 / doc_length;
                    let idf = (n / df as f64).ln();
                    vector.insert(term_id, tf * idf);
                }

                let norm = vector.values().map(|score| score * score).sum::<f64>().sqrt();
                norms.insert(doc_id.clone(), norm);
                vectors.insert(doc_id.clone(), vector);
            }
        }

        let built = Arc::new(BuiltIndex {
            vocabulary: self.vocabulary.clone(),
            postings,
            document_frequencies,
            vectors,
            norms,
            total_documents,
        });
        *self.snapshot.write() = Arc::clone(&built);
        tracing::debug!(
            total_documents,
            vocabulary_size = self.vocabulary.len(),
            "published index snapshot"
        );
        built
    }

    /// Current published snapshot. Between `ingest` and the next `build`
    /// this is the previous build's state.
    pub fn snapshot(&self) -> Arc<BuiltIndex> {
        Arc::clone(&self.snapshot.read())
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn statistics(&self) -> IndexStatistics {
        let total_documents = self.documents.len();
        let total_tokens: usize = self.documents.values().map(Vec::len).sum();
        IndexStatistics {
            total_documents,
            vocabulary_size: self.vocabulary.len(),
            average_document_length: total_tokens as f64 / total_documents.max(1) as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn vocabulary_ids_are_stable_and_monotonic() {
        let mut index = TfIdfIndex::new();
        index.ingest("d1", &tokens(&["alpha", "beta"]));
        index.ingest("d2", &tokens(&["beta", "gamma"]));
        assert_eq!(index.vocabulary_size(), 3);

        index.ingest("d1", &tokens(&["delta"]));
        // ids are never reclaimed, so the vocabulary only grows
        assert_eq!(index.vocabulary_size(), 4);
    }

    #[test]
    fn reingest_retracts_stale_postings() {
        let mut index = TfIdfIndex::new();
        index.ingest("d1", &tokens(&["alpha", "beta"]));
        index.ingest("d1", &tokens(&["gamma"]));
        let built = index.build();

        assert!(built.candidates(&tokens(&["beta"])).is_empty());
        let expected: BTreeSet<DocId> = ["d1".to_string()].into_iter().collect();
        assert_eq!(built.candidates(&tokens(&["gamma"])), expected);
    }

    #[test]
    fn candidates_union_posting_sets() {
        let mut index = TfIdfIndex::new();
        index.ingest("d1", &tokens(&["machine", "learning"]));
        index.ingest("d2", &tokens(&["deep", "learning"]));
        index.ingest("d3", &tokens(&["cooking"]));
        let built = index.build();

        let c = built.candidates(&tokens(&["machine", "learning", "unknown"]));
        let expected: BTreeSet<DocId> = ["d1".to_string(), "d2".to_string()].into_iter().collect();
        assert_eq!(c, expected);
    }

    #[test]
    fn query_vector_drops_unknown_terms() {
        let mut index = TfIdfIndex::new();
        index.ingest("d1", &tokens(&["machine", "learning"]));
        index.ingest("d2", &tokens(&["cooking"]));
        let built = index.build();

        let vector = built.query_vector(&tokens(&["machine", "quantum"]));
        assert_eq!(vector.len(), 1);
        assert!(built.query_vector(&[]).is_empty());
    }

    #[test]
    fn query_tf_counts_the_full_query_length() {
        let mut index = TfIdfIndex::new();
        index.ingest("d1", &tokens(&["machine"]));
        index.ingest("d2", &tokens(&["cooking"]));
        let built = index.build();

        // "machine unknown": tf(machine) = 1/2, idf = ln(2/1)
        let vector = built.query_vector(&tokens(&["machine", "unknown"]));
        let score = vector.values().next().copied().unwrap_or(0.0);
        assert!((score - 0.5 * (2.0f64).ln()).abs() < 1e-12);
    }

    #[test]
    fn build_is_idempotent() {
        let mut index = TfIdfIndex::new();
        index.ingest("d1", &tokens(&["machine", "learning", "algorithms"]));
        index.ingest("d2", &tokens(&["deep", "learning"]));

        let first = index.build();
        let second = index.build();
        for doc_id in ["d1", "d2"] {
            assert_eq!(first.vector(doc_id), second.vector(doc_id));
            assert_eq!(first.norm(doc_id), second.norm(doc_id));
        }
    }

    #[test]
    fn build_replaces_the_snapshot_atomically() {
        let mut index = TfIdfIndex::new();
        index.ingest("d1", &tokens(&["alpha"]));
        let before = index.build();

        index.ingest("d2", &tokens(&["beta"]));
        let after = index.build();

        // the old snapshot is still a consistent view of the old corpus
        assert_eq!(before.total_documents(), 1);
        assert_eq!(after.total_documents(), 2);
        assert_eq!(index.snapshot().total_documents(), 2);
    }

    #[test]
    fn empty_corpus_builds_an_empty_snapshot() {
        let index = TfIdfIndex::new();
        let built = index.build();
        assert_eq!(built.total_documents(), 0);
        assert!(built.candidates(&tokens(&["anything"])).is_empty());
        assert!(built.query_vector(&tokens(&["anything"])).is_empty());
    }

    #[test]
    fn statistics_track_the_live_corpus() {
        let mut index = TfIdfIndex::new();
        index.ingest("d1", &tokens(&["alpha", "beta"]));
        index.ingest("d2", &tokens(&["gamma", "delta", "epsilon", "zeta"]));
        let stats = index.statistics();
        assert_eq!(stats.total_documents, 2);
        assert_eq!(stats.vocabulary_size, 6);
        assert!((stats.average_document_length - 3.0).abs() < 1e-12);
    }
}
