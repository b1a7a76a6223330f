use crate::config::SearchConfig;
use crate::index::{IndexStatistics, TfIdfIndex};
use crate::query::{QueryInfo, QueryProcessor};
use crate::rank::{RankedResult, Ranker};
use crate::similarity;
use crate::store::{DocumentInfo, DocumentStore, StorageStats};
use crate::tokenizer::Tokenizer;
use crate::DocId;
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub results: Vec<RankedResult>,
    pub total_results: usize,
    pub total_candidates: usize,
    pub query_info: QueryInfo,
    pub search_time_secs: f64,
}

impl SearchResponse {
    fn empty(query_info: QueryInfo) -> Self {
        Self {
            results: Vec::new(),
            total_results: 0,
            total_candidates: 0,
            query_info,
            search_time_secs: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchStats {
    pub total_searches: usize,
    pub total_search_time_secs: f64,
    pub average_search_time_secs: f64,
    pub last_search_time_secs: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EngineStatistics {
    pub index: IndexStatistics,
    pub storage: StorageStats,
    pub searches: SearchStats,
    pub configuration: SearchConfig,
}

/// Facade wiring tokenizer, query processor, index, scorer, ranker and the
/// document store into one search engine.
pub struct SearchEngine<S: DocumentStore> {
    config: SearchConfig,
    tokenizer: Tokenizer,
    query_processor: QueryProcessor,
    index: TfIdfIndex,
    ranker: Ranker,
    store: S,
    stats: SearchStats,
}

impl<S: DocumentStore> SearchEngine<S> {
    /// Ingests whatever the store already holds and builds the index.
    pub fn new(config: SearchConfig, store: S) -> Self {
        let tokenizer = Tokenizer::new(config.remove_stopwords, config.min_token_length);
        let query_processor = QueryProcessor::new(tokenizer.clone());
        let ranker = Ranker::new(
            config.max_results,
            config.min_similarity_score,
            config.preview_length,
        );
        let mut engine = Self {
            config,
            tokenizer,
            query_processor,
            index: TfIdfIndex::new(),
            ranker,
            store,
            stats: SearchStats::default(),
        };

        let existing = engine.store.get_all_documents();
        if !existing.is_empty() {
            for (doc_id, content) in &existing {
                let tokens = engine.tokenizer.tokenize(content);
                engine.index.ingest(doc_id, &tokens);
            }
            engine.build_index();
        }
        engine
    }

    /// Adds documents to the store and the index. The index only serves the
    /// new documents after the next [`build_index`](Self::build_index).
    pub fn add_documents(&mut self, documents: BTreeMap<DocId, String>) -> Result<()> {
        for (doc_id, content) in &documents {
            self.store.add_document(doc_id, content)?;
            let tokens = self.tokenizer.tokenize(content);
            self.index.ingest(doc_id, &tokens);
        }
        tracing::info!(added = documents.len(), total = self.store.len(), "documents added");
        Ok(())
    }

    pub fn build_index(&self) {
        let start = Instant::now();
        let built = self.index.build();
        tracing::info!(
            total_documents = built.total_documents(),
            vocabulary_size = self.index.vocabulary_size(),
            elapsed_secs = start.elapsed().as_secs_f64(),
            "index built"
        );
    }

    /// Runs the full query pipeline. Never panics and never returns an
    /// error: empty and invalid queries, vocabulary misses, candidate-less
    /// queries and internal failures all come back as a structured response
    /// whose `query_info` explains the outcome.
    pub fn search(&mut self, query: &str) -> SearchResponse {
        let start = Instant::now();
        let mut response = match self.search_inner(query) {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(query, %error, "search failed");
                SearchResponse::empty(QueryInfo {
                    error: Some(format!("search failed: {error:#}")),
                    ..QueryInfo::default()
                })
            }
        };
        response.search_time_secs = start.elapsed().as_secs_f64();
        self.record_search(response.search_time_secs);
        response
    }

    fn search_inner(&self, raw_query: &str) -> Result<SearchResponse> {
        let terms = self.query_processor.process(raw_query);
        if !self.query_processor.validate(&terms) {
            let mut query_info = self.query_processor.query_info(&terms);
            query_info.error = Some("invalid or empty query".into());
            return Ok(SearchResponse::empty(query_info));
        }

        let snapshot = self.index.snapshot();
        if snapshot.total_documents() == 0 {
            let mut query_info = self.query_processor.query_info(&terms);
            query_info.message = Some("no documents have been indexed".into());
            return Ok(SearchResponse::empty(query_info));
        }

        let query_vector = snapshot.query_vector(&terms);
        if query_vector.is_empty() {
            let mut query_info = self.query_processor.query_info(&terms);
            query_info.error = Some("no query terms found in the vocabulary".into());
            return Ok(SearchResponse::empty(query_info));
        }

        let candidates = snapshot.candidates(&terms);
        if candidates.is_empty() {
            let mut query_info = self.query_processor.query_info(&terms);
            query_info.message = Some("no documents contain the query terms".into());
            return Ok(SearchResponse::empty(query_info));
        }

        let scored = similarity::score_all(&query_vector, &candidates, &snapshot);
        let results = self
            .ranker
            .rank(&scored, Some(|doc_id: &str| self.store.get_document_content(doc_id)));

        let mut query_info = self.query_processor.query_info(&terms);
        if results.is_empty() {
            query_info.message = Some("no candidates scored above the similarity threshold".into());
        }
        tracing::debug!(
            query = raw_query,
            candidates = candidates.len(),
            results = results.len(),
            "search complete"
        );

        Ok(SearchResponse {
            total_results: results.len(),
            total_candidates: candidates.len(),
            results,
            query_info,
            search_time_secs: 0.0,
        })
    }

    /// Removes a document from the store, then destructively re-indexes the
    /// remaining corpus. Blocking and non-cancelable; full-rebuild cost is
    /// the documented price of consistency.
    pub fn remove_document(&mut self, doc_id: &str) -> Result<bool> {
        if !self.store.remove_document(doc_id)? {
            return Ok(false);
        }

        self.index = TfIdfIndex::new();
        let remaining = self.store.get_all_documents();
        for (doc_id, content) in &remaining {
            let tokens = self.tokenizer.tokenize(content);
            self.index.ingest(doc_id, &tokens);
        }
        self.build_index();
        tracing::info!(doc_id, remaining = remaining.len(), "document removed, index rebuilt");
        Ok(true)
    }

    pub fn get_statistics(&self) -> EngineStatistics {
        EngineStatistics {
            index: self.index.statistics(),
            storage: self.store.storage_stats(),
            searches: self.stats.clone(),
            configuration: self.config.clone(),
        }
    }

    pub fn list_documents(&self) -> Vec<DocumentInfo> {
        self.store.list_documents()
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    fn record_search(&mut self, elapsed_secs: f64) {
        self.stats.total_searches += 1;
        self.stats.total_search_time_secs += elapsed_secs;
        self.stats.last_search_time_secs = elapsed_secs;
        self.stats.average_search_time_secs =
            self.stats.total_search_time_secs / self.stats.total_searches as f64;
    }
}
