pub mod config;
pub mod engine;
pub mod index;
pub mod query;
pub mod rank;
pub mod similarity;
pub mod store;
pub mod tokenizer;

/// Externally supplied document identifier.
pub type DocId = String;
/// Stable integer id assigned to a term on first sighting; never reused.
pub type TermId = u32;

pub use config::{SearchConfig, Settings};
pub use engine::{SearchEngine, SearchResponse};
pub use index::{BuiltIndex, SparseVector, TfIdfIndex};
pub use query::{QueryInfo, QueryProcessor};
pub use rank::{RankedResult, Ranker};
pub use store::{DocumentStore, FileStore, MemoryStore};
pub use tokenizer::Tokenizer;
