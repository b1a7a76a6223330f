use crate::index::{BuiltIndex, SparseVector};
use crate::DocId;
use std::collections::BTreeSet;

/// Cosine similarity between a query vector and a document vector with a
/// precomputed norm. Returns 0.0 for empty vectors, a zero norm, or zero
/// term overlap; never an error. Bounded in [0, 1] for non-negative input.
pub fn score(query: &SparseVector, document: &SparseVector, document_norm: f64) -> f64 {
    if query.is_empty() || document.is_empty() || document_norm == 0.0 {
        return 0.0;
    }

    // Iterate the smaller map; only shared terms contribute.
    let (smaller, larger) = if query.len() <= document.len() {
        (query, document)
    } else {
        (document, query)
    };
    let mut dot_product = 0.0;
    for (term_id, weight) in smaller {
        if let Some(other) = larger.get(term_id) {
            dot_product += weight * other;
        }
    }
    if dot_product == 0.0 {
        return 0.0;
    }

    // One query is scored against many documents, so the query norm is
    // computed on the fly rather than cached.
    let query_norm = query.values().map(|w| w * w).sum::<f64>().sqrt();
    if query_norm == 0.0 {
        return 0.0;
    }

    dot_product / (query_norm * document_norm)
}

/// Scores every candidate against the query, in ascending doc-id order.
/// Documents with zero similarity are omitted, not returned as zeros.
pub fn score_all(
    query: &SparseVector,
    candidates: &BTreeSet<DocId>,
    index: &BuiltIndex,
) -> Vec<(DocId, f64)> {
    let mut scored = Vec::new();
    for doc_id in candidates {
        if let Some(vector) = index.vector(doc_id) {
            let similarity = score(query, vector, index.norm(doc_id));
            if similarity > 0.0 {
                scored.push((doc_id.clone(), similarity));
            }
        }
    }
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TfIdfIndex;

    fn vector(entries: &[(u32, f64)]) -> SparseVector {
        entries.iter().copied().collect()
    }

    fn norm(v: &SparseVector) -> f64 {
        v.values().map(|w| w * w).sum::<f64>().sqrt()
    }

    #[test]
    fn identical_vectors_score_one() {
        let v = vector(&[(0, 0.4), (1, 0.3), (2, 0.1)]);
        let s = score(&v, &v, norm(&v));
        assert!((s - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_inputs_score_zero() {
        let v = vector(&[(0, 0.5)]);
        assert_eq!(score(&SparseVector::new(), &v, norm(&v)), 0.0);
        assert_eq!(score(&v, &SparseVector::new(), 0.0), 0.0);
        assert_eq!(score(&v, &v, 0.0), 0.0);
    }

    #[test]
    fn disjoint_vectors_score_zero() {
        let q = vector(&[(0, 0.5), (1, 0.2)]);
        let d = vector(&[(2, 0.7), (3, 0.4)]);
        assert_eq!(score(&q, &d, norm(&d)), 0.0);
    }

    #[test]
    fn bounded_in_unit_interval() {
        let q = vector(&[(0, 0.9), (1, 0.1)]);
        let d = vector(&[(0, 0.2), (2, 0.8)]);
        let s = score(&q, &d, norm(&d));
        assert!(s > 0.0 && s <= 1.0);
    }

    #[test]
    fn score_all_omits_zero_overlap_documents() {
        let mut index = TfIdfIndex::new();
        let toks = |words: &[&str]| words.iter().map(|w| w.to_string()).collect::<Vec<_>>();
        index.ingest("d1", &toks(&["machine", "learning"]));
        index.ingest("d2", &toks(&["cooking", "recipes"]));
        let built = index.build();

        let query = built.query_vector(&toks(&["machine"]));
        let candidates = ["d1".to_string(), "d2".to_string()].into_iter().collect();
        let scored = score_all(&query, &candidates, &built);
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].0, "d1");
    }

    #[test]
    fn score_all_is_deterministic() {
        let mut index = TfIdfIndex::new();
        let toks = |words: &[&str]| words.iter().map(|w| w.to_string()).collect::<Vec<_>>();
        index.ingest("d1", &toks(&["shared", "alpha"]));
        index.ingest("d2", &toks(&["shared", "beta"]));
        index.ingest("d3", &toks(&["shared", "gamma"]));
        let built = index.build();

        let query = built.query_vector(&toks(&["shared"]));
        let candidates = built.candidates(&toks(&["shared"]));
        assert_eq!(
            score_all(&query, &candidates, &built),
            score_all(&query, &candidates, &built)
        );
    }
}
