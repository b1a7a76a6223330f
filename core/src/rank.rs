use crate::DocId;
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    pub doc_id: DocId,
    pub similarity_score: f64,
    pub rank: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingStats {
    pub total_candidates: usize,
    pub above_threshold: usize,
    pub avg_similarity: f64,
    pub max_similarity: f64,
    pub min_similarity: f64,
}

/// Filters, sorts and truncates scored candidates into a presentation-ready
/// result list. Ordering is the explicit key (score descending, doc id
/// ascending) so equal scores rank reproducibly.
pub struct Ranker {
    max_results: usize,
    min_similarity_score: f64,
    preview_length: usize,
}

impl Ranker {
    pub fn new(max_results: usize, min_similarity_score: f64, preview_length: usize) -> Self {
        Self { max_results, min_similarity_score, preview_length }
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    pub fn min_similarity_score(&self) -> f64 {
        self.min_similarity_score
    }

    /// The threshold is inclusive: entries with score exactly at
    /// `min_similarity_score` survive. Ranks are 1-based positions in the
    /// final truncated list. When a content lookup is supplied, each result
    /// carries a preview of the document.
    pub fn rank<F>(&self, scored: &[(DocId, f64)], content_lookup: Option<F>) -> Vec<RankedResult>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut kept: Vec<&(DocId, f64)> = scored
            .iter()
            .filter(|(_, score)| *score >= self.min_similarity_score)
            .collect();
        kept.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        kept.into_iter()
            .take(self.max_results)
            .enumerate()
            .map(|(position, (doc_id, score))| {
                let preview = content_lookup
                    .as_ref()
                    .and_then(|lookup| lookup(doc_id))
                    .map(|content| self.preview(&content));
                RankedResult {
                    doc_id: doc_id.clone(),
                    similarity_score: round4(*score),
                    rank: position + 1,
                    preview,
                }
            })
            .collect()
    }

    /// Truncates content to the preview length, cutting at the last word
    /// boundary when one falls past 80% of the limit, with an ellipsis
    /// appended whenever anything was cut.
    fn preview(&self, content: &str) -> String {
        if content.chars().count() <= self.preview_length {
            return content.to_string();
        }

        let truncated: String = content.chars().take(self.preview_length).collect();
        let boundary = self.preview_length * 4 / 5;
        let cut = match truncated.rfind(' ') {
            Some(last_space) if truncated[..last_space].chars().count() > boundary => {
                &truncated[..last_space]
            }
            _ => truncated.as_str(),
        };
        format!("{cut}...")
    }

    pub fn ranking_stats(&self, scored: &[(DocId, f64)]) -> RankingStats {
        if scored.is_empty() {
            return RankingStats {
                total_candidates: 0,
                above_threshold: 0,
                avg_similarity: 0.0,
                max_similarity: 0.0,
                min_similarity: 0.0,
            };
        }

        let scores: Vec<f64> = scored.iter().map(|(_, score)| *score).collect();
        RankingStats {
            total_candidates: scored.len(),
            above_threshold: scores.iter().filter(|s| **s >= self.min_similarity_score).count(),
            avg_similarity: scores.iter().sum::<f64>() / scores.len() as f64,
            max_similarity: scores.iter().copied().fold(f64::MIN, f64::max),
            min_similarity: scores.iter().copied().fold(f64::MAX, f64::min),
        }
    }
}

fn round4(score: f64) -> f64 {
    (score * 10_000.0).round() / 10_000.0
}
