//! Lexical relevance scoring
//!
//! Relevance is query term coverage: the fraction of distinct query terms
//! that also appear in a text.
//!
//! ```text
//! relevance = answer_weight * coverage(answer) + source_weight * max(coverage(source_i))
//! ```

use crate::ScoringConfig;
use quarry_domain::ToolResult;
use std::collections::HashSet;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "do", "does", "for", "from", "how", "in",
    "is", "it", "of", "on", "or", "that", "the", "this", "to", "was", "what", "when", "where",
    "which", "who", "why", "with",
];

/// Relevance of one answer and which sources contributed to it
#[derive(Debug, Clone, PartialEq)]
pub struct RelevanceScore {
    /// Blended relevance in [0.0, 1.0]
    pub relevance: f64,

    /// Query coverage by the answer
    pub answer_coverage: f64,

    /// Per-source contribution flags, in tool result order
    pub contributions: Vec<bool>,
}

/// Scores answers against their query
#[derive(Debug, Clone, Default)]
pub struct RelevanceScorer {
    config: ScoringConfig,
}

impl RelevanceScorer {
    /// Create a scorer
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Score an answer and its tool results
    ///
    /// A query with no content terms scores 0.0.
    pub fn score(&self, query: &str, answer: &str, tool_results: &[(String, ToolResult)]) -> RelevanceScore {
        let query_terms = terms(query);
        let answer_coverage = coverage(&query_terms, answer);
        let source_coverage: Vec<f64> = tool_results
            .iter()
            .map(|(_, result)| coverage(&query_terms, &result.content))
            .collect();
        let best_source = source_coverage.iter().copied().fold(0.0, f64::max);

        let relevance = (self.config.answer_weight * answer_coverage
            + self.config.source_weight * best_source)
            .clamp(0.0, 1.0);

        let high = relevance >= self.config.high_relevance;
        let contributions = source_coverage
            .iter()
            .map(|c| high && *c >= self.config.min_contribution)
            .collect();

        RelevanceScore {
            relevance,
            answer_coverage,
            contributions,
        }
    }
}

/// Distinct lowercase content terms of `text`
pub fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect()
}

fn coverage(query_terms: &HashSet<String>, text: &str) -> f64 {
    if query_terms.is_empty() {
        return 0.0;
    }
    let text_terms = terms(text);
    let hits = query_terms.iter().filter(|t| text_terms.contains(*t)).count();
    hits as f64 / query_terms.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(content: &str) -> (String, ToolResult) {
        (
            "src".to_string(),
            ToolResult {
                content: content.to_string(),
                latency_ms: 1,
            },
        )
    }

    #[test]
    fn test_terms_drop_stopwords_and_case() {
        let t = terms("What is the Rust borrow-checker?");
        assert_eq!(t.len(), 3);
        assert!(t.contains("rust"));
        assert!(t.contains("borrow"));
        assert!(t.contains("checker"));
    }

    #[test]
    fn test_full_coverage() {
        let scorer = RelevanceScorer::default();
        let score = scorer.score(
            "rust async runtime",
            "Tokio is an async runtime for Rust",
            &[result("rust async runtime tokio")],
        );
        assert!((score.relevance - 1.0).abs() < 1e-9);
        assert_eq!(score.contributions, vec![true]);
    }

    #[test]
    fn test_no_coverage() {
        let scorer = RelevanceScorer::default();
        let score = scorer.score("rust async runtime", "I don't know", &[result("weather today")]);
        assert_eq!(score.relevance, 0.0);
        assert_eq!(score.contributions, vec![false]);
    }

    #[test]
    fn test_partial_coverage_blend() {
        let scorer = RelevanceScorer::default();
        // Answer covers 1/2, best source covers 2/2
        let score = scorer.score("rust ownership", "Rust is fast", &[result("ownership in rust")]);
        assert!((score.answer_coverage - 0.5).abs() < 1e-9);
        assert!((score.relevance - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_contribution_requires_high_relevance() {
        let scorer = RelevanceScorer::default();
        let score = scorer.score(
            "rust ownership model",
            "Rust",
            &[result("rust"), result("nothing relevant")],
        );
        assert!(score.relevance < 0.7);
        assert_eq!(score.contributions, vec![false, false]);
    }

    #[test]
    fn test_only_covering_sources_contribute() {
        let scorer = RelevanceScorer::default();
        let score = scorer.score(
            "rust ownership",
            "Rust ownership explained",
            &[result("rust ownership rules"), result("unrelated text")],
        );
        assert_eq!(score.contributions, vec![true, false]);
    }

    #[test]
    fn test_stopword_only_query() {
        let scorer = RelevanceScorer::default();
        let score = scorer.score("what is the", "anything", &[]);
        assert_eq!(score.relevance, 0.0);
        assert!(score.contributions.is_empty());
    }
}
