//! In-process keyword recall — useful for testing and single-node sessions.
//!
//! Scores stored entries by term overlap with the query text, boosts
//! entries tagged with one of the identity's expertise domains, and renders
//! the winners as a bullet list. The rendered block is capped to a fraction
//! of the live allocator's remaining budget so retrieval cannot hand the
//! assembler a section that was doomed from the start.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kindred_core::error::MemoryError;
use kindred_core::memory::{MemoryService, RecallRequest, NO_CONTEXT_PLACEHOLDER};
use kindred_prompt::token;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// How much of the remaining budget recall may spend, at most.
const RECALL_BUDGET_SHARE: f64 = 0.25;

/// A single remembered fact about a user.
#[derive(Debug, Clone)]
pub struct MemoryEntry {
    pub id: String,
    pub content: String,
    /// Domain tags; entries matching a declared expertise domain score higher.
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl MemoryEntry {
    pub fn new(content: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            tags,
            created_at: Utc::now(),
        }
    }
}

/// An in-process recall service that stores entries per user.
#[derive(Default)]
pub struct KeywordRecall {
    entries: RwLock<Vec<(String, MemoryEntry)>>,
}

impl KeywordRecall {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an entry for `user_id`.
    pub async fn remember(&self, user_id: impl Into<String>, entry: MemoryEntry) {
        self.entries.write().await.push((user_id.into(), entry));
    }

    /// Term-overlap score of `content` against the lowercased query terms,
    /// with a flat boost when a tag matches a declared expertise domain.
    fn score(terms: &[String], entry: &MemoryEntry, domains: &[String]) -> f32 {
        let content = entry.content.to_lowercase();
        let overlap = terms.iter().filter(|t| content.contains(t.as_str())).count();
        if overlap == 0 {
            return 0.0;
        }

        let base = overlap as f32 / terms.len() as f32;
        let boosted = entry
            .tags
            .iter()
            .any(|tag| domains.iter().any(|d| d.eq_ignore_ascii_case(tag)));
        if boosted { base + 0.25 } else { base }
    }
}

#[async_trait]
impl MemoryService for KeywordRecall {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn retrieve(&self, request: RecallRequest<'_>) -> std::result::Result<String, MemoryError> {
        let terms: Vec<String> = request
            .query
            .text
            .to_lowercase()
            .split_whitespace()
            .filter(|t| t.len() > 2)
            .map(str::to_string)
            .collect();

        if terms.is_empty() {
            return Ok(NO_CONTEXT_PLACEHOLDER.to_string());
        }

        let entries = self.entries.read().await;
        let mut scored: Vec<(f32, &MemoryEntry)> = entries
            .iter()
            .filter(|(user, _)| user == request.user_id)
            .map(|(_, e)| (Self::score(&terms, e, request.expertise_domains), e))
            .filter(|(score, _)| *score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(request.query.limit);

        if scored.is_empty() {
            return Ok(NO_CONTEXT_PLACEHOLDER.to_string());
        }

        // Budget-constrain the rendered block using the live allocator.
        let char_cap = token::max_chars(
            (request.budget.remaining() as f64 * RECALL_BUDGET_SHARE) as usize,
        );

        let mut rendered = String::new();
        let mut included = 0;
        for (_, entry) in &scored {
            let line = format!("- {}\n", entry.content);
            if rendered.len() + line.len() > char_cap {
                break;
            }
            rendered.push_str(&line);
            included += 1;
        }

        debug!(
            user_id = request.user_id,
            session_id = request.session_id,
            candidates = scored.len(),
            included,
            char_cap,
            "Keyword recall complete"
        );

        if rendered.is_empty() {
            Ok(NO_CONTEXT_PLACEHOLDER.to_string())
        } else {
            Ok(rendered.trim_end().to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kindred_core::budget::BudgetAllocator;
    use kindred_core::memory::MemoryQuery;

    fn recall_request<'a>(
        query: &'a MemoryQuery,
        budget: &'a BudgetAllocator,
        domains: &'a [String],
    ) -> RecallRequest<'a> {
        RecallRequest {
            user_id: "alice",
            session_id: "s-1",
            request_text: &query.text,
            query,
            budget,
            expertise_domains: domains,
        }
    }

    #[tokio::test]
    async fn matching_entries_are_rendered_as_bullets() {
        let recall = KeywordRecall::new();
        recall
            .remember("alice", MemoryEntry::new("Prefers espresso over filter coffee", vec![]))
            .await;
        recall
            .remember("alice", MemoryEntry::new("Works night shifts on weekends", vec![]))
            .await;

        let budget = BudgetAllocator::new(128000, 8000, 0.85).unwrap();
        let query = MemoryQuery::text_only("what coffee does she like");
        let text = recall
            .retrieve(recall_request(&query, &budget, &[]))
            .await
            .unwrap();

        assert!(text.starts_with("- "));
        assert!(text.contains("espresso"));
        assert!(!text.contains("night shifts"));
    }

    #[tokio::test]
    async fn other_users_entries_are_invisible() {
        let recall = KeywordRecall::new();
        recall
            .remember("bob", MemoryEntry::new("Bob collects espresso machines", vec![]))
            .await;

        let budget = BudgetAllocator::new(128000, 8000, 0.85).unwrap();
        let query = MemoryQuery::text_only("espresso machines");
        let text = recall
            .retrieve(recall_request(&query, &budget, &[]))
            .await
            .unwrap();

        assert_eq!(text, NO_CONTEXT_PLACEHOLDER);
    }

    #[tokio::test]
    async fn no_match_yields_placeholder() {
        let recall = KeywordRecall::new();
        recall
            .remember("alice", MemoryEntry::new("Likes hiking", vec![]))
            .await;

        let budget = BudgetAllocator::new(128000, 8000, 0.85).unwrap();
        let query = MemoryQuery::text_only("quantum chromodynamics");
        let text = recall
            .retrieve(recall_request(&query, &budget, &[]))
            .await
            .unwrap();

        assert_eq!(text, NO_CONTEXT_PLACEHOLDER);
    }

    #[tokio::test]
    async fn expertise_domain_boost_reorders_results() {
        let recall = KeywordRecall::new();
        recall
            .remember("alice", MemoryEntry::new("Asked about sourdough timing", vec![]))
            .await;
        recall
            .remember(
                "alice",
                MemoryEntry::new("Asked about sourdough hydration", vec!["baking".into()]),
            )
            .await;

        let budget = BudgetAllocator::new(128000, 8000, 0.85).unwrap();
        let mut query = MemoryQuery::text_only("sourdough");
        query.limit = 1;
        let domains = vec!["Baking".to_string()];
        let text = recall
            .retrieve(recall_request(&query, &budget, &domains))
            .await
            .unwrap();

        assert!(text.contains("hydration"));
        assert!(!text.contains("timing"));
    }

    #[tokio::test]
    async fn rendered_block_respects_the_live_budget() {
        let recall = KeywordRecall::new();
        for i in 0..50 {
            recall
                .remember(
                    "alice",
                    MemoryEntry::new(format!("Fact number {i} about gardening {}", "x".repeat(400)), vec![]),
                )
                .await;
        }

        // A nearly exhausted allocator leaves recall almost nothing to spend.
        let mut budget = BudgetAllocator::new(2000, 1000, 1.0).unwrap(); // ceiling 1000
        assert!(budget.allocate("system", 900));

        let mut query = MemoryQuery::text_only("gardening facts");
        query.limit = 50;
        let text = recall
            .retrieve(recall_request(&query, &budget, &[]))
            .await
            .unwrap();

        // 25 tokens → 100 chars; one 400+ char line can't fit.
        assert_eq!(text, NO_CONTEXT_PLACEHOLDER);
    }
}
