//! Quiz progress: server-side summary plus on-demand per-category drill-down.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;

use taleem_core::model::{Category, QuizProgressSummary, ResolvedQuizAttempt};
use taleem_core::resolver;

use crate::api::ProgressApi;
use crate::error::RefreshError;

/// Quiz aggregation is deliberately separate from the four-way refresh: the
/// summary view consumes server-side pre-aggregated totals, and the per-quiz
/// detail is only computed when the user drills into one category.
#[derive(Clone)]
pub struct QuizService {
    api: Arc<dyn ProgressApi>,
}

impl QuizService {
    #[must_use]
    pub fn new(api: Arc<dyn ProgressApi>) -> Self {
        Self { api }
    }

    /// Fetch the pre-aggregated quiz summary for a user.
    ///
    /// # Errors
    ///
    /// Returns `RefreshError` on transport failure or a non-2xx response.
    pub async fn refresh_quiz_progress(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<QuizProgressSummary, RefreshError> {
        self.api
            .quiz_progress(user_id, auth_token)
            .await
            .map_err(|source| RefreshError::Fetch {
                category: Category::Quiz,
                source,
            })
    }

    /// Resolve a user's attempts in one category against the quiz catalog.
    ///
    /// Attempts whose id has no catalog entry are kept with a raw-id label;
    /// the mismatch is logged but never surfaced as an error, since the
    /// catalog and score datasets are only eventually consistent.
    ///
    /// # Errors
    ///
    /// Returns `RefreshError` when either the scores or the catalog fetch
    /// fails.
    pub async fn category_attempts(
        &self,
        user_id: &str,
        auth_token: &str,
        category: Category,
    ) -> Result<Vec<ResolvedQuizAttempt>, RefreshError> {
        let wrap = |source| RefreshError::Fetch {
            category: Category::Quiz,
            source,
        };
        let (attempts, catalog) = tokio::try_join!(
            async {
                self.api
                    .quiz_scores(user_id, auth_token)
                    .await
                    .map_err(wrap)
            },
            async { self.api.quiz_catalog().await.map_err(wrap) },
        )?;

        let known: HashSet<&str> = catalog
            .iter()
            .filter(|entry| category.matches(&entry.category))
            .map(|entry| entry.quiz_id.as_str())
            .collect();
        for attempt in attempts
            .iter()
            .filter(|attempt| category.matches(&attempt.category))
        {
            if !known.contains(attempt.quiz_id.as_str()) {
                warn!(
                    quiz_id = %attempt.quiz_id,
                    %category,
                    "attempt has no catalog entry, labeling by raw id"
                );
            }
        }

        Ok(resolver::resolve(&catalog, &attempts, category))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
