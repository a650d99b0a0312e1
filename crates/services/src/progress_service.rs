//! Aggregation of the four category progress sources into one snapshot.

use std::future::Future;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tracing::debug;

use taleem_core::NormalizedDate;
use taleem_core::calculator::compute_progress;
use taleem_core::model::{
    AggregateSnapshot, Category, CategoryProgress, CategoryTotals, CompletedItem, ProgressRecord,
};

use crate::api::ProgressApi;
use crate::error::{ApiError, RefreshError};

//
// ─── REFRESH OUTCOME ───────────────────────────────────────────────────────────
//

/// What a `refresh` call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// All four fetches settled and the snapshot was committed.
    Updated(AggregateSnapshot),
    /// The fetches settled, but a newer refresh was issued in the meantime;
    /// nothing was committed.
    Superseded,
    /// A refresh was already in flight; this call did nothing.
    AlreadyRefreshing,
}

//
// ─── ORCHESTRATOR ──────────────────────────────────────────────────────────────
//

/// Fans out the four category progress fetches, joins them, and commits one
/// [`AggregateSnapshot`].
///
/// Initial load and pull-to-refresh share this entry point. Two guards keep
/// view-state consistent in the single-threaded, event-driven client:
/// an in-flight flag collapses refreshes triggered while one is running, and
/// a generation token makes sure a late-settling fetch can never overwrite a
/// snapshot committed by a newer refresh (the token is captured at start and
/// compared at commit time).
#[derive(Clone)]
pub struct ProgressService {
    api: Arc<dyn ProgressApi>,
    totals: CategoryTotals,
    state: Arc<RefreshState>,
}

#[derive(Debug, Default)]
struct RefreshState {
    generation: AtomicU64,
    in_flight: AtomicBool,
    latest: Mutex<Option<AggregateSnapshot>>,
}

impl ProgressService {
    #[must_use]
    pub fn new(api: Arc<dyn ProgressApi>) -> Self {
        Self::with_totals(api, CategoryTotals::default())
    }

    #[must_use]
    pub fn with_totals(api: Arc<dyn ProgressApi>, totals: CategoryTotals) -> Self {
        Self {
            api,
            totals,
            state: Arc::new(RefreshState::default()),
        }
    }

    #[must_use]
    pub fn totals(&self) -> &CategoryTotals {
        &self.totals
    }

    /// The last committed snapshot, if any refresh has completed.
    #[must_use]
    pub fn snapshot(&self) -> Option<AggregateSnapshot> {
        self.state
            .latest
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Whether a refresh is currently in flight.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.state.in_flight.load(Ordering::SeqCst)
    }

    /// Fetch all four category progress sources concurrently and commit a
    /// fresh snapshot once every fetch has settled.
    ///
    /// Partial results are never committed: the first failing fetch aborts
    /// the whole aggregation and the previous snapshot stays untouched.
    ///
    /// # Errors
    ///
    /// Returns `RefreshError` naming the category whose fetch failed; the
    /// caller may retry by calling `refresh` again.
    pub async fn refresh(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<RefreshOutcome, RefreshError> {
        let Some(_guard) = InFlightGuard::acquire(&self.state.in_flight) else {
            debug!("refresh already in flight, skipping");
            return Ok(RefreshOutcome::AlreadyRefreshing);
        };
        let generation = self.state.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let (story, kalma, dua, namaz) = tokio::try_join!(
            fetch_record(Category::Story, self.api.story_progress(user_id, auth_token)),
            fetch_record(Category::Kalma, self.api.kalma_progress(user_id, auth_token)),
            fetch_record(Category::Dua, self.api.dua_progress(user_id, auth_token)),
            fetch_record(Category::Namaz, self.api.namaz_progress(user_id, auth_token)),
        )?;

        let snapshot = AggregateSnapshot::new(
            self.category_progress(&story),
            self.category_progress(&kalma),
            self.category_progress(&dua),
            self.category_progress(&namaz),
        );

        if self.state.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "refresh superseded before commit");
            return Ok(RefreshOutcome::Superseded);
        }
        *self
            .state
            .latest
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(snapshot.clone());

        Ok(RefreshOutcome::Updated(snapshot))
    }

    fn category_progress(&self, record: &ProgressRecord) -> CategoryProgress {
        let total = self.totals.total(record.category()).unwrap_or(0);
        compute_progress(record.completed_count(), total)
    }
}

async fn fetch_record<F>(category: Category, fetch: F) -> Result<ProgressRecord, RefreshError>
where
    F: Future<Output = Result<Vec<CompletedItem>, ApiError>>,
{
    let items = fetch
        .await
        .map_err(|source| RefreshError::Fetch { category, source })?;
    let invalid_dates = items
        .iter()
        .filter(|item| item.completion_date() == NormalizedDate::Invalid)
        .count();
    if invalid_dates > 0 {
        debug!(%category, invalid_dates, "unparseable completion dates degraded to sentinel");
    }
    Ok(ProgressRecord::new(category, items))
}

/// Releases the in-flight flag on every exit path, including cancellation.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        // A failed acquire must not construct a guard: its drop would
        // release the flag held by the refresh already in flight.
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
            .then(|| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    use taleem_core::model::{QuizAttempt, QuizCatalogEntry, QuizProgressSummary};

    fn items(count: usize) -> Vec<CompletedItem> {
        (0..count)
            .map(|index| CompletedItem::new(format!("Item {index}")))
            .collect()
    }

    /// Serves fixed item counts per category; a failing category yields a
    /// status error instead. `supersede` simulates a newer refresh being
    /// issued while a fetch is still settling.
    #[derive(Default)]
    struct FakeApi {
        story: usize,
        kalma: usize,
        dua: usize,
        namaz: usize,
        failing: Option<Category>,
        supersede: Option<Arc<RefreshState>>,
    }

    impl FakeApi {
        fn respond(&self, category: Category, count: usize) -> Result<Vec<CompletedItem>, ApiError> {
            if let Some(state) = &self.supersede {
                state.generation.fetch_add(1, Ordering::SeqCst);
            }
            if self.failing == Some(category) {
                return Err(ApiError::HttpStatus(
                    reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                ));
            }
            Ok(items(count))
        }
    }

    #[async_trait]
    impl ProgressApi for FakeApi {
        async fn story_progress(&self, _: &str, _: &str) -> Result<Vec<CompletedItem>, ApiError> {
            self.respond(Category::Story, self.story)
        }
        async fn kalma_progress(&self, _: &str, _: &str) -> Result<Vec<CompletedItem>, ApiError> {
            self.respond(Category::Kalma, self.kalma)
        }
        async fn dua_progress(&self, _: &str, _: &str) -> Result<Vec<CompletedItem>, ApiError> {
            self.respond(Category::Dua, self.dua)
        }
        async fn namaz_progress(&self, _: &str, _: &str) -> Result<Vec<CompletedItem>, ApiError> {
            self.respond(Category::Namaz, self.namaz)
        }
        async fn quiz_progress(&self, _: &str, _: &str) -> Result<QuizProgressSummary, ApiError> {
            Ok(QuizProgressSummary::default())
        }
        async fn quiz_scores(&self, _: &str, _: &str) -> Result<Vec<QuizAttempt>, ApiError> {
            Ok(Vec::new())
        }
        async fn quiz_catalog(&self) -> Result<Vec<QuizCatalogEntry>, ApiError> {
            Ok(Vec::new())
        }
    }

    fn totals() -> CategoryTotals {
        CategoryTotals {
            stories: 10,
            kalmas: 6,
            duas: 30,
            namaz_lessons: 12,
        }
    }

    #[tokio::test]
    async fn refresh_commits_a_snapshot_from_all_four_fetches() {
        let api = FakeApi {
            story: 5,
            kalma: 3,
            dua: 15,
            namaz: 0,
            ..FakeApi::default()
        };
        let service = ProgressService::with_totals(Arc::new(api), totals());

        let outcome = service.refresh("user-1", "token").await.unwrap();

        let RefreshOutcome::Updated(snapshot) = outcome else {
            panic!("expected a committed snapshot, got {outcome:?}");
        };
        assert_eq!(snapshot.story.percentage, 50);
        assert_eq!(snapshot.kalma.percentage, 50);
        assert_eq!(snapshot.dua.percentage, 50);
        assert_eq!(snapshot.namaz.percentage, 0);
        // (50 + 50 + 50 + 0) / 4, quiz excluded.
        assert_eq!(snapshot.overall_percentage, 38);
        assert_eq!(service.snapshot(), Some(snapshot));
    }

    #[tokio::test]
    async fn one_rejection_aborts_the_whole_aggregation() {
        let api = FakeApi {
            story: 5,
            kalma: 3,
            dua: 15,
            namaz: 2,
            failing: Some(Category::Dua),
            ..FakeApi::default()
        };
        let service = ProgressService::with_totals(Arc::new(api), totals());

        let error = service.refresh("user-1", "token").await.unwrap_err();

        assert_eq!(error.category(), Category::Dua);
        // No partial snapshot was committed.
        assert_eq!(service.snapshot(), None);
        // The flag is released, so a retry is possible.
        assert!(!service.is_refreshing());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_the_previous_snapshot() {
        let service = {
            let api = FakeApi {
                story: 5,
                kalma: 3,
                dua: 15,
                namaz: 2,
                ..FakeApi::default()
            };
            ProgressService::with_totals(Arc::new(api), totals())
        };
        let first = service.refresh("user-1", "token").await.unwrap();
        let RefreshOutcome::Updated(snapshot) = first else {
            panic!("expected a committed snapshot");
        };

        let failing = ProgressService {
            api: Arc::new(FakeApi {
                failing: Some(Category::Story),
                ..FakeApi::default()
            }),
            totals: totals(),
            state: Arc::clone(&service.state),
        };
        failing.refresh("user-1", "token").await.unwrap_err();

        assert_eq!(service.snapshot(), Some(snapshot));
    }

    #[tokio::test]
    async fn stale_generation_is_not_committed() {
        let state = Arc::new(RefreshState::default());
        let api = FakeApi {
            story: 5,
            supersede: Some(Arc::clone(&state)),
            ..FakeApi::default()
        };
        let service = ProgressService {
            api: Arc::new(api),
            totals: totals(),
            state,
        };

        let outcome = service.refresh("user-1", "token").await.unwrap();

        assert_eq!(outcome, RefreshOutcome::Superseded);
        assert_eq!(service.snapshot(), None);
    }

    #[tokio::test]
    async fn concurrent_refresh_is_collapsed_by_the_in_flight_flag() {
        let api = FakeApi::default();
        let service = ProgressService::with_totals(Arc::new(api), totals());

        service.state.in_flight.store(true, Ordering::SeqCst);
        let outcome = service.refresh("user-1", "token").await.unwrap();
        assert_eq!(outcome, RefreshOutcome::AlreadyRefreshing);

        // Nothing was fetched and the generation was not advanced.
        assert_eq!(service.state.generation.load(Ordering::SeqCst), 0);

        service.state.in_flight.store(false, Ordering::SeqCst);
        let outcome = service.refresh("user-1", "token").await.unwrap();
        assert!(matches!(outcome, RefreshOutcome::Updated(_)));
    }

    #[tokio::test]
    async fn empty_histories_compute_to_zero_percent() {
        // Brand-new users have no completion records in any category.
        let service = ProgressService::with_totals(Arc::new(FakeApi::default()), totals());

        let outcome = service.refresh("new-user", "token").await.unwrap();

        let RefreshOutcome::Updated(snapshot) = outcome else {
            panic!("expected a committed snapshot");
        };
        assert_eq!(snapshot.overall_percentage, 0);
        for (_, progress) in snapshot.per_category() {
            assert_eq!(progress.completed, 0);
            assert_eq!(progress.percentage, 0);
        }
    }
}
