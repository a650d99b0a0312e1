use std::sync::Arc;

use async_trait::async_trait;

use services::{ApiError, ProgressApi, ProgressService, QuizService, RefreshOutcome};
use taleem_core::model::{
    Category, CategoryTotals, CompletedItem, QuizAttempt, QuizCatalogEntry,
    QuizCategoryProgress, QuizProgressSummary,
};

/// A small in-memory backend covering every endpoint.
struct FixtureApi;

fn item(title: &str, completed_on: &str) -> CompletedItem {
    CompletedItem::new(title).with_completed_on(completed_on)
}

#[async_trait]
impl ProgressApi for FixtureApi {
    async fn story_progress(&self, _: &str, _: &str) -> Result<Vec<CompletedItem>, ApiError> {
        Ok(vec![
            item("The Spider and the Cave", "2024-01-15T10:30:00Z"),
            item("The Ant Colony", "16/01/2024"),
        ])
    }

    async fn kalma_progress(&self, _: &str, _: &str) -> Result<Vec<CompletedItem>, ApiError> {
        Ok(vec![
            item("First Kalma", "2024-01-10"),
            item("Second Kalma", "11-01-2024"),
            item("Third Kalma", ""),
        ])
    }

    async fn dua_progress(&self, _: &str, _: &str) -> Result<Vec<CompletedItem>, ApiError> {
        Ok(Vec::new())
    }

    async fn namaz_progress(&self, _: &str, _: &str) -> Result<Vec<CompletedItem>, ApiError> {
        Ok(vec![item("Sana", "2024-02-01")])
    }

    async fn quiz_progress(&self, _: &str, _: &str) -> Result<QuizProgressSummary, ApiError> {
        Ok(QuizProgressSummary {
            total_quizzes: 12,
            attempted_quizzes: 3,
            categories: vec![QuizCategoryProgress {
                category: "kalma".to_string(),
                total_quizzes: 6,
                attempted_quizzes: 2,
                question_completion_percentage: 30.0,
            }],
        })
    }

    async fn quiz_scores(&self, _: &str, _: &str) -> Result<Vec<QuizAttempt>, ApiError> {
        Ok(vec![
            QuizAttempt {
                quiz_id: "k2".to_string(),
                category: "Kalma".to_string(),
                score: 8,
                total_questions: 10,
                percentage: 80.0,
                attempted_on: Some("2024-01-20T09:00:00Z".to_string()),
            },
            QuizAttempt {
                quiz_id: "k1".to_string(),
                category: "kalma".to_string(),
                score: 6,
                total_questions: 10,
                percentage: 60.0,
                attempted_on: Some("19/01/2024".to_string()),
            },
            QuizAttempt {
                quiz_id: "d1".to_string(),
                category: "dua".to_string(),
                score: 5,
                total_questions: 5,
                percentage: 100.0,
                attempted_on: None,
            },
        ])
    }

    async fn quiz_catalog(&self) -> Result<Vec<QuizCatalogEntry>, ApiError> {
        Ok(vec![
            QuizCatalogEntry {
                quiz_id: "k1".to_string(),
                category: "kalma".to_string(),
                title_en: "Kalma Quiz 1".to_string(),
                title_ur: String::new(),
            },
            QuizCatalogEntry {
                quiz_id: "k2".to_string(),
                category: "kalma".to_string(),
                title_en: "Kalma Quiz 2".to_string(),
                title_ur: String::new(),
            },
            QuizCatalogEntry {
                quiz_id: "d1".to_string(),
                category: "dua".to_string(),
                title_en: "Dua Quiz 1".to_string(),
                title_ur: String::new(),
            },
        ])
    }
}

#[tokio::test]
async fn refresh_then_drill_into_quiz_category() {
    let api: Arc<dyn ProgressApi> = Arc::new(FixtureApi);
    let totals = CategoryTotals {
        stories: 4,
        kalmas: 6,
        duas: 30,
        namaz_lessons: 12,
    };
    let progress = ProgressService::with_totals(Arc::clone(&api), totals);
    let quizzes = QuizService::new(api);

    // Full four-way refresh.
    let outcome = progress
        .refresh("user-1", "token")
        .await
        .expect("refresh succeeds");
    let RefreshOutcome::Updated(snapshot) = outcome else {
        panic!("expected a committed snapshot, got {outcome:?}");
    };
    assert_eq!(snapshot.story.completed, 2);
    assert_eq!(snapshot.story.percentage, 50);
    assert_eq!(snapshot.kalma.percentage, 50);
    assert_eq!(snapshot.dua.percentage, 0);
    assert_eq!(snapshot.namaz.percentage, 8);
    // (50 + 50 + 0 + 8) / 4 = 27, quiz excluded.
    assert_eq!(snapshot.overall_percentage, 27);
    assert_eq!(progress.snapshot(), Some(snapshot.clone()));

    // Completion dates from mixed encodings normalize for display.
    assert_eq!(
        snapshot.category(Category::Story).map(|p| p.completed),
        Some(2)
    );

    // Summary view consumes the server-side aggregation.
    let summary = quizzes
        .refresh_quiz_progress("user-1", "token")
        .await
        .expect("summary succeeds");
    assert_eq!(summary.total_quizzes, 12);
    assert_eq!(summary.categories[0].category, "kalma");

    // Drill-down joins attempts with the catalog, mixed casing included.
    let resolved = quizzes
        .category_attempts("user-1", "token", Category::Kalma)
        .await
        .expect("drill-down succeeds");
    assert_eq!(resolved.len(), 2);
    assert_eq!(resolved[0].display_label, "Quiz 1");
    assert_eq!(resolved[0].attempt.score, 6);
    assert_eq!(resolved[0].attempt.attempt_date().to_string(), "Jan 19, 2024");
    assert_eq!(resolved[1].display_label, "Quiz 2");
    assert_eq!(resolved[1].attempt.attempt_date().to_string(), "Jan 20, 2024");
}
