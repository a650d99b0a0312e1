use serde::{Deserialize, Serialize};

use crate::date::{self, NormalizedDate};
use crate::model::category::Category;

//
// ─── COMPLETED ITEM ────────────────────────────────────────────────────────────
//

/// One finished piece of content within a category.
///
/// The completion date is kept as the raw wire string; different backends
/// write different encodings, so normalization happens on demand via
/// [`CompletedItem::completion_date`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedItem {
    pub title: String,
    pub title_urdu: Option<String>,
    /// Category-specific extra, e.g. the prayer a namaz lesson belongs to.
    pub detail: Option<String>,
    pub completed_on: Option<String>,
}

impl CompletedItem {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            title_urdu: None,
            detail: None,
            completed_on: None,
        }
    }

    #[must_use]
    pub fn with_completed_on(mut self, raw: impl Into<String>) -> Self {
        self.completed_on = Some(raw.into());
        self
    }

    /// Normalized completion date, with sentinels for missing or bad input.
    #[must_use]
    pub fn completion_date(&self) -> NormalizedDate {
        date::normalize(self.completed_on.as_deref())
    }
}

//
// ─── PROGRESS RECORD ───────────────────────────────────────────────────────────
//

/// A user's completed subset of one category, rebuilt on every refresh.
///
/// Never persisted; the only durable state lives behind the backend CRUD
/// surfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRecord {
    category: Category,
    items: Vec<CompletedItem>,
}

impl ProgressRecord {
    #[must_use]
    pub fn new(category: Category, items: Vec<CompletedItem>) -> Self {
        Self { category, items }
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn items(&self) -> &[CompletedItem] {
        &self.items
    }

    #[must_use]
    pub fn completed_count(&self) -> u32 {
        u32::try_from(self.items.len()).unwrap_or(u32::MAX)
    }
}

//
// ─── CATEGORY PROGRESS ─────────────────────────────────────────────────────────
//

/// Completion summary for one category.
///
/// `percentage` is always within `[0, 100]`; see
/// [`crate::calculator::compute_progress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryProgress {
    pub completed: u32,
    pub total: u32,
    pub percentage: u8,
}

//
// ─── AGGREGATE SNAPSHOT ────────────────────────────────────────────────────────
//

/// Point-in-time progress summary across the four aggregated verticals.
///
/// Quiz progress is tracked separately (server-side pre-aggregated) and is
/// intentionally excluded from `overall_percentage`; that exclusion matches
/// the shipped behavior and is relied on by the summary screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateSnapshot {
    pub story: CategoryProgress,
    pub kalma: CategoryProgress,
    pub dua: CategoryProgress,
    pub namaz: CategoryProgress,
    pub overall_percentage: u8,
}

impl AggregateSnapshot {
    /// Build a snapshot, deriving the overall score as the arithmetic mean of
    /// the four category percentages.
    #[must_use]
    pub fn new(
        story: CategoryProgress,
        kalma: CategoryProgress,
        dua: CategoryProgress,
        namaz: CategoryProgress,
    ) -> Self {
        let sum = f64::from(story.percentage)
            + f64::from(kalma.percentage)
            + f64::from(dua.percentage)
            + f64::from(namaz.percentage);
        let overall_percentage = (sum / 4.0).round() as u8;
        Self {
            story,
            kalma,
            dua,
            namaz,
            overall_percentage,
        }
    }

    /// Progress for one category, `None` for [`Category::Quiz`].
    #[must_use]
    pub fn category(&self, category: Category) -> Option<&CategoryProgress> {
        match category {
            Category::Story => Some(&self.story),
            Category::Kalma => Some(&self.kalma),
            Category::Dua => Some(&self.dua),
            Category::Namaz => Some(&self.namaz),
            Category::Quiz => None,
        }
    }

    /// The four aggregated verticals in display order.
    #[must_use]
    pub fn per_category(&self) -> [(Category, &CategoryProgress); 4] {
        [
            (Category::Story, &self.story),
            (Category::Kalma, &self.kalma),
            (Category::Dua, &self.dua),
            (Category::Namaz, &self.namaz),
        ]
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
