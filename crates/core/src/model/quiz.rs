use serde::{Deserialize, Serialize};

use crate::date::{self, NormalizedDate};

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// One quiz in the category-grouped catalog.
///
/// Catalog ids and attempt ids share the same opaque scheme, but display
/// titles do not carry the id anywhere, so the sequence position has to be
/// inferred from the title text (see [`crate::resolver`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizCatalogEntry {
    pub quiz_id: String,
    pub category: String,
    pub title_en: String,
    pub title_ur: String,
}

impl QuizCatalogEntry {
    /// Sequence number inferred from the title: the first digit run of the
    /// English title, falling back to the Urdu title.
    #[must_use]
    pub fn ordinal_hint(&self) -> Option<u32> {
        first_number(&self.title_en).or_else(|| first_number(&self.title_ur))
    }
}

/// First run of ASCII digits in `text`, parsed as a number.
///
/// Runs too long for `u32` yield `None`, the same as no digits at all.
#[must_use]
pub fn first_number(text: &str) -> Option<u32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

//
// ─── ATTEMPTS ──────────────────────────────────────────────────────────────────
//

/// A user's recorded result for one quiz instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub quiz_id: String,
    pub category: String,
    pub score: u32,
    pub total_questions: u32,
    pub percentage: f64,
    pub attempted_on: Option<String>,
}

impl QuizAttempt {
    /// Normalized attempt date, with sentinels for missing or bad input.
    #[must_use]
    pub fn attempt_date(&self) -> NormalizedDate {
        date::normalize(self.attempted_on.as_deref())
    }
}

/// A [`QuizAttempt`] joined with the catalog and annotated with its display
/// label.
///
/// Attempts whose id has no catalog entry keep the raw id in the label
/// (`"Quiz {id}"`) rather than being dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedQuizAttempt {
    pub attempt: QuizAttempt,
    pub display_label: String,
    pub ordinal: u32,
}

//
// ─── SERVER-SIDE SUMMARY ───────────────────────────────────────────────────────
//

/// Pre-aggregated quiz progress for one category, as computed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizCategoryProgress {
    pub category: String,
    pub total_quizzes: u32,
    pub attempted_quizzes: u32,
    pub question_completion_percentage: f64,
}

/// Server-side pre-aggregated quiz summary.
///
/// The summary view consumes this directly instead of recomputing totals from
/// raw attempt records client-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizProgressSummary {
    pub total_quizzes: u32,
    pub attempted_quizzes: u32,
    pub categories: Vec<QuizCategoryProgress>,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
