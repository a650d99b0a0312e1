use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// One content vertical of the app.
///
/// The set is fixed for a session; backend datasets refer to categories by
/// loosely-cased strings, so all comparisons go through [`Category::matches`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Narrative lessons.
    Story,
    /// Memorized creeds.
    Kalma,
    /// Supplications.
    Dua,
    /// Prayer rituals.
    Namaz,
    /// Timed quizzes.
    Quiz,
}

impl Category {
    /// The four verticals that contribute to the overall percentage.
    ///
    /// Quiz is tracked separately and intentionally excluded.
    pub const AGGREGATED: [Category; 4] =
        [Category::Story, Category::Kalma, Category::Dua, Category::Namaz];

    /// Canonical lowercase key, as used in endpoint paths.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Story => "story",
            Category::Kalma => "kalma",
            Category::Dua => "dua",
            Category::Namaz => "namaz",
            Category::Quiz => "quiz",
        }
    }

    /// Case-insensitive match against a raw category string from the backend.
    ///
    /// Category casing differs between datasets, so this is the single
    /// comparison point used everywhere.
    #[must_use]
    pub fn matches(self, raw: &str) -> bool {
        raw.trim().eq_ignore_ascii_case(self.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error type for parsing a category from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCategoryError {
    raw: String,
}

impl fmt::Display for ParseCategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category: {}", self.raw)
    }
}

impl std::error::Error for ParseCategoryError {}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Category::Story,
            Category::Kalma,
            Category::Dua,
            Category::Namaz,
            Category::Quiz,
        ]
        .into_iter()
        .find(|category| category.matches(s))
        .ok_or_else(|| ParseCategoryError { raw: s.to_string() })
    }
}

//
// ─── CATEGORY TOTALS ───────────────────────────────────────────────────────────
//

/// Per-category population sizes.
///
/// These are shipped client constants and can lag the backend catalog, which
/// is why the progress calculator clamps percentages instead of trusting them.
/// Quiz has no client-side total: the server pre-aggregates quiz counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub stories: u32,
    pub kalmas: u32,
    pub duas: u32,
    pub namaz_lessons: u32,
}

impl CategoryTotals {
    /// Population for the given category, `None` for [`Category::Quiz`].
    #[must_use]
    pub fn total(&self, category: Category) -> Option<u32> {
        match category {
            Category::Story => Some(self.stories),
            Category::Kalma => Some(self.kalmas),
            Category::Dua => Some(self.duas),
            Category::Namaz => Some(self.namaz_lessons),
            Category::Quiz => None,
        }
    }
}

impl Default for CategoryTotals {
    fn default() -> Self {
        Self {
            stories: 25,
            kalmas: 6,
            duas: 30,
            namaz_lessons: 12,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
