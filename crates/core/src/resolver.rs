//! Reconciliation of raw quiz attempts against the quiz catalog.
//!
//! Attempt records and catalog entries share opaque quiz ids, but the two
//! datasets use incompatible naming, so the human-readable sequence label has
//! to be inferred from catalog titles. Attempts are never dropped: ids with
//! no catalog match keep the raw id in their label.

use std::collections::HashMap;

use crate::model::{Category, QuizAttempt, QuizCatalogEntry, ResolvedQuizAttempt, first_number};

/// Join attempts with the catalog for one category and label each attempt
/// with its stable `"Quiz N"` sequence label.
///
/// Labels come from the catalog: entries are walked in encounter order, the
/// ordinal being the first digit run of the title ([`QuizCatalogEntry::ordinal_hint`])
/// or, when the title carries no number, a fallback counter starting at 1.
/// Attempts with no catalog match are labeled `"Quiz {quiz_id}"`. The result
/// is stable-sorted ascending by the ordinal re-parsed from the label, so
/// labels without a number keep first-seen order at the front.
#[must_use]
pub fn resolve(
    catalog: &[QuizCatalogEntry],
    attempts: &[QuizAttempt],
    category: Category,
) -> Vec<ResolvedQuizAttempt> {
    let mut labels: HashMap<&str, String> = HashMap::new();
    let mut fallback = 1u32;
    for entry in catalog.iter().filter(|e| category.matches(&e.category)) {
        let ordinal = match entry.ordinal_hint() {
            Some(hint) => hint,
            None => {
                let assigned = fallback;
                fallback += 1;
                assigned
            }
        };
        labels.insert(entry.quiz_id.as_str(), format!("Quiz {ordinal}"));
    }

    let mut resolved: Vec<ResolvedQuizAttempt> = attempts
        .iter()
        .filter(|attempt| category.matches(&attempt.category))
        .map(|attempt| {
            let display_label = labels
                .get(attempt.quiz_id.as_str())
                .cloned()
                .unwrap_or_else(|| format!("Quiz {}", attempt.quiz_id));
            let ordinal = first_number(&display_label).unwrap_or(0);
            ResolvedQuizAttempt {
                attempt: attempt.clone(),
                display_label,
                ordinal,
            }
        })
        .collect();

    resolved.sort_by_key(|resolved| resolved.ordinal);
    resolved
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
