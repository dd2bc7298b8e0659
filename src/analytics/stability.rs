//! Mood stability: how far consecutive check-ins swing on the affect scale.
//!
//! Records are ordered by their parsed timestamp, each adjacent pair whose
//! moods are both canonical contributes `|affect(curr) - affect(prev)|`, and
//! the mean delta is turned into a 0..=100 score by
//! `100 - mean * 15`, clamped and truncated toward zero.
//!
//! Edge cases are part of the contract:
//!
//! | input | score |
//! | --- | --- |
//! | no records | 0 |
//! | fewer than two parseable records | 100 |
//! | no pair with two canonical moods | 0 |

use crate::constants::{STABILITY_MAX, STABILITY_PENALTY_PER_STEP};
use crate::journal::{JournalRecord, Mood};
use chrono::NaiveDateTime;
use tracing::debug;

/// Computes the stability score for a snapshot.
///
/// The result does not depend on input order. Records sharing an instant are
/// ordered by affect, then by raw label, before deltas are taken.
///
/// # Examples
///
/// ```
/// use sentio::analytics::stability_score;
/// use sentio::journal::JournalRecord;
///
/// let records = vec![
///     JournalRecord { mood: "Sad".into(), date: "01 Jan 2024, 09:00".into(), ..Default::default() },
///     JournalRecord { mood: "Happy".into(), date: "01 Jan 2024, 18:00".into(), ..Default::default() },
/// ];
/// // |6 - 3| = 3, 100 - 3 * 15 = 55
/// assert_eq!(stability_score(&records), 55);
/// assert_eq!(stability_score(&[]), 0);
/// ```
pub fn stability_score(records: &[JournalRecord]) -> u8 {
    if records.is_empty() {
        return 0;
    }

    let mut timeline: Vec<(NaiveDateTime, Option<Mood>, &str)> = records
        .iter()
        .filter_map(|record| {
            record
                .resolved_date()
                .map(|resolved| (resolved.instant, record.canonical_mood(), record.mood.as_str()))
        })
        .collect();

    if timeline.len() < 2 {
        return STABILITY_MAX;
    }

    timeline.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| a.1.map(Mood::affect).cmp(&b.1.map(Mood::affect)))
            .then_with(|| a.2.cmp(b.2))
    });

    let mut total_change: u32 = 0;
    let mut pairs: u32 = 0;
    for window in timeline.windows(2) {
        let (Some(prev), Some(curr)) = (window[0].1, window[1].1) else {
            continue;
        };
        total_change += u32::from(prev.affect().abs_diff(curr.affect()));
        pairs += 1;
    }

    if pairs == 0 {
        debug!("No scorable mood pairs among {} records", timeline.len());
        return 0;
    }

    let mean_change = total_change as f32 / pairs as f32;
    let score = (f32::from(STABILITY_MAX) - mean_change * STABILITY_PENALTY_PER_STEP)
        .clamp(0.0, f32::from(STABILITY_MAX));

    // Truncation, not rounding.
    score as u8
}
