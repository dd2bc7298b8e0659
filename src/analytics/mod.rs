//! Derived mood views.
//!
//! Everything here is a pure function of one record snapshot. Consumers
//! recompute from the full set on every push rather than keeping incremental
//! state, so calling any of these repeatedly is always safe.

pub mod aggregator;
pub mod stability;

use crate::repository::RecordSnapshots;
use futures::{Stream, StreamExt};
use serde::Serialize;

use crate::journal::JournalRecord;

pub use aggregator::{
    by_calendar_date, dominant_mood, latest_mood, month_grid, mood_counts, most_common_mood,
    profile_counts, todays_record, DayCell, MoodCount, MoodCounts, ProfileCounts, YearMonth,
};
pub use stability::stability_score;

/// Every view the summary screens need, computed from one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoodSummary {
    /// `None` until at least one record has a parseable timestamp.
    pub latest_mood: Option<String>,
    pub most_common_mood: String,
    pub mood_counts: MoodCounts,
    pub stability: u8,
    pub journal_count: usize,
    pub total_moods: usize,
    pub month: YearMonth,
    pub month_grid: Vec<DayCell>,
}

impl MoodSummary {
    pub fn from_records(records: &[JournalRecord], month: YearMonth) -> Self {
        let counts = profile_counts(records);
        MoodSummary {
            latest_mood: latest_mood(records).map(str::to_string),
            most_common_mood: most_common_mood(records),
            mood_counts: mood_counts(records),
            stability: stability_score(records),
            journal_count: counts.journal_count,
            total_moods: counts.total_moods,
            month,
            month_grid: month_grid(month, records),
        }
    }
}

/// Maps a snapshot subscription to a summary per delivered snapshot.
pub fn live_summaries(
    snapshots: RecordSnapshots,
    month: YearMonth,
) -> impl Stream<Item = MoodSummary> {
    snapshots.map(move |records| MoodSummary::from_records(&records, month))
}
