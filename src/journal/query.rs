//! Search, filter and sort for the journal list view.

use super::date_resolver;
use super::record::JournalRecord;
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::str::FromStr;

/// Ordering options offered by the list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Latest parsed instant first; unparseable records last.
    #[default]
    Newest,
    /// Earliest parsed instant first; unparseable records last.
    Oldest,
    /// Title, case-insensitive ascending.
    TitleAsc,
    /// Title, case-insensitive descending.
    TitleDesc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "newest" => Ok(SortOrder::Newest),
            "oldest" => Ok(SortOrder::Oldest),
            "a-z" | "az" => Ok(SortOrder::TitleAsc),
            "z-a" | "za" => Ok(SortOrder::TitleDesc),
            other => Err(format!(
                "Unknown sort order '{}'. Expected newest, oldest, a-z or z-a",
                other
            )),
        }
    }
}

/// Mood filter; `All` disables it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MoodFilter {
    #[default]
    All,
    /// Matches the raw label case-insensitively.
    Label(String),
}

impl MoodFilter {
    pub fn parse(input: &str) -> Self {
        if input.eq_ignore_ascii_case("all") {
            MoodFilter::All
        } else {
            MoodFilter::Label(input.to_string())
        }
    }

    fn matches(&self, record: &JournalRecord) -> bool {
        match self {
            MoodFilter::All => true,
            MoodFilter::Label(label) => record.mood.to_lowercase() == label.to_lowercase(),
        }
    }
}

/// Criteria for the list view.
///
/// # Examples
///
/// ```
/// use sentio::journal::{JournalRecord, MoodFilter, RecordQuery, SortOrder};
///
/// let records = vec![
///     JournalRecord { id: "a".into(), mood: "Sad".into(), title: "Rainy".into(),
///                     date: "01 Jan 2024, 09:00".into(), ..Default::default() },
///     JournalRecord { id: "b".into(), mood: "Happy".into(), title: "Sunny".into(),
///                     date: "02 Jan 2024, 09:00".into(), ..Default::default() },
/// ];
///
/// let query = RecordQuery { mood: MoodFilter::parse("happy"), ..Default::default() };
/// let hits = query.apply(&records);
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].id, "b");
///
/// let oldest_first = RecordQuery { sort: SortOrder::Oldest, ..Default::default() }.apply(&records);
/// assert_eq!(oldest_first[0].id, "a");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordQuery {
    /// Substring searched in title, content and location, ignoring case.
    pub search: String,
    pub mood: MoodFilter,
    pub sort: SortOrder,
    /// Restricts results to one calendar day.
    pub on_date: Option<NaiveDate>,
}

impl RecordQuery {
    /// Returns the matching records in the requested order.
    pub fn apply<'a>(&self, records: &'a [JournalRecord]) -> Vec<&'a JournalRecord> {
        let needle = self.search.to_lowercase();

        let mut hits: Vec<&JournalRecord> = records
            .iter()
            .filter(|record| matches_search(record, &needle))
            .filter(|record| self.mood.matches(record))
            .filter(|record| match self.on_date {
                Some(day) => date_resolver::calendar_date(&record.date) == Some(day),
                None => true,
            })
            .collect();

        match self.sort {
            SortOrder::Newest => hits.sort_by(|a, b| by_instant(a, b, true)),
            SortOrder::Oldest => hits.sort_by(|a, b| by_instant(a, b, false)),
            SortOrder::TitleAsc => hits.sort_by_cached_key(|r| r.title.to_lowercase()),
            SortOrder::TitleDesc => {
                hits.sort_by_cached_key(|r| std::cmp::Reverse(r.title.to_lowercase()))
            }
        }

        hits
    }
}

fn matches_search(record: &JournalRecord, needle: &str) -> bool {
    needle.is_empty()
        || record.title.to_lowercase().contains(needle)
        || record.content.to_lowercase().contains(needle)
        || record.location.to_lowercase().contains(needle)
}

// Unparseable timestamps always sort after parseable ones.
fn by_instant(a: &JournalRecord, b: &JournalRecord, descending: bool) -> Ordering {
    let left = a.resolved_date().map(|r| r.instant);
    let right = b.resolved_date().map(|r| r.instant);
    match (left, right) {
        (Some(l), Some(r)) if descending => r.cmp(&l),
        (Some(l), Some(r)) => l.cmp(&r),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
