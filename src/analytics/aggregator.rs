//! Calendar grouping and mood tallies over a record snapshot.
//!
//! All functions are pure and total: an empty snapshot, or one where no
//! timestamp parses, yields an empty map, `None`, or the documented default.
//!
//! Only the six canonical mood labels are grouped or tallied; any other label
//! (blank, "Disgust", a typo) is left out of these views. Ties between equally
//! frequent labels go to the label that appeared first in the input. Record
//! order inside a group is input order.

use crate::constants::{DATE_FORMAT_ISO, DEFAULT_MOOD_LABEL};
use crate::journal::{JournalRecord, Mood};
use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// A calendar month.
///
/// # Examples
///
/// ```
/// use sentio::analytics::YearMonth;
///
/// let april: YearMonth = "2024-04".parse().unwrap();
/// assert_eq!(april.days_in_month(), 30);
/// assert_eq!(april.to_string(), "2024-04");
///
/// let leap_feb = YearMonth::new(2024, 2).unwrap();
/// assert_eq!(leap_feb.days_in_month(), 29);
/// assert!(YearMonth::new(2024, 13).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first_day: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first_day| YearMonth { first_day })
    }

    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        YearMonth {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub fn days_in_month(&self) -> u32 {
        match self.first_day.checked_add_months(Months::new(1)) {
            Some(next) => next.signed_duration_since(self.first_day).num_days() as u32,
            None => 31,
        }
    }

    /// The given day of this month, if it exists.
    pub fn day(&self, day: u32) -> Option<NaiveDate> {
        self.first_day.with_day(day)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = String;

    /// Parses `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(&format!("{}-01", s.trim()), DATE_FORMAT_ISO)
            .map(YearMonth::of)
            .map_err(|e| format!("Invalid month '{}' (expected YYYY-MM): {}", s, e))
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One cell of the month calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub day: u32,
    pub date: NaiveDate,
    pub dominant_mood: Option<String>,
}

/// How often one canonical label occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoodCount {
    pub mood: String,
    pub count: usize,
}

/// Label frequencies in first-appearance order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MoodCounts {
    counts: Vec<MoodCount>,
}

impl MoodCounts {
    fn tally<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts: Vec<MoodCount> = Vec::new();
        for label in labels {
            match counts.iter_mut().find(|entry| entry.mood == label) {
                Some(entry) => entry.count += 1,
                None => counts.push(MoodCount {
                    mood: label.to_string(),
                    count: 1,
                }),
            }
        }
        MoodCounts { counts }
    }

    /// Count for `label`, zero when absent.
    pub fn get(&self, label: &str) -> usize {
        self.counts
            .iter()
            .find(|entry| entry.mood == label)
            .map_or(0, |entry| entry.count)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MoodCount> {
        self.counts.iter()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// First label reaching the highest count.
    pub fn first_maximal(&self) -> Option<&str> {
        let max = self.counts.iter().map(|entry| entry.count).max()?;
        self.counts
            .iter()
            .find(|entry| entry.count == max)
            .map(|entry| entry.mood.as_str())
    }
}

/// Groups the canonical moods of all parseable records by calendar date.
///
/// Records whose timestamp does not parse, or whose label is not one of the
/// six moods, are left out.
pub fn by_calendar_date(records: &[JournalRecord]) -> BTreeMap<NaiveDate, Vec<String>> {
    let mut groups: BTreeMap<NaiveDate, Vec<String>> = BTreeMap::new();
    for record in records {
        let Some(mood) = record.canonical_mood() else {
            debug!("Skipping record {} with label '{}'", record.id, record.mood);
            continue;
        };
        match record.resolved_date() {
            Some(resolved) => groups
                .entry(resolved.date)
                .or_default()
                .push(mood.label().to_string()),
            None => debug!("Skipping record {} with unparseable date", record.id),
        }
    }
    groups
}

/// Plurality vote over the moods of one day. Non-canonical labels get no vote.
///
/// ```
/// use sentio::analytics::dominant_mood;
///
/// assert_eq!(dominant_mood(&["Happy", "Happy", "Sad"]), Some("Happy"));
/// assert_eq!(dominant_mood(&["Sad", "Happy"]), Some("Sad"));
/// assert_eq!(dominant_mood(&["Disgust", "Disgust", "Fear"]), Some("Fear"));
/// assert_eq!(dominant_mood::<&str>(&[]), None);
/// ```
pub fn dominant_mood<S: AsRef<str>>(moods: &[S]) -> Option<&str> {
    let counts = MoodCounts::tally(canonical(moods.iter().map(AsRef::as_ref)));
    let winner = counts.first_maximal()?;
    // Hand back a borrow of the caller's data rather than of the tally.
    moods.iter().map(AsRef::as_ref).find(|mood| *mood == winner)
}

/// Mood of the record with the latest parseable timestamp.
///
/// On equal instants the record seen first wins. Returns `None` when nothing
/// parses or when the winning record carries a blank mood.
pub fn latest_mood(records: &[JournalRecord]) -> Option<&str> {
    let mut best: Option<(NaiveDateTime, &str)> = None;
    for record in records {
        let Some(resolved) = record.resolved_date() else {
            continue;
        };
        if best.map_or(true, |(instant, _)| resolved.instant > instant) {
            best = Some((resolved.instant, record.mood.as_str()));
        }
    }
    best.map(|(_, mood)| mood).filter(|mood| !mood.trim().is_empty())
}

/// One cell per day of `month`, in day order.
pub fn month_grid(month: YearMonth, records: &[JournalRecord]) -> Vec<DayCell> {
    let groups = by_calendar_date(records);
    (1..=month.days_in_month())
        .filter_map(|day| month.day(day).map(|date| (day, date)))
        .map(|(day, date)| DayCell {
            day,
            date,
            dominant_mood: groups
                .get(&date)
                .and_then(|moods| dominant_mood(moods))
                .map(str::to_string),
        })
        .collect()
}

/// Frequencies of each canonical mood label, parseable timestamp or not.
pub fn mood_counts(records: &[JournalRecord]) -> MoodCounts {
    MoodCounts::tally(canonical(records.iter().map(|record| record.mood.as_str())))
}

/// The most frequent canonical label, `"Neutral"` when there is nothing to count.
pub fn most_common_mood(records: &[JournalRecord]) -> String {
    mood_counts(records)
        .first_maximal()
        .unwrap_or(DEFAULT_MOOD_LABEL)
        .to_string()
}

fn canonical<'a, I>(labels: I) -> impl Iterator<Item = &'a str>
where
    I: Iterator<Item = &'a str>,
{
    labels.filter(|label| Mood::from_label(label).is_some())
}

/// Latest record written on `day`.
pub fn todays_record(records: &[JournalRecord], day: NaiveDate) -> Option<&JournalRecord> {
    let mut best: Option<(NaiveDateTime, &JournalRecord)> = None;
    for record in records {
        let Some(resolved) = record.resolved_date() else {
            continue;
        };
        if resolved.date != day {
            continue;
        }
        if best.map_or(true, |(instant, _)| resolved.instant > instant) {
            best = Some((resolved.instant, record));
        }
    }
    best.map(|(_, record)| record)
}

/// Counters shown on the profile card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProfileCounts {
    /// Records with written text.
    pub journal_count: usize,
    /// Every check-in, mood-only or not.
    pub total_moods: usize,
}

pub fn profile_counts(records: &[JournalRecord]) -> ProfileCounts {
    ProfileCounts {
        journal_count: records.iter().filter(|r| !r.is_mood_only()).count(),
        total_moods: records.len(),
    }
}
