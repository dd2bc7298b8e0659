//! Journal records, mood labels and timestamp handling.
//!
//! Everything in this module is pure: it operates on in-memory record
//! snapshots handed over by a [`crate::repository::JournalRepository`].

pub mod date_resolver;
pub mod mood;
pub mod query;
pub mod record;

pub use date_resolver::ResolvedDate;
pub use mood::Mood;
pub use query::{MoodFilter, RecordQuery, SortOrder};
pub use record::{JournalRecord, NewRecord, RecordPatch};
