//! Journal record types as they live in the store.

use super::date_resolver::{self, ResolvedDate};
use super::mood::Mood;
use serde::{Deserialize, Serialize};

/// A mood check-in, optionally carrying a written journal entry.
///
/// Field names on the wire follow the store's document layout
/// (`createdAt`, `isEdited`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalRecord {
    /// Assigned by the repository on creation.
    pub id: String,
    pub emoji: String,
    /// Raw mood label; may fall outside the canonical six.
    pub mood: String,
    pub title: String,
    pub content: String,
    pub location: String,
    /// Display timestamp, the only ordering key a record has.
    #[serde(rename = "createdAt")]
    pub date: String,
    pub is_edited: bool,
}

impl JournalRecord {
    /// A record with blank title and content is a mood-only check-in.
    pub fn is_mood_only(&self) -> bool {
        self.title.trim().is_empty() && self.content.trim().is_empty()
    }

    /// Canonical mood, if the stored label is one.
    pub fn canonical_mood(&self) -> Option<Mood> {
        Mood::from_label(&self.mood)
    }

    /// Resolved timestamp, if the stored string parses.
    pub fn resolved_date(&self) -> Option<ResolvedDate> {
        date_resolver::parse(&self.date)
    }
}

/// Fields supplied by the writer when a record is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    pub emoji: String,
    pub mood: String,
    pub title: String,
    pub content: String,
    pub location: String,
    #[serde(rename = "createdAt")]
    pub date: String,
}

impl NewRecord {
    /// A mood-only check-in stamped with `date`.
    pub fn mood_only(mood: Mood, date: impl Into<String>) -> Self {
        NewRecord {
            emoji: mood.emoji().to_string(),
            mood: mood.label().to_string(),
            date: date.into(),
            ..NewRecord::default()
        }
    }

    /// Attaches journal text to the check-in.
    pub fn with_text(mut self, title: impl Into<String>, content: impl Into<String>) -> Self {
        self.title = title.into();
        self.content = content.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Materializes the stored record under a repository-assigned id.
    pub fn into_record(self, id: String) -> JournalRecord {
        JournalRecord {
            id,
            emoji: self.emoji,
            mood: self.mood,
            title: self.title,
            content: self.content,
            location: self.location,
            date: self.date,
            is_edited: false,
        }
    }
}

/// Partial update produced by the edit flow.
///
/// Applying any patch marks the record as edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }

    pub fn apply(&self, record: &mut JournalRecord) {
        if let Some(title) = &self.title {
            record.title = title.clone();
        }
        if let Some(content) = &self.content {
            record.content = content.clone();
        }
        record.is_edited = true;
    }
}
