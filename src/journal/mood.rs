//! The closed set of mood labels and their affect scale.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the six canonical mood labels.
///
/// Records store moods as raw strings; only labels that map to a `Mood`
/// take part in stability scoring. Anything else (including the stray
/// `Disgust` label some external mappings carry) is displayed as-is but
/// never scored.
///
/// # Examples
///
/// ```
/// use sentio::journal::Mood;
///
/// assert_eq!(Mood::from_label("Happy"), Some(Mood::Happy));
/// assert_eq!(Mood::from_label("happy"), None);
/// assert_eq!("happy".parse::<Mood>().unwrap(), Mood::Happy);
/// assert_eq!(Mood::Sad.affect(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Mood {
    Angry,
    Fear,
    Sad,
    Neutral,
    Surprise,
    Happy,
}

impl Mood {
    /// All moods, ordered by affect intensity.
    pub const ALL: [Mood; 6] = [
        Mood::Angry,
        Mood::Fear,
        Mood::Sad,
        Mood::Neutral,
        Mood::Surprise,
        Mood::Happy,
    ];

    /// Exact, case-sensitive lookup of a stored label.
    pub fn from_label(label: &str) -> Option<Mood> {
        Mood::ALL.into_iter().find(|mood| mood.label() == label)
    }

    /// The label as it is written to records.
    pub fn label(self) -> &'static str {
        match self {
            Mood::Angry => "Angry",
            Mood::Fear => "Fear",
            Mood::Sad => "Sad",
            Mood::Neutral => "Neutral",
            Mood::Surprise => "Surprise",
            Mood::Happy => "Happy",
        }
    }

    /// Position on the affect-intensity scale, 1 (Angry) through 6 (Happy).
    ///
    /// The ordering mixes valence and arousal. It is kept as inherited
    /// product policy; changing it changes every stability score.
    pub fn affect(self) -> u8 {
        match self {
            Mood::Angry => 1,
            Mood::Fear => 2,
            Mood::Sad => 3,
            Mood::Neutral => 4,
            Mood::Surprise => 5,
            Mood::Happy => 6,
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Mood::Angry => "😡",
            Mood::Fear => "😨",
            Mood::Sad => "😢",
            Mood::Neutral => "😐",
            Mood::Surprise => "😲",
            Mood::Happy => "😊",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Case-insensitive parsing for user input.
impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Mood::ALL
            .into_iter()
            .find(|mood| mood.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                format!(
                    "Unknown mood '{}'. Expected one of: Angry, Fear, Sad, Neutral, Surprise, Happy",
                    s
                )
            })
    }
}
