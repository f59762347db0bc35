use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown mood: {0}")]
    UnknownMood(String),

    #[error("unknown focus area: {0}")]
    UnknownFocusArea(String),

    #[error("unsupported lookback window: {0} days (expected 7, 14 or 30)")]
    UnsupportedWindow(u32),
}

/// Visual variant for a mood badge.
///
/// Backend moods are free-form, so this is total: anything outside the known
/// set resolves to `Neutral`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodStyle {
    Happy,
    Sad,
    Anxious,
    Excited,
    Peaceful,
    Stressed,
    Confused,
    Grateful,
    Lonely,
    Energetic,
    Neutral,
}

impl MoodStyle {
    pub fn for_mood(mood: &str) -> Self {
        match mood.trim().to_lowercase().as_str() {
            "happy" => MoodStyle::Happy,
            "sad" => MoodStyle::Sad,
            "anxious" => MoodStyle::Anxious,
            "excited" => MoodStyle::Excited,
            "peaceful" => MoodStyle::Peaceful,
            "stressed" => MoodStyle::Stressed,
            "confused" => MoodStyle::Confused,
            "grateful" => MoodStyle::Grateful,
            "lonely" => MoodStyle::Lonely,
            "energetic" => MoodStyle::Energetic,
            _ => MoodStyle::Neutral,
        }
    }

    /// Stable class name for web renderers.
    pub fn css_class(self) -> &'static str {
        match self {
            MoodStyle::Happy => "mood-happy",
            MoodStyle::Sad => "mood-sad",
            MoodStyle::Anxious => "mood-anxious",
            MoodStyle::Excited => "mood-excited",
            MoodStyle::Peaceful => "mood-peaceful",
            MoodStyle::Stressed => "mood-stressed",
            MoodStyle::Confused => "mood-confused",
            MoodStyle::Grateful => "mood-grateful",
            MoodStyle::Lonely => "mood-lonely",
            MoodStyle::Energetic => "mood-energetic",
            MoodStyle::Neutral => "mood-neutral",
        }
    }

    /// SGR color code for terminal renderers.
    pub fn ansi_color(self) -> u8 {
        match self {
            MoodStyle::Happy => 33,
            MoodStyle::Sad => 34,
            MoodStyle::Anxious => 91,
            MoodStyle::Excited => 32,
            MoodStyle::Peaceful => 36,
            MoodStyle::Stressed => 31,
            MoodStyle::Confused => 35,
            MoodStyle::Grateful => 92,
            MoodStyle::Lonely => 90,
            MoodStyle::Energetic => 95,
            MoodStyle::Neutral => 37,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodBadge {
    pub label: String,
    pub style: MoodStyle,
}

impl MoodBadge {
    pub fn new(mood: &str) -> Self {
        Self {
            label: mood.to_string(),
            style: MoodStyle::for_mood(mood),
        }
    }
}

/// Moods the user can pick when asking for a reflection prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Happy,
    Sad,
    Anxious,
    Excited,
    Peaceful,
    Stressed,
    Confused,
    Grateful,
    Lonely,
    Energetic,
}

impl Mood {
    pub const ALL: [Mood; 10] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Anxious,
        Mood::Excited,
        Mood::Peaceful,
        Mood::Stressed,
        Mood::Confused,
        Mood::Grateful,
        Mood::Lonely,
        Mood::Energetic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Anxious => "anxious",
            Mood::Excited => "excited",
            Mood::Peaceful => "peaceful",
            Mood::Stressed => "stressed",
            Mood::Confused => "confused",
            Mood::Grateful => "grateful",
            Mood::Lonely => "lonely",
            Mood::Energetic => "energetic",
        }
    }

    pub fn style(self) -> MoodStyle {
        MoodStyle::for_mood(self.as_str())
    }
}

impl std::str::FromStr for Mood {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Mood::ALL
            .into_iter()
            .find(|m| m.as_str() == needle)
            .ok_or_else(|| ParseError::UnknownMood(s.to_string()))
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serializes as its wire label, so snapshots and requests agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FocusArea {
    Relationships,
    Work,
    Health,
    PersonalGrowth,
    Creativity,
    StressManagement,
    Gratitude,
    SelfCare,
}

impl FocusArea {
    pub const ALL: [FocusArea; 8] = [
        FocusArea::Relationships,
        FocusArea::Work,
        FocusArea::Health,
        FocusArea::PersonalGrowth,
        FocusArea::Creativity,
        FocusArea::StressManagement,
        FocusArea::Gratitude,
        FocusArea::SelfCare,
    ];

    /// Wire label, as sent in `focus_area`.
    pub fn as_str(self) -> &'static str {
        match self {
            FocusArea::Relationships => "relationships",
            FocusArea::Work => "work",
            FocusArea::Health => "health",
            FocusArea::PersonalGrowth => "personal growth",
            FocusArea::Creativity => "creativity",
            FocusArea::StressManagement => "stress management",
            FocusArea::Gratitude => "gratitude",
            FocusArea::SelfCare => "self-care",
        }
    }
}

impl std::str::FromStr for FocusArea {
    type Err = ParseError;

    // Accepts "personal growth", "personal-growth" and "personal_growth".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalize = |v: &str| v.trim().to_lowercase().replace(['-', '_'], " ");
        let needle = normalize(s);
        FocusArea::ALL
            .into_iter()
            .find(|a| normalize(a.as_str()) == needle)
            .ok_or_else(|| ParseError::UnknownFocusArea(s.to_string()))
    }
}

impl TryFrom<String> for FocusArea {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FocusArea> for String {
    fn from(area: FocusArea) -> Self {
        area.as_str().to_string()
    }
}

impl std::fmt::Display for FocusArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
