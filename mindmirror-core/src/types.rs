use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

pub const DEFAULT_USER_ID: &str = "default_user";
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new(DEFAULT_USER_ID)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of analyzing one submitted recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub transcript: String,
    pub mood: String,
    pub summary: String,
    pub reflection: String,
    pub timestamp: String,

    // Sent by the backend alongside the result; not needed for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// One persisted journal record. Backend-owned and read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionEntry {
    pub user_id: String,
    pub timestamp: String,
    pub transcript: String,
    pub mood: String,
    pub summary: String,
    pub reflection: String,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

fn default_confidence() -> f64 {
    DEFAULT_CONFIDENCE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OverallTrend {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl OverallTrend {
    pub fn as_str(self) -> &'static str {
        match self {
            OverallTrend::Positive => "positive",
            OverallTrend::Negative => "negative",
            OverallTrend::Neutral => "neutral",
        }
    }

    /// Lenient parse: anything that is not positive/negative is neutral.
    pub fn from_label(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "positive" => OverallTrend::Positive,
            "negative" => OverallTrend::Negative,
            _ => OverallTrend::Neutral,
        }
    }

    pub fn indicator(self) -> TrendIndicator {
        match self {
            OverallTrend::Positive => TrendIndicator::Up,
            OverallTrend::Negative => TrendIndicator::Down,
            OverallTrend::Neutral => TrendIndicator::Flat,
        }
    }
}

impl Serialize for OverallTrend {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OverallTrend {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(OverallTrend::from_label(&raw))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendIndicator {
    Up,
    Down,
    Flat,
}

impl TrendIndicator {
    pub fn glyph(self) -> &'static str {
        match self {
            TrendIndicator::Up => "📈",
            TrendIndicator::Down => "📉",
            TrendIndicator::Flat => "➡️",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmotionalTrends {
    #[serde(default)]
    pub mood_distribution: BTreeMap<String, u32>,
    #[serde(default)]
    pub weekly_patterns: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub overall_trend: OverallTrend,
    // The backend omits this for empty histories.
    #[serde(default)]
    pub total_entries: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserHistory {
    pub user_id: String,
    /// Most recent first.
    #[serde(default)]
    pub entries: Vec<EmotionEntry>,
    #[serde(default)]
    pub trends: EmotionalTrends,
    #[serde(default)]
    pub total_entries: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectionRequest {
    pub current_mood: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_area: Option<String>,
    #[serde(default)]
    pub recent_entries: Vec<EmotionEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflectionResult {
    pub reflection: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendReport {
    pub user_id: String,
    pub period_days: u32,
    #[serde(default)]
    pub trends: EmotionalTrends,
    #[serde(default)]
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub message: String,
    pub status: String,
}

/// A finished audio clip ready for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct Recording {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    pub duration_ms: u64,
}

impl Recording {
    pub const FILENAME: &'static str = "recording.wav";
    pub const MIME_TYPE: &'static str = "audio/wav";

    pub fn wav(bytes: Vec<u8>, duration_ms: u64) -> Self {
        Self {
            filename: Self::FILENAME.into(),
            mime_type: Self::MIME_TYPE.into(),
            bytes,
            duration_ms,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for Recording {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recording")
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("bytes_len", &self.bytes.len())
            .field("duration_ms", &self.duration_ms)
            .finish()
    }
}
