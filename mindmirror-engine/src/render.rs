//! Render snapshots: plain data describing what each view shows.
//!
//! Views never talk to a UI toolkit; a front end takes a snapshot and draws it.

use mindmirror_core::mood::{FocusArea, Mood, MoodBadge};
use mindmirror_core::text::{format_timestamp, quote, truncate_transcript};
use mindmirror_core::types::{AnalysisResult, EmotionEntry, OverallTrend, TrendIndicator, UserHistory};
use mindmirror_core::window::LookbackWindow;
use serde::Serialize;

use crate::recorder::RecorderStage;

pub const MAX_RECENT_ENTRIES: usize = 5;
pub const EMPTY_HISTORY_TITLE: &str = "Start Your Journey";
pub const EMPTY_HISTORY_MESSAGE: &str =
    "You haven't recorded any reflections yet. Begin by sharing your thoughts!";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisCard {
    pub transcript: String,
    pub mood: MoodBadge,
    pub summary: String,
    pub reflection: String,
    pub recorded_at: String,
}

impl AnalysisCard {
    pub fn from_result(result: &AnalysisResult) -> Self {
        Self {
            transcript: quote(&result.transcript),
            mood: MoodBadge::new(&result.mood),
            summary: result.summary.clone(),
            reflection: result.reflection.clone(),
            recorded_at: format_timestamp(&result.timestamp),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecorderSnapshot {
    pub stage: RecorderStage,
    pub can_start: bool,
    pub can_stop: bool,
    pub can_reset: bool,
    /// The submit-for-analysis affordance; hidden once a result is shown.
    pub can_submit: bool,
    pub is_analyzing: bool,
    pub recording_duration_ms: Option<u64>,
    pub analysis: Option<AnalysisCard>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReflectionSnapshot {
    pub mood: Option<Mood>,
    pub mood_badge: Option<MoodBadge>,
    pub focus_area: Option<FocusArea>,
    pub can_generate: bool,
    pub is_generating: bool,
    pub reflection: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendBadge {
    pub trend: OverallTrend,
    pub indicator: TrendIndicator,
    pub label: String,
}

impl TrendBadge {
    pub fn new(trend: OverallTrend) -> Self {
        Self {
            trend,
            indicator: trend.indicator(),
            label: format!("{} Trend", trend.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodCount {
    pub mood: MoodBadge,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryCard {
    pub mood: MoodBadge,
    pub recorded_at: String,
    pub transcript: String,
    pub summary: String,
    pub reflection: String,
    pub confidence: f64,
}

impl EntryCard {
    pub fn from_entry(entry: &EmotionEntry) -> Self {
        Self {
            mood: MoodBadge::new(&entry.mood),
            recorded_at: format_timestamp(&entry.timestamp),
            transcript: quote(&truncate_transcript(&entry.transcript)),
            summary: entry.summary.clone(),
            reflection: entry.reflection.clone(),
            confidence: entry.confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryStats {
    pub total_entries: u32,
    pub trend: TrendBadge,
    pub distinct_moods: usize,
    pub distribution: Vec<MoodCount>,
    pub recent: Vec<EntryCard>,
}

impl HistoryStats {
    pub fn from_history(history: &UserHistory) -> Self {
        let distribution = history
            .trends
            .mood_distribution
            .iter()
            .map(|(mood, count)| MoodCount {
                mood: MoodBadge::new(mood),
                count: *count,
            })
            .collect::<Vec<_>>();

        Self {
            total_entries: history.total_entries,
            trend: TrendBadge::new(history.trends.overall_trend),
            distinct_moods: distribution.len(),
            distribution,
            recent: history
                .entries
                .iter()
                .take(MAX_RECENT_ENTRIES)
                .map(EntryCard::from_entry)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum HistoryContent {
    /// No fetch has been issued yet.
    NotLoaded,
    /// A fetch is in flight; earlier content is hidden rather than shown stale.
    Loading,
    Failed { error: String },
    /// Onboarding call-to-action in place of stats and entries.
    Empty { title: String, message: String },
    Loaded(HistoryStats),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySnapshot {
    pub window: LookbackWindow,
    pub content: HistoryContent,
}

impl HistoryContent {
    pub fn for_history(history: &UserHistory) -> Self {
        if history.entries.is_empty() {
            HistoryContent::Empty {
                title: EMPTY_HISTORY_TITLE.into(),
                message: EMPTY_HISTORY_MESSAGE.into(),
            }
        } else {
            HistoryContent::Loaded(HistoryStats::from_history(history))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindmirror_core::mood::MoodStyle;
    use mindmirror_core::types::EmotionalTrends;

    fn entry(i: usize, transcript: &str, mood: &str) -> EmotionEntry {
        EmotionEntry {
            user_id: "default_user".into(),
            timestamp: format!("2024-01-{:02}T09:00:00", i + 1),
            transcript: transcript.into(),
            mood: mood.into(),
            summary: "s".into(),
            reflection: "r".into(),
            confidence: 0.8,
            metadata: None,
        }
    }

    #[test]
    fn analysis_card_renders_neutral_scenario() {
        let result = AnalysisResult {
            transcript: "I feel okay today".into(),
            mood: "neutral".into(),
            summary: "A steady day.".into(),
            reflection: "What made today feel steady?".into(),
            timestamp: "2024-01-01T10:00:00Z".into(),
            success: None,
            confidence: None,
        };
        let card = AnalysisCard::from_result(&result);
        assert_eq!(card.transcript, "\u{201c}I feel okay today\u{201d}");
        assert_eq!(card.mood.style, MoodStyle::Neutral);
        assert_eq!(card.summary, "A steady day.");
        assert_eq!(card.reflection, "What made today feel steady?");
        assert_eq!(card.recorded_at, "Jan 1, 2024 10:00 AM");
    }

    #[test]
    fn stats_cap_recent_entries_and_truncate() {
        let long = "x".repeat(150);
        let entries: Vec<_> = (0..12).map(|i| entry(i, &long, "happy")).collect();
        let history = UserHistory {
            user_id: "default_user".into(),
            total_entries: entries.len() as u32,
            entries,
            trends: EmotionalTrends {
                mood_distribution: [("happy".to_string(), 12), ("glum".to_string(), 1)]
                    .into_iter()
                    .collect(),
                overall_trend: OverallTrend::Positive,
                ..Default::default()
            },
        };

        let stats = HistoryStats::from_history(&history);
        assert_eq!(stats.recent.len(), MAX_RECENT_ENTRIES);
        assert_eq!(stats.total_entries, 12);
        assert_eq!(stats.distinct_moods, 2);
        assert_eq!(stats.trend.indicator, TrendIndicator::Up);
        assert_eq!(stats.trend.label, "positive Trend");
        let glum = stats.distribution.iter().find(|c| c.mood.label == "glum").unwrap();
        assert_eq!(glum.mood.style, MoodStyle::Neutral);

        let expected = quote(&format!("{}...", "x".repeat(100)));
        assert!(stats.recent.iter().all(|c| c.transcript == expected));
    }

    #[test]
    fn empty_history_is_call_to_action() {
        let history = UserHistory {
            user_id: "default_user".into(),
            entries: vec![],
            trends: EmotionalTrends::default(),
            total_entries: 0,
        };
        match HistoryContent::for_history(&history) {
            HistoryContent::Empty { title, .. } => assert_eq!(title, EMPTY_HISTORY_TITLE),
            other => panic!("expected empty state, got {other:?}"),
        }
    }
}
