//! Plain-text rendering of view snapshots for the terminal.

use std::fmt::Write as _;

use mindmirror_core::mood::MoodBadge;
use mindmirror_core::types::{HealthStatus, TrendReport};
use mindmirror_engine::render::{
    AnalysisCard, HistoryContent, HistorySnapshot, RecorderSnapshot, ReflectionSnapshot,
    TrendBadge,
};

#[derive(Debug, Clone, Copy)]
pub struct Style {
    pub color: bool,
}

impl Style {
    fn paint(self, sgr: u8, text: &str) -> String {
        if self.color {
            format!("\x1b[{sgr}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn bold(self, text: &str) -> String {
        self.paint(1, text)
    }

    fn dim(self, text: &str) -> String {
        self.paint(2, text)
    }

    fn badge(self, badge: &MoodBadge) -> String {
        self.paint(badge.style.ansi_color(), &format!("[{}]", badge.label))
    }

    fn trend(self, trend: &TrendBadge) -> String {
        format!("{} {}", trend.indicator.glyph(), trend.label)
    }
}

pub fn analysis_card(style: Style, card: &AnalysisCard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", style.bold("Your Reflection"));
    let _ = writeln!(out, "{}  {}", style.badge(&card.mood), style.dim(&card.recorded_at));
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", style.bold("What you said"));
    let _ = writeln!(out, "  {}", card.transcript);
    let _ = writeln!(out, "{}", style.bold("Summary"));
    let _ = writeln!(out, "  {}", card.summary);
    let _ = writeln!(out, "{}", style.bold("Reflection prompt"));
    let _ = writeln!(out, "  {}", card.reflection);
    out
}

pub fn recorder(style: Style, snap: &RecorderSnapshot) -> String {
    let mut out = String::new();
    if let Some(card) = &snap.analysis {
        out.push_str(&analysis_card(style, card));
    } else {
        let _ = write!(out, "Recorder: {}", snap.stage.label());
        if let Some(ms) = snap.recording_duration_ms {
            let _ = write!(out, " ({:.1}s clip)", ms as f64 / 1000.0);
        }
        out.push('\n');
    }
    if let Some(err) = &snap.error {
        let _ = writeln!(out, "{}", style.paint(31, err));
    }
    out
}

pub fn reflection(style: Style, snap: &ReflectionSnapshot) -> String {
    let mut out = String::new();
    if let Some(badge) = &snap.mood_badge {
        let _ = write!(out, "Feeling {}", style.badge(badge));
        if let Some(area) = snap.focus_area {
            let _ = write!(out, " · focus: {area}");
        }
        out.push('\n');
    }
    if let Some(prompt) = &snap.reflection {
        let _ = writeln!(out, "{}", style.bold("Your Reflection Prompt"));
        let _ = writeln!(out, "  {prompt}");
    }
    if let Some(err) = &snap.error {
        let _ = writeln!(out, "{}", style.paint(31, err));
    }
    out
}

pub fn history(style: Style, snap: &HistorySnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}",
        style.bold("Your Emotional Journey"),
        style.dim(&format!("(last {})", snap.window.label()))
    );

    match &snap.content {
        HistoryContent::NotLoaded => {
            let _ = writeln!(out, "History has not been loaded.");
        }
        HistoryContent::Loading => {
            let _ = writeln!(out, "Loading...");
        }
        HistoryContent::Failed { error } => {
            let _ = writeln!(out, "{}", style.paint(31, error));
        }
        HistoryContent::Empty { title, message } => {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", style.bold(title));
            let _ = writeln!(out, "{message}");
        }
        HistoryContent::Loaded(stats) => {
            let _ = writeln!(
                out,
                "{} entries · {} moods · {}",
                stats.total_entries,
                stats.distinct_moods,
                style.trend(&stats.trend)
            );
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", style.bold("Mood Distribution"));
            for count in &stats.distribution {
                let _ = writeln!(out, "  {} {}", style.badge(&count.mood), count.count);
            }
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", style.bold("Recent Entries"));
            for entry in &stats.recent {
                let _ = writeln!(
                    out,
                    "  {} {}",
                    style.badge(&entry.mood),
                    style.dim(&entry.recorded_at)
                );
                let _ = writeln!(out, "    {}", entry.transcript);
                let _ = writeln!(out, "    {}", entry.summary);
                if !entry.reflection.is_empty() {
                    let _ = writeln!(
                        out,
                        "    {} {}",
                        style.dim("Reflection prompt:"),
                        entry.reflection
                    );
                }
            }
        }
    }
    out
}

pub fn trend_report(style: Style, report: &TrendReport) -> String {
    let mut out = String::new();
    let badge = TrendBadge::new(report.trends.overall_trend);
    let _ = writeln!(
        out,
        "{} {}",
        style.bold("Trends"),
        style.dim(&format!("(last {} days)", report.period_days))
    );
    let _ = writeln!(
        out,
        "{} entries · {}",
        report.trends.total_entries,
        style.trend(&badge)
    );
    for (mood, count) in &report.trends.mood_distribution {
        let _ = writeln!(out, "  {} {count}", style.badge(&MoodBadge::new(mood)));
    }
    if !report.trends.weekly_patterns.is_empty() {
        let _ = writeln!(out, "{}", style.bold("Weekly patterns"));
        for (day, moods) in &report.trends.weekly_patterns {
            let _ = writeln!(out, "  {day}: {}", moods.join(", "));
        }
    }
    for insight in &report.insights {
        let _ = writeln!(out, "- {insight}");
    }
    out
}

pub fn health(status: &HealthStatus) -> String {
    if status.message.is_empty() {
        format!("{}\n", status.status)
    } else {
        format!("{} ({})\n", status.status, status.message)
    }
}
