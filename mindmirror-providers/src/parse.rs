use anyhow::Context;
use mindmirror_core::types::{
    AnalysisResult, HealthStatus, ReflectionResult, TrendReport, UserHistory,
};
use serde::de::DeserializeOwned;

fn decode<T: DeserializeOwned>(body: &[u8], what: &'static str) -> anyhow::Result<T> {
    serde_json::from_slice(body).with_context(|| format!("decode {what} JSON"))
}

pub fn parse_analysis_result(body: &[u8]) -> anyhow::Result<AnalysisResult> {
    decode(body, "analysis")
}

pub fn parse_reflection_result(body: &[u8]) -> anyhow::Result<ReflectionResult> {
    decode(body, "reflection")
}

pub fn parse_user_history(body: &[u8]) -> anyhow::Result<UserHistory> {
    decode(body, "history")
}

pub fn parse_trend_report(body: &[u8]) -> anyhow::Result<TrendReport> {
    decode(body, "trend report")
}

pub fn parse_health_status(body: &[u8]) -> anyhow::Result<HealthStatus> {
    decode(body, "health")
}
