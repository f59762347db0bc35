use crate::multipart::MultipartBuilder;
use crate::request::{Body, HttpRequest};
use anyhow::{Context, anyhow};
use mindmirror_core::types::{Recording, ReflectionRequest, UserId};
use mindmirror_core::window::LookbackWindow;
use url::Url;

pub const AUDIO_FIELD: &str = "audio_file";
pub const USER_ID_FIELD: &str = "user_id";

/// `POST /api/analyze` with the clip and user id as multipart form fields.
pub fn build_analyze_request(
    base_url: &str,
    user_id: &UserId,
    recording: &Recording,
) -> anyhow::Result<HttpRequest> {
    let url = endpoint(base_url, &["api", "analyze"])?;

    let form = MultipartBuilder::new();
    let content_type = form.content_type();
    let (boundary, bytes) = form
        .file(
            AUDIO_FIELD,
            &recording.filename,
            &recording.mime_type,
            &recording.bytes,
        )
        .field(USER_ID_FIELD, user_id.as_str())
        .finish();

    Ok(HttpRequest {
        method: "POST".into(),
        url: url.into(),
        headers: vec![
            ("Content-Type".into(), content_type),
            ("Accept".into(), "application/json".into()),
        ],
        body: Body::MultipartFormData { boundary, bytes },
    })
}

/// `POST /api/reflection` with a JSON body.
pub fn build_reflection_request(
    base_url: &str,
    payload: &ReflectionRequest,
) -> anyhow::Result<HttpRequest> {
    let url = endpoint(base_url, &["api", "reflection"])?;
    let json = serde_json::to_string(payload).context("encode reflection request")?;

    Ok(HttpRequest {
        method: "POST".into(),
        url: url.into(),
        headers: vec![
            ("Content-Type".into(), "application/json".into()),
            ("Accept".into(), "application/json".into()),
        ],
        body: Body::Json(json),
    })
}

/// `GET /api/history/{user_id}?days={7|14|30}`.
pub fn build_history_request(
    base_url: &str,
    user_id: &UserId,
    window: LookbackWindow,
) -> anyhow::Result<HttpRequest> {
    let mut url = endpoint(base_url, &["api", "history", user_id.as_str()])?;
    url.query_pairs_mut()
        .append_pair("days", &window.days().to_string());
    Ok(HttpRequest::get(url))
}

/// `GET /api/trends/{user_id}?days={n}`. Unlike history, any positive day count is accepted.
pub fn build_trends_request(
    base_url: &str,
    user_id: &UserId,
    days: u32,
) -> anyhow::Result<HttpRequest> {
    if days == 0 {
        return Err(anyhow!("trend period must be at least one day"));
    }
    let mut url = endpoint(base_url, &["api", "trends", user_id.as_str()])?;
    url.query_pairs_mut().append_pair("days", &days.to_string());
    Ok(HttpRequest::get(url))
}

/// `GET /` health check.
pub fn build_health_request(base_url: &str) -> anyhow::Result<HttpRequest> {
    let url = endpoint(base_url, &[""])?;
    Ok(HttpRequest::get(url))
}

// Appends percent-encoded path segments to whatever path the base URL already has,
// so deployments behind a path prefix keep working.
fn endpoint(base_url: &str, segments: &[&str]) -> anyhow::Result<Url> {
    let mut url =
        Url::parse(base_url.trim()).with_context(|| format!("invalid base url: {base_url}"))?;
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| anyhow!("base url cannot carry a path: {base_url}"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
