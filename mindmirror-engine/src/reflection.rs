use std::sync::Arc;

use mindmirror_core::mood::{FocusArea, Mood, MoodBadge};
use mindmirror_core::types::ReflectionRequest;
use tokio::sync::Mutex;

use crate::abandon::AbandonGuard;
use crate::error::ViewError;
use crate::render::ReflectionSnapshot;
use crate::traits::BackendApi;

pub const MOOD_REQUIRED_MESSAGE: &str = "Please select your current mood";
pub const GENERATE_FAILED_MESSAGE: &str = "Failed to generate reflection. Please try again.";

#[derive(Debug, Default)]
struct Inner {
    mood: Option<Mood>,
    focus_area: Option<FocusArea>,
    generating: bool,
    reflection: Option<String>,
    error: Option<String>,
}

/// Pick a mood and an optional focus area, then ask the backend for a prompt.
#[derive(Clone)]
pub struct ReflectionView {
    backend: Arc<dyn BackendApi>,
    inner: Arc<Mutex<Inner>>,
}

impl ReflectionView {
    pub fn new(backend: Arc<dyn BackendApi>) -> Self {
        Self {
            backend,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    pub async fn select_mood(&self, mood: Mood) {
        let mut inner = self.inner.lock().await;
        inner.mood = Some(mood);
        // A stale validation message would contradict the new selection.
        if inner.error.as_deref() == Some(MOOD_REQUIRED_MESSAGE) {
            inner.error = None;
        }
    }

    /// Selecting the active focus area clears it; any other replaces it.
    pub async fn toggle_focus_area(&self, area: FocusArea) -> Option<FocusArea> {
        let mut inner = self.inner.lock().await;
        inner.focus_area = if inner.focus_area == Some(area) {
            None
        } else {
            Some(area)
        };
        inner.focus_area
    }

    pub async fn generate(&self) -> Result<String, ViewError> {
        let request = {
            let mut inner = self.inner.lock().await;
            if inner.generating {
                return Err(ViewError::Busy);
            }
            let Some(mood) = inner.mood else {
                inner.error = Some(MOOD_REQUIRED_MESSAGE.into());
                return Err(ViewError::Validation(MOOD_REQUIRED_MESSAGE.into()));
            };
            inner.generating = true;
            inner.error = None;
            ReflectionRequest {
                current_mood: mood.as_str().to_string(),
                focus_area: inner.focus_area.map(|a| a.as_str().to_string()),
                recent_entries: Vec::new(),
            }
        };

        log::info!(
            "requesting reflection: mood={} focus={:?}",
            request.current_mood,
            request.focus_area
        );
        let guard = AbandonGuard::new(&self.inner, |inner: &mut Inner| {
            inner.generating = false;
        });
        let res = self.backend.reflect(&request).await;

        let mut inner = self.inner.lock().await;
        guard.disarm();
        inner.generating = false;
        match res {
            Ok(result) => {
                inner.reflection = Some(result.reflection.clone());
                Ok(result.reflection)
            }
            Err(cause) => {
                log::error!("reflection failed: {cause}");
                inner.error = Some(GENERATE_FAILED_MESSAGE.into());
                Err(ViewError::request(GENERATE_FAILED_MESSAGE, cause))
            }
        }
    }

    pub async fn snapshot(&self) -> ReflectionSnapshot {
        let inner = self.inner.lock().await;
        ReflectionSnapshot {
            mood: inner.mood,
            mood_badge: inner.mood.map(|m| MoodBadge::new(m.as_str())),
            focus_area: inner.focus_area,
            can_generate: inner.mood.is_some() && !inner.generating,
            is_generating: inner.generating,
            reflection: inner.reflection.clone(),
            error: inner.error.clone(),
        }
    }
}
