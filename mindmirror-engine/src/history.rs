use std::sync::Arc;

use mindmirror_core::types::{UserHistory, UserId};
use mindmirror_core::window::LookbackWindow;
use tokio::sync::Mutex;

use crate::abandon::AbandonGuard;
use crate::error::ViewError;
use crate::render::{HistoryContent, HistorySnapshot};
use crate::traits::BackendApi;

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load history. Please try again.";

#[derive(Debug, Default)]
struct Inner {
    window: LookbackWindow,
    // Bumped on every fetch; only the newest fetch may write its result back.
    generation: u64,
    loading: bool,
    history: Option<UserHistory>,
    error: Option<String>,
}

/// Past entries and mood statistics over a lookback window.
#[derive(Clone)]
pub struct HistoryView {
    backend: Arc<dyn BackendApi>,
    user_id: UserId,
    inner: Arc<Mutex<Inner>>,
}

impl HistoryView {
    pub fn new(backend: Arc<dyn BackendApi>, user_id: UserId, window: LookbackWindow) -> Self {
        Self {
            backend,
            user_id,
            inner: Arc::new(Mutex::new(Inner {
                window,
                ..Inner::default()
            })),
        }
    }

    pub async fn window(&self) -> LookbackWindow {
        self.inner.lock().await.window
    }

    pub async fn history(&self) -> Option<UserHistory> {
        self.inner.lock().await.history.clone()
    }

    /// Fetches history for the current window.
    ///
    /// Returns `Ok(None)` when a newer fetch started while this one was in flight;
    /// its response is dropped without touching view state.
    pub async fn load(&self) -> Result<Option<UserHistory>, ViewError> {
        let (generation, window) = {
            let mut inner = self.inner.lock().await;
            inner.generation += 1;
            inner.loading = true;
            inner.history = None;
            inner.error = None;
            (inner.generation, inner.window)
        };

        log::info!(
            "loading history: user={} window={} generation={}",
            self.user_id,
            window.days(),
            generation
        );
        // Only the newest fetch owns the loading flag.
        let guard = AbandonGuard::new(&self.inner, move |inner: &mut Inner| {
            if inner.generation == generation {
                inner.loading = false;
            }
        });
        let res = self.backend.history(&self.user_id, window).await;

        let mut inner = self.inner.lock().await;
        guard.disarm();
        if inner.generation != generation {
            log::debug!(
                "discarding stale history response: generation {} < {}",
                generation,
                inner.generation
            );
            return Ok(None);
        }
        inner.loading = false;
        match res {
            Ok(history) => {
                log::info!("history loaded: {} entries", history.entries.len());
                inner.history = Some(history.clone());
                Ok(Some(history))
            }
            Err(cause) => {
                log::error!("history load failed: {cause}");
                inner.error = Some(LOAD_FAILED_MESSAGE.into());
                Err(ViewError::request(LOAD_FAILED_MESSAGE, cause))
            }
        }
    }

    /// Switches the window and refetches. Returns `false` without fetching when
    /// `window` is already selected.
    pub async fn select_window(&self, window: LookbackWindow) -> Result<bool, ViewError> {
        {
            let mut inner = self.inner.lock().await;
            if inner.window == window {
                return Ok(false);
            }
            inner.window = window;
        }
        self.load().await?;
        Ok(true)
    }

    /// As [`select_window`](Self::select_window), from a raw day count.
    pub async fn select_days(&self, days: u32) -> Result<bool, ViewError> {
        let window =
            LookbackWindow::try_from(days).map_err(|e| ViewError::Validation(e.to_string()))?;
        self.select_window(window).await
    }

    pub async fn snapshot(&self) -> HistorySnapshot {
        let inner = self.inner.lock().await;
        let content = if inner.loading {
            HistoryContent::Loading
        } else if let Some(error) = &inner.error {
            HistoryContent::Failed {
                error: error.clone(),
            }
        } else if let Some(history) = &inner.history {
            HistoryContent::for_history(history)
        } else {
            HistoryContent::NotLoaded
        };
        HistorySnapshot {
            window: inner.window,
            content,
        }
    }
}
