use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use mindmirror_core::mood::{FocusArea, Mood, MoodStyle};
use mindmirror_core::types::{
    AnalysisResult, EmotionEntry, EmotionalTrends, HealthStatus, OverallTrend, Recording,
    ReflectionRequest, ReflectionResult, TrendReport, UserHistory, UserId,
};
use mindmirror_core::window::LookbackWindow;
use mindmirror_engine::error::{CaptureError, RequestError, ViewError};
use mindmirror_engine::recorder::{ANALYZE_FAILED_MESSAGE, START_FAILED_MESSAGE};
use mindmirror_engine::reflection::{GENERATE_FAILED_MESSAGE, MOOD_REQUIRED_MESSAGE};
use mindmirror_engine::history::LOAD_FAILED_MESSAGE;
use mindmirror_engine::render::HistoryContent;
use mindmirror_engine::traits::{BackendApi, CaptureSession, Microphone};
use mindmirror_engine::{HistoryView, RecorderStage, RecorderView, ReflectionView};
use tokio::sync::Notify;
use tokio::time::timeout;

const GIVE_UP: Duration = Duration::from_millis(50);

#[derive(Default)]
struct Hold {
    started: Notify,
    release: Notify,
}

#[derive(Default)]
struct FakeBackend {
    analyze_calls: AtomicUsize,
    reflect_requests: StdMutex<Vec<ReflectionRequest>>,
    history_calls: StdMutex<Vec<u32>>,
    fail: AtomicBool,
    // When set, analyze/reflect and week-long history fetches wait for `release`.
    hold: Option<Hold>,
}

impl FakeBackend {
    fn held() -> Self {
        Self {
            hold: Some(Hold::default()),
            ..Self::default()
        }
    }

    fn failing() -> Self {
        let b = Self::default();
        b.fail.store(true, Ordering::SeqCst);
        b
    }

    async fn wait_for_release(&self) {
        if let Some(hold) = &self.hold {
            hold.started.notify_one();
            hold.release.notified().await;
        }
    }

    fn check(&self) -> Result<(), RequestError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(RequestError::status(500, "internal error"))
        } else {
            Ok(())
        }
    }
}

fn entry(mood: &str, transcript: &str) -> EmotionEntry {
    EmotionEntry {
        user_id: "default_user".into(),
        timestamp: "2024-01-01T10:00:00".into(),
        transcript: transcript.into(),
        mood: mood.into(),
        summary: "summary".into(),
        reflection: "reflection".into(),
        confidence: 0.8,
        metadata: None,
    }
}

fn history_for(days: u32) -> UserHistory {
    let entries = (0..days as usize).map(|_| entry("happy", "a good day")).collect::<Vec<_>>();
    UserHistory {
        user_id: "default_user".into(),
        total_entries: entries.len() as u32,
        entries,
        trends: EmotionalTrends {
            mood_distribution: [("happy".to_string(), days)].into_iter().collect(),
            overall_trend: OverallTrend::Positive,
            total_entries: days,
            ..Default::default()
        },
    }
}

#[async_trait::async_trait]
impl BackendApi for FakeBackend {
    async fn analyze(
        &self,
        user_id: &UserId,
        recording: &Recording,
    ) -> Result<AnalysisResult, RequestError> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(user_id.as_str(), "default_user");
        assert!(!recording.is_empty());
        self.wait_for_release().await;
        self.check()?;
        Ok(AnalysisResult {
            transcript: "I feel okay today".into(),
            mood: "neutral".into(),
            summary: "A steady day.".into(),
            reflection: "What made today feel steady?".into(),
            timestamp: "2024-01-01T10:00:00Z".into(),
            success: Some(true),
            confidence: None,
        })
    }

    async fn reflect(&self, request: &ReflectionRequest) -> Result<ReflectionResult, RequestError> {
        self.reflect_requests.lock().unwrap().push(request.clone());
        self.wait_for_release().await;
        self.check()?;
        Ok(ReflectionResult {
            reflection: format!("Why do you feel {}?", request.current_mood),
            success: Some(true),
            timestamp: None,
        })
    }

    async fn history(
        &self,
        _user_id: &UserId,
        window: LookbackWindow,
    ) -> Result<UserHistory, RequestError> {
        self.history_calls.lock().unwrap().push(window.days());
        if window == LookbackWindow::Week {
            self.wait_for_release().await;
        }
        self.check()?;
        Ok(history_for(window.days()))
    }

    async fn trends(&self, user_id: &UserId, days: u32) -> Result<TrendReport, RequestError> {
        self.check()?;
        Ok(TrendReport {
            user_id: user_id.to_string(),
            period_days: days,
            trends: EmotionalTrends::default(),
            insights: vec![],
        })
    }

    async fn health(&self) -> Result<HealthStatus, RequestError> {
        self.check()?;
        Ok(HealthStatus {
            message: "ok".into(),
            status: "healthy".into(),
        })
    }
}

#[derive(Default)]
struct FakeMicrophone {
    deny: bool,
    opened: AtomicUsize,
    released: Arc<AtomicUsize>,
    // When set, `open` blocks until a message arrives.
    gate: Option<StdMutex<mpsc::Receiver<()>>>,
}

struct FakeSession {
    released: Arc<AtomicUsize>,
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl CaptureSession for FakeSession {
    fn finish(self: Box<Self>) -> Result<Recording, CaptureError> {
        Ok(Recording::wav(vec![0x52, 0x49, 0x46, 0x46], 1500))
    }
}

impl Microphone for FakeMicrophone {
    fn open(&self) -> Result<Box<dyn CaptureSession>, CaptureError> {
        if let Some(gate) = &self.gate {
            let _ = gate.lock().unwrap().recv();
        }
        if self.deny {
            return Err(CaptureError::PermissionDenied("blocked by user".into()));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            released: self.released.clone(),
        }))
    }
}

fn recorder(backend: Arc<FakeBackend>, mic: Arc<FakeMicrophone>) -> RecorderView {
    RecorderView::new(backend, mic, UserId::default())
}

#[tokio::test]
async fn record_then_analyze_shows_card() {
    let backend = Arc::new(FakeBackend::default());
    let mic = Arc::new(FakeMicrophone::default());
    let view = recorder(backend.clone(), mic.clone());

    view.start_capture().await.unwrap();
    assert_eq!(view.stage().await, RecorderStage::Recording);
    assert!(view.snapshot().await.can_stop);

    view.stop_capture().await.unwrap();
    let snap = view.snapshot().await;
    assert_eq!(snap.stage, RecorderStage::Recorded);
    assert!(snap.can_submit);
    assert_eq!(snap.recording_duration_ms, Some(1500));
    assert_eq!(mic.released.load(Ordering::SeqCst), 1);

    let result = view.submit_for_analysis().await.unwrap();
    assert_eq!(result.mood, "neutral");

    let snap = view.snapshot().await;
    assert_eq!(snap.stage, RecorderStage::Analyzed);
    assert!(!snap.can_submit);
    let card = snap.analysis.unwrap();
    assert_eq!(card.transcript, "\u{201c}I feel okay today\u{201d}");
    assert_eq!(card.mood.style, MoodStyle::Neutral);
    assert_eq!(card.reflection, "What made today feel steady?");
    assert_eq!(backend.analyze_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn denied_microphone_stays_idle_with_message() {
    let mic = Arc::new(FakeMicrophone {
        deny: true,
        ..FakeMicrophone::default()
    });
    let view = recorder(Arc::new(FakeBackend::default()), mic);

    let err = view.start_capture().await.unwrap_err();
    assert!(matches!(err, ViewError::Permission { .. }));
    assert_eq!(err.user_message(), START_FAILED_MESSAGE);

    let snap = view.snapshot().await;
    assert_eq!(snap.stage, RecorderStage::Idle);
    assert!(snap.can_start);
    assert_eq!(snap.error.as_deref(), Some(START_FAILED_MESSAGE));
}

#[tokio::test]
async fn failed_analysis_keeps_recording_for_retry() {
    let backend = Arc::new(FakeBackend::failing());
    let view = recorder(backend.clone(), Arc::new(FakeMicrophone::default()));
    view.attach_recording(Recording::wav(vec![1, 2, 3], 200))
        .await
        .unwrap();

    let err = view.submit_for_analysis().await.unwrap_err();
    assert_eq!(err.user_message(), ANALYZE_FAILED_MESSAGE);

    let snap = view.snapshot().await;
    assert_eq!(snap.stage, RecorderStage::Recorded);
    assert!(snap.can_submit);
    assert!(snap.analysis.is_none());
    assert_eq!(snap.error.as_deref(), Some(ANALYZE_FAILED_MESSAGE));
    assert!(view.recording().await.is_some());

    backend.fail.store(false, Ordering::SeqCst);
    view.submit_for_analysis().await.unwrap();
    assert_eq!(view.stage().await, RecorderStage::Analyzed);
    assert!(view.snapshot().await.error.is_none());
}

#[tokio::test]
async fn concurrent_submit_issues_one_request() {
    let backend = Arc::new(FakeBackend::held());
    let view = recorder(backend.clone(), Arc::new(FakeMicrophone::default()));
    view.attach_recording(Recording::wav(vec![1], 10)).await.unwrap();

    let first = tokio::spawn({
        let view = view.clone();
        async move { view.submit_for_analysis().await }
    });
    let hold = backend.hold.as_ref().unwrap();
    hold.started.notified().await;

    assert!(view.snapshot().await.is_analyzing);
    assert_eq!(view.submit_for_analysis().await.unwrap_err(), ViewError::Busy);
    assert!(view.reset().await.is_err());

    hold.release.notify_one();
    first.await.unwrap().unwrap();
    assert_eq!(backend.analyze_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn reset_releases_open_session_and_clears_result() {
    let mic = Arc::new(FakeMicrophone::default());
    let view = recorder(Arc::new(FakeBackend::default()), mic.clone());

    view.start_capture().await.unwrap();
    assert!(view.start_capture().await.is_err());
    view.reset().await.unwrap();
    assert_eq!(mic.opened.load(Ordering::SeqCst), 1);
    assert_eq!(mic.released.load(Ordering::SeqCst), 1);

    view.start_capture().await.unwrap();
    view.stop_capture().await.unwrap();
    view.submit_for_analysis().await.unwrap();
    view.reset().await.unwrap();

    let snap = view.snapshot().await;
    assert_eq!(snap.stage, RecorderStage::Idle);
    assert!(snap.analysis.is_none());
    assert!(view.recording().await.is_none());
}

#[tokio::test]
async fn dropping_view_releases_microphone() {
    let mic = Arc::new(FakeMicrophone::default());
    let view = recorder(Arc::new(FakeBackend::default()), mic.clone());
    view.start_capture().await.unwrap();
    drop(view);
    assert_eq!(mic.released.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn snapshot_stays_available_while_microphone_opens() {
    let (open_tx, open_rx) = mpsc::channel();
    let mic = Arc::new(FakeMicrophone {
        gate: Some(StdMutex::new(open_rx)),
        ..FakeMicrophone::default()
    });
    let view = recorder(Arc::new(FakeBackend::default()), mic.clone());

    let start = tokio::spawn({
        let view = view.clone();
        async move { view.start_capture().await }
    });
    while view.stage().await != RecorderStage::Starting {
        tokio::task::yield_now().await;
    }

    let snap = timeout(GIVE_UP, view.snapshot()).await.unwrap();
    assert_eq!(snap.stage, RecorderStage::Starting);
    assert!(!snap.can_start);
    assert!(view.start_capture().await.is_err());
    assert!(view.reset().await.is_err());

    open_tx.send(()).unwrap();
    start.await.unwrap().unwrap();
    assert_eq!(view.stage().await, RecorderStage::Recording);
    assert_eq!(mic.opened.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn abandoned_start_returns_to_idle_and_releases_device() {
    let (open_tx, open_rx) = mpsc::channel();
    let mic = Arc::new(FakeMicrophone {
        gate: Some(StdMutex::new(open_rx)),
        ..FakeMicrophone::default()
    });
    let view = recorder(Arc::new(FakeBackend::default()), mic.clone());

    assert!(timeout(GIVE_UP, view.start_capture()).await.is_err());
    assert_eq!(view.stage().await, RecorderStage::Idle);
    assert!(view.snapshot().await.can_start);

    // The late session is dropped as soon as the open completes.
    open_tx.send(()).unwrap();
    while mic.released.load(Ordering::SeqCst) == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(mic.opened.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn abandoned_analysis_keeps_clip_and_allows_retry() {
    let backend = Arc::new(FakeBackend::held());
    let view = recorder(backend.clone(), Arc::new(FakeMicrophone::default()));
    view.attach_recording(Recording::wav(vec![1, 2], 20)).await.unwrap();

    assert!(timeout(GIVE_UP, view.submit_for_analysis()).await.is_err());

    let snap = view.snapshot().await;
    assert_eq!(snap.stage, RecorderStage::Recorded);
    assert!(snap.can_submit);
    assert!(!snap.is_analyzing);
    assert!(view.recording().await.is_some());

    backend.hold.as_ref().unwrap().release.notify_one();
    view.submit_for_analysis().await.unwrap();
    assert_eq!(view.stage().await, RecorderStage::Analyzed);
    assert_eq!(backend.analyze_calls.load(Ordering::SeqCst), 2);

    view.reset().await.unwrap();
    assert_eq!(view.stage().await, RecorderStage::Idle);
}

#[tokio::test]
async fn generate_without_mood_makes_no_request() {
    let backend = Arc::new(FakeBackend::default());
    let view = ReflectionView::new(backend.clone());

    let err = view.generate().await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.user_message(), MOOD_REQUIRED_MESSAGE);
    assert!(backend.reflect_requests.lock().unwrap().is_empty());
    assert!(!view.snapshot().await.can_generate);
}

#[tokio::test]
async fn generate_sends_mood_and_focus() {
    let backend = Arc::new(FakeBackend::default());
    let view = ReflectionView::new(backend.clone());

    view.select_mood(Mood::Happy).await;
    view.select_mood(Mood::Grateful).await;
    assert_eq!(
        view.toggle_focus_area(FocusArea::PersonalGrowth).await,
        Some(FocusArea::PersonalGrowth)
    );

    let prompt = view.generate().await.unwrap();
    assert_eq!(prompt, "Why do you feel grateful?");

    let requests = backend.reflect_requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].current_mood, "grateful");
    assert_eq!(requests[0].focus_area.as_deref(), Some("personal growth"));
    assert!(requests[0].recent_entries.is_empty());

    let snap = view.snapshot().await;
    let json = serde_json::to_value(&snap).unwrap();
    assert_eq!(json["focus_area"], "personal growth");
    assert_eq!(snap.reflection.as_deref(), Some("Why do you feel grateful?"));
    assert_eq!(snap.mood_badge.unwrap().style, MoodStyle::Grateful);
}

#[tokio::test]
async fn toggling_active_focus_area_clears_it() {
    let backend = Arc::new(FakeBackend::default());
    let view = ReflectionView::new(backend.clone());
    view.select_mood(Mood::Peaceful).await;

    view.toggle_focus_area(FocusArea::Work).await;
    assert_eq!(view.toggle_focus_area(FocusArea::Work).await, None);

    view.generate().await.unwrap();
    let requests = backend.reflect_requests.lock().unwrap().clone();
    assert_eq!(requests[0].focus_area, None);
}

#[tokio::test]
async fn failed_generate_sets_message_and_next_attempt_clears_it() {
    let backend = Arc::new(FakeBackend::failing());
    let view = ReflectionView::new(backend.clone());
    view.select_mood(Mood::Anxious).await;

    let err = view.generate().await.unwrap_err();
    assert_eq!(err.user_message(), GENERATE_FAILED_MESSAGE);
    let snap = view.snapshot().await;
    assert_eq!(snap.error.as_deref(), Some(GENERATE_FAILED_MESSAGE));
    assert!(snap.can_generate);

    backend.fail.store(false, Ordering::SeqCst);
    view.generate().await.unwrap();
    assert!(view.snapshot().await.error.is_none());
}

#[tokio::test]
async fn concurrent_generate_is_busy() {
    let backend = Arc::new(FakeBackend::held());
    let view = ReflectionView::new(backend.clone());
    view.select_mood(Mood::Sad).await;

    let first = tokio::spawn({
        let view = view.clone();
        async move { view.generate().await }
    });
    let hold = backend.hold.as_ref().unwrap();
    hold.started.notified().await;

    assert!(view.snapshot().await.is_generating);
    assert_eq!(view.generate().await.unwrap_err(), ViewError::Busy);

    hold.release.notify_one();
    first.await.unwrap().unwrap();
    assert_eq!(backend.reflect_requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn abandoned_generate_can_be_retried() {
    let backend = Arc::new(FakeBackend::held());
    let view = ReflectionView::new(backend.clone());
    view.select_mood(Mood::Lonely).await;

    assert!(timeout(GIVE_UP, view.generate()).await.is_err());
    let snap = view.snapshot().await;
    assert!(!snap.is_generating);
    assert!(snap.can_generate);

    backend.hold.as_ref().unwrap().release.notify_one();
    assert_eq!(view.generate().await.unwrap(), "Why do you feel lonely?");
    assert_eq!(backend.reflect_requests.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn history_window_switch_fetches_once() {
    let backend = Arc::new(FakeBackend::default());
    let view = HistoryView::new(backend.clone(), UserId::default(), LookbackWindow::Week);

    assert!(matches!(view.snapshot().await.content, HistoryContent::NotLoaded));
    view.load().await.unwrap();
    assert!(!view.select_window(LookbackWindow::Week).await.unwrap());
    assert!(view.select_window(LookbackWindow::TwoWeeks).await.unwrap());
    assert!(!view.select_window(LookbackWindow::TwoWeeks).await.unwrap());
    assert!(view.select_window(LookbackWindow::Month).await.unwrap());

    assert_eq!(*backend.history_calls.lock().unwrap(), vec![7, 14, 30]);
    match view.snapshot().await.content {
        HistoryContent::Loaded(stats) => {
            assert_eq!(stats.total_entries, 30);
            assert_eq!(stats.recent.len(), 5);
            assert_eq!(stats.distinct_moods, 1);
        }
        other => panic!("expected loaded history, got {other:?}"),
    }
}

#[tokio::test]
async fn history_rejects_unsupported_day_counts() {
    let backend = Arc::new(FakeBackend::default());
    let view = HistoryView::new(backend.clone(), UserId::default(), LookbackWindow::Month);
    let err = view.select_days(10).await.unwrap_err();
    assert!(err.is_validation());
    assert!(backend.history_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn stale_history_response_is_discarded() {
    let backend = Arc::new(FakeBackend::held());
    let view = HistoryView::new(backend.clone(), UserId::default(), LookbackWindow::Week);

    let first = tokio::spawn({
        let view = view.clone();
        async move { view.load().await }
    });
    let hold = backend.hold.as_ref().unwrap();
    hold.started.notified().await;
    assert!(matches!(view.snapshot().await.content, HistoryContent::Loading));

    view.select_window(LookbackWindow::TwoWeeks).await.unwrap();
    hold.release.notify_one();
    assert_eq!(first.await.unwrap().unwrap(), None);

    let history = view.history().await.unwrap();
    assert_eq!(history.total_entries, 14);
    assert_eq!(view.window().await, LookbackWindow::TwoWeeks);
}

#[tokio::test]
async fn abandoned_history_load_stops_loading() {
    let backend = Arc::new(FakeBackend::held());
    let view = HistoryView::new(backend.clone(), UserId::default(), LookbackWindow::Week);

    assert!(timeout(GIVE_UP, view.load()).await.is_err());
    assert!(matches!(view.snapshot().await.content, HistoryContent::NotLoaded));

    backend.hold.as_ref().unwrap().release.notify_one();
    view.load().await.unwrap();
    assert!(matches!(view.snapshot().await.content, HistoryContent::Loaded(_)));
}

#[tokio::test]
async fn abandoned_older_load_leaves_newer_one_loading() {
    let backend = Arc::new(FakeBackend::held());
    let view = HistoryView::new(backend.clone(), UserId::default(), LookbackWindow::Week);
    let hold = backend.hold.as_ref().unwrap();

    let older = tokio::spawn({
        let view = view.clone();
        async move { view.load().await }
    });
    hold.started.notified().await;

    let newer = tokio::spawn({
        let view = view.clone();
        async move { view.load().await }
    });
    hold.started.notified().await;

    older.abort();
    assert!(older.await.unwrap_err().is_cancelled());
    assert!(matches!(view.snapshot().await.content, HistoryContent::Loading));

    hold.release.notify_one();
    assert!(newer.await.unwrap().unwrap().is_some());
    assert!(matches!(view.snapshot().await.content, HistoryContent::Loaded(_)));
}

#[tokio::test]
async fn failed_history_leaves_history_unset() {
    let backend = Arc::new(FakeBackend::failing());
    let view = HistoryView::new(backend, UserId::default(), LookbackWindow::Month);

    let err = view.load().await.unwrap_err();
    assert_eq!(err.user_message(), LOAD_FAILED_MESSAGE);
    assert!(view.history().await.is_none());
    match view.snapshot().await.content {
        HistoryContent::Failed { error } => assert_eq!(error, LOAD_FAILED_MESSAGE),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn snapshot_serializes_for_front_ends() {
    let backend = Arc::new(FakeBackend::default());
    let view = HistoryView::new(backend, UserId::default(), LookbackWindow::Month);
    view.load().await.unwrap();

    let json = serde_json::to_value(view.snapshot().await).unwrap();
    assert_eq!(json["window"], 30);
    assert_eq!(json["content"]["state"], "loaded");
    assert_eq!(json["content"]["trend"]["indicator"], "up");
}
