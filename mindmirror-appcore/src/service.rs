use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use mindmirror_core::config::ClientConfig;
use mindmirror_core::types::{HealthStatus, TrendReport, UserId};
use mindmirror_core::window::LookbackWindow;
use mindmirror_engine::error::{CaptureError, ViewError};
use mindmirror_engine::traits::{BackendApi, Microphone};
use mindmirror_engine::{HistoryView, RecorderView, ReflectionView};
use mindmirror_runtime::config_store::ConfigStore;
use mindmirror_runtime::mic;
use mindmirror_runtime::HttpBackend;

pub const TRENDS_FAILED_MESSAGE: &str = "Failed to load trends. Please try again.";
pub const HEALTH_FAILED_MESSAGE: &str = "MindMirror backend is unreachable.";

/// Keys accepted by [`apply_setting`].
pub const CONFIG_KEYS: [&str; 6] = [
    "base_url",
    "user_id",
    "connect_timeout_secs",
    "request_timeout_secs",
    "default_history_days",
    "microphone_device",
];

/// Values that win over the config file for this process only.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub user_id: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(&self, cfg: &mut ClientConfig) {
        if let Some(url) = &self.base_url {
            cfg.base_url = url.clone();
        }
        if let Some(user) = &self.user_id {
            cfg.user_id = UserId::new(user.clone());
        }
    }
}

#[cfg(windows)]
const PRIVACY_SETTINGS_HINT: &str = "Check Windows Settings > Privacy & security > Microphone.";
#[cfg(target_os = "macos")]
const PRIVACY_SETTINGS_HINT: &str = "Check System Settings > Privacy & Security > Microphone.";
#[cfg(not(any(windows, target_os = "macos")))]
const PRIVACY_SETTINGS_HINT: &str = "Check your desktop's privacy settings for microphone access.";

pub fn user_facing_capture_error(e: &CaptureError) -> String {
    // Keep messages actionable and short; details are in logs.
    match e {
        CaptureError::NoInputDevice => {
            "No microphone detected. Check your mic and choose the device with `config set microphone_device`.".into()
        }
        CaptureError::PermissionDenied(_) => {
            format!("Microphone access appears blocked. {PRIVACY_SETTINGS_HINT}")
        }
        CaptureError::Unsupported => {
            "Live recording is not available on this platform. Use `analyze FILE` with a WAV recording instead.".into()
        }
        CaptureError::Failed(_) => "Audio recording failed. Check logs for details.".into(),
    }
}

/// Validates and stores one setting. `microphone_device` accepts `default` or an
/// empty value to go back to the system default input.
pub fn apply_setting(cfg: &mut ClientConfig, key: &str, value: &str) -> anyhow::Result<()> {
    let value = value.trim();
    match key {
        "base_url" => {
            let url = url::Url::parse(value).with_context(|| format!("invalid base_url: {value}"))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(anyhow!("base_url must be http or https, got {}", url.scheme()));
            }
            cfg.base_url = value.to_string();
        }
        "user_id" => {
            if value.is_empty() {
                return Err(anyhow!("user_id must not be empty"));
            }
            cfg.user_id = UserId::new(value);
        }
        "connect_timeout_secs" => {
            cfg.connect_timeout_secs = parse_secs(key, value)?;
        }
        "request_timeout_secs" => {
            cfg.request_timeout_secs = parse_secs(key, value)?;
        }
        "default_history_days" => {
            let days: u32 = value
                .parse()
                .with_context(|| format!("{key} must be a number of days"))?;
            cfg.default_history_days = LookbackWindow::try_from(days)?;
        }
        "microphone_device" => {
            cfg.microphone_device = match value {
                "" | "default" => None,
                name => Some(name.to_string()),
            };
        }
        other => {
            return Err(anyhow!(
                "unknown config key: {other} (expected one of: {})",
                CONFIG_KEYS.join(", ")
            ));
        }
    }
    Ok(())
}

fn parse_secs(key: &str, value: &str) -> anyhow::Result<u64> {
    let secs: u64 = value
        .parse()
        .with_context(|| format!("{key} must be a whole number of seconds"))?;
    if secs == 0 {
        return Err(anyhow!("{key} must be at least 1"));
    }
    Ok(secs)
}

/// Wires configuration, backend and microphone together and hands out views.
#[derive(Clone)]
pub struct AppService {
    config_store: ConfigStore,
    config: ClientConfig,
    backend: Arc<dyn BackendApi>,
    microphone: Arc<dyn Microphone>,
}

impl AppService {
    pub fn new(config_path: PathBuf, overrides: &ConfigOverrides) -> anyhow::Result<Self> {
        let config_store = ConfigStore::at_path(config_path);
        let mut config = config_store.load_or_default()?;
        overrides.apply(&mut config);

        let backend = HttpBackend::from_config(&config)?;
        let microphone: Arc<dyn Microphone> =
            Arc::from(mic::default_microphone(config.microphone_device.clone()));

        log::info!(
            "backend {} as user {}",
            config.base_url,
            config.user_id
        );
        Ok(Self::with_parts(
            config_store,
            config,
            Arc::new(backend),
            microphone,
        ))
    }

    pub fn with_parts(
        config_store: ConfigStore,
        config: ClientConfig,
        backend: Arc<dyn BackendApi>,
        microphone: Arc<dyn Microphone>,
    ) -> Self {
        Self {
            config_store,
            config,
            backend,
            microphone,
        }
    }

    /// Effective configuration: the file plus any overrides.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn config_path(&self) -> &std::path::Path {
        self.config_store.path()
    }

    /// The persisted configuration, without overrides.
    pub fn load_config(&self) -> anyhow::Result<ClientConfig> {
        self.config_store.load_or_default()
    }

    pub fn save_config(&self, cfg: &ClientConfig) -> anyhow::Result<()> {
        self.config_store.save(cfg)
    }

    pub fn set_config_value(&self, key: &str, value: &str) -> anyhow::Result<ClientConfig> {
        let mut cfg = self.load_config()?;
        apply_setting(&mut cfg, key, value)?;
        self.save_config(&cfg)?;
        Ok(cfg)
    }

    pub fn recorder_view(&self) -> RecorderView {
        RecorderView::new(
            self.backend.clone(),
            self.microphone.clone(),
            self.config.user_id.clone(),
        )
    }

    pub fn reflection_view(&self) -> ReflectionView {
        ReflectionView::new(self.backend.clone())
    }

    pub fn history_view(&self) -> HistoryView {
        HistoryView::new(
            self.backend.clone(),
            self.config.user_id.clone(),
            self.config.default_history_days,
        )
    }

    pub async fn trend_report(&self, days: u32) -> Result<TrendReport, ViewError> {
        if days == 0 {
            return Err(ViewError::Validation(
                "trend period must be at least one day".into(),
            ));
        }
        self.backend
            .trends(&self.config.user_id, days)
            .await
            .map_err(|cause| {
                log::error!("trend report failed: {cause}");
                ViewError::request(TRENDS_FAILED_MESSAGE, cause)
            })
    }

    pub async fn health(&self) -> Result<HealthStatus, ViewError> {
        self.backend.health().await.map_err(|cause| {
            log::error!("health check failed: {cause}");
            ViewError::request(HEALTH_FAILED_MESSAGE, cause)
        })
    }

    pub fn input_devices(&self) -> Result<Vec<String>, CaptureError> {
        mic::list_input_devices()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindmirror_engine::render::HistoryContent;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn settings_are_validated() {
        let mut cfg = ClientConfig::default();

        apply_setting(&mut cfg, "default_history_days", "14").unwrap();
        assert_eq!(cfg.default_history_days, LookbackWindow::TwoWeeks);
        assert!(apply_setting(&mut cfg, "default_history_days", "10").is_err());

        apply_setting(&mut cfg, "microphone_device", "USB Mic").unwrap();
        assert_eq!(cfg.microphone_device.as_deref(), Some("USB Mic"));
        apply_setting(&mut cfg, "microphone_device", "default").unwrap();
        assert_eq!(cfg.microphone_device, None);

        assert!(apply_setting(&mut cfg, "base_url", "ftp://example.com").is_err());
        assert!(apply_setting(&mut cfg, "request_timeout_secs", "0").is_err());
        assert!(apply_setting(&mut cfg, "user_id", "  ").is_err());
        assert!(apply_setting(&mut cfg, "colour", "blue").is_err());
    }

    #[test]
    fn capture_errors_have_actionable_text() {
        let msg = user_facing_capture_error(&CaptureError::NoInputDevice);
        assert!(msg.starts_with("No microphone detected"));
        let msg = user_facing_capture_error(&CaptureError::Unsupported);
        assert!(msg.contains("analyze FILE"));
    }

    #[tokio::test]
    async fn service_uses_overrides_and_persists_settings() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/history/sam"))
            .and(query_param("days", "30"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"user_id":"sam","entries":[],"trends":{},"total_entries":0}"#,
                "application/json",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");

        let svc = AppService::new(config_path.clone(), &ConfigOverrides::default()).unwrap();
        svc.set_config_value("default_history_days", "30").unwrap();
        svc.set_config_value("user_id", "sam").unwrap();

        let overrides = ConfigOverrides {
            base_url: Some(server.uri()),
            user_id: None,
        };
        let svc = AppService::new(config_path, &overrides).unwrap();
        assert_eq!(svc.config().user_id.as_str(), "sam");
        // Overrides apply to this process only.
        assert_eq!(svc.load_config().unwrap().base_url, ClientConfig::default().base_url);

        let history = svc.history_view();
        history.load().await.unwrap();
        assert!(matches!(
            history.snapshot().await.content,
            HistoryContent::Empty { .. }
        ));
    }

    #[tokio::test]
    async fn trend_report_failure_has_generic_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let overrides = ConfigOverrides {
            base_url: Some(server.uri()),
            user_id: None,
        };
        let svc = AppService::new(dir.path().join("config.json"), &overrides).unwrap();

        let err = svc.trend_report(30).await.unwrap_err();
        assert_eq!(err.user_message(), TRENDS_FAILED_MESSAGE);
        assert!(svc.trend_report(0).await.unwrap_err().is_validation());
        assert!(svc.health().await.is_err());
    }
}
