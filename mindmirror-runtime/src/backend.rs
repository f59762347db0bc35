use mindmirror_core::config::ClientConfig;
use mindmirror_core::types::{
    AnalysisResult, HealthStatus, Recording, ReflectionRequest, ReflectionResult, TrendReport,
    UserHistory, UserId,
};
use mindmirror_core::window::LookbackWindow;
use mindmirror_engine::error::RequestError;
use mindmirror_engine::traits::BackendApi;
use mindmirror_providers::api;
use mindmirror_providers::parse;
use mindmirror_providers::request::HttpRequest;
use mindmirror_providers::runtime::HttpExecutor;

// Enough of an error body to be useful in a log line.
const MAX_ERROR_BODY_CHARS: usize = 300;

/// The MindMirror REST backend over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    executor: HttpExecutor,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, executor: HttpExecutor) -> Self {
        Self {
            base_url: base_url.into(),
            executor,
        }
    }

    pub fn from_config(cfg: &ClientConfig) -> anyhow::Result<Self> {
        let executor = HttpExecutor::new(cfg.connect_timeout(), cfg.request_timeout())?;
        Ok(Self::new(cfg.base_url.clone(), executor))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call<T>(
        &self,
        what: &'static str,
        req: anyhow::Result<HttpRequest>,
        decode: fn(&[u8]) -> anyhow::Result<T>,
    ) -> Result<T, RequestError> {
        let req = req.map_err(|e| RequestError::transport(format!("{what}: {e:#}")))?;

        let resp = self
            .executor
            .execute(&req)
            .await
            .map_err(|e| RequestError::transport(format!("{what}: {e:#}")))?;

        if !resp.is_success() {
            let body = String::from_utf8_lossy(&resp.body);
            let snippet: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(RequestError::status(
                resp.status,
                format!("{what}: {snippet}"),
            ));
        }

        decode(&resp.body).map_err(|e| RequestError::decode(format!("{what}: {e:#}")))
    }
}

#[async_trait::async_trait]
impl BackendApi for HttpBackend {
    async fn analyze(
        &self,
        user_id: &UserId,
        recording: &Recording,
    ) -> Result<AnalysisResult, RequestError> {
        self.call(
            "analyze",
            api::build_analyze_request(&self.base_url, user_id, recording),
            parse::parse_analysis_result,
        )
        .await
    }

    async fn reflect(&self, request: &ReflectionRequest) -> Result<ReflectionResult, RequestError> {
        self.call(
            "reflection",
            api::build_reflection_request(&self.base_url, request),
            parse::parse_reflection_result,
        )
        .await
    }

    async fn history(
        &self,
        user_id: &UserId,
        window: LookbackWindow,
    ) -> Result<UserHistory, RequestError> {
        self.call(
            "history",
            api::build_history_request(&self.base_url, user_id, window),
            parse::parse_user_history,
        )
        .await
    }

    async fn trends(&self, user_id: &UserId, days: u32) -> Result<TrendReport, RequestError> {
        self.call(
            "trends",
            api::build_trends_request(&self.base_url, user_id, days),
            parse::parse_trend_report,
        )
        .await
    }

    async fn health(&self) -> Result<HealthStatus, RequestError> {
        self.call(
            "health",
            api::build_health_request(&self.base_url),
            parse::parse_health_status,
        )
        .await
    }
}
