//! Client Configuration
//!
//! 클라이언트 설정

use std::time::Duration;

use super::auth::Credentials;
use super::error::{DriverError, DriverResult};
use super::pool::PoolConfig;

/// 기본 서버 URL
pub const DEFAULT_URL: &str = "ws://localhost:8182/gremlin";

// ============================================================================
// ClientConfig - 클라이언트 설정
// ============================================================================

/// 클라이언트 설정
///
/// 한 번 만들면 바뀌지 않습니다. [`ClientConfig::builder`] 로 생성합니다.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// 서버 URL (`ws://` 또는 `wss://`)
    pub url: String,
    /// 인증 정보
    pub credentials: Option<Credentials>,
    /// 풀 설정
    pub pool: PoolConfig,
    /// 요청 타임아웃 (교환 전체)
    pub request_timeout: Option<Duration>,
    /// 요청 전체를 trace 레벨로 기록
    pub trace_requests: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            credentials: None,
            pool: PoolConfig::default(),
            request_timeout: None,
            trace_requests: false,
        }
    }
}

impl ClientConfig {
    /// 빌더 생성
    pub fn builder(url: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder::new(url)
    }

    /// 설정 검증
    pub fn validate(&self) -> DriverResult<()> {
        let scheme_ok = self.url.starts_with("ws://") || self.url.starts_with("wss://");
        if !scheme_ok {
            return Err(DriverError::configuration(format!(
                "Invalid URL scheme: {}",
                self.url
            )));
        }
        if matches!(self.request_timeout, Some(t) if t.is_zero()) {
            return Err(DriverError::configuration("request_timeout must be non-zero"));
        }
        self.pool.validate()
    }
}

// ============================================================================
// ClientConfigBuilder - 설정 빌더
// ============================================================================

/// 클라이언트 설정 빌더
#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// 새 빌더 생성
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            config: ClientConfig {
                url: url.into(),
                ..Default::default()
            },
        }
    }

    /// 인증 정보 설정
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.credentials = Some(Credentials::new(username, password));
        self
    }

    /// 풀 설정
    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.config.pool = pool;
        self
    }

    /// 최소/최대 연결 수 설정
    pub fn with_pool_size(mut self, min: usize, max: usize) -> Self {
        self.config.pool.min_connections = min;
        self.config.pool.max_connections = max;
        self
    }

    /// 연결 획득 타임아웃 설정
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.config.pool.acquire_timeout = Some(timeout);
        self
    }

    /// 요청 타임아웃 설정
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = Some(timeout);
        self
    }

    /// 요청 trace 기록
    pub fn with_trace_requests(mut self, enabled: bool) -> Self {
        self.config.trace_requests = enabled;
        self
    }

    /// 설정 빌드
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
