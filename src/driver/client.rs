//! Client Facade
//!
//! 풀에서 연결을 얻어 요청 하나를 실행하고 연결을 돌려주는 진입점.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::config::ClientConfig;
use super::connection::Connector;
use super::error::DriverResult;
use super::output::RawOutput;
use super::pool::{ConnectionPool, PoolMetrics};
use super::session::ProtocolSession;
use super::websocket::WsConnector;
use crate::protocol::{EvalArgs, Request, RequestArgs};

/// Eval 요청에 항상 지정되는 스크립트 언어
pub const GREMLIN_GROOVY: &str = "gremlin-groovy";

// ============================================================================
// Client - 클라이언트
// ============================================================================

/// Gremlin 서버 클라이언트
///
/// 여러 작업이 동시에 사용할 수 있습니다. 복제본은 같은 풀을 공유합니다.
pub struct Client<C: Connector = WsConnector> {
    /// 설정
    config: Arc<ClientConfig>,
    /// 연결 풀
    pool: Arc<ConnectionPool<C>>,
    /// 프로토콜 세션
    session: ProtocolSession,
}

impl Client<WsConnector> {
    /// WebSocket 으로 서버에 연결
    ///
    /// 풀 워밍업 중 연결 실패는 무시됩니다. 서버에 닿지 않으면 첫 요청이
    /// 실패합니다.
    pub async fn connect(config: ClientConfig) -> DriverResult<Self> {
        let connector = WsConnector::new(config.url.clone());
        Self::with_connector(connector, config).await
    }
}

impl<C: Connector> Client<C> {
    /// 임의의 전송으로 클라이언트 생성
    pub async fn with_connector(connector: C, config: ClientConfig) -> DriverResult<Self> {
        config.validate()?;

        let pool = ConnectionPool::new(connector, config.pool.clone()).await?;
        let session = ProtocolSession::new(config.credentials.clone())
            .with_request_timeout(config.request_timeout)
            .with_trace_requests(config.trace_requests);

        tracing::debug!(url = %config.url, "client ready");

        Ok(Self {
            config: Arc::new(config),
            pool: Arc::new(pool),
            session,
        })
    }

    /// 스크립트 실행
    pub async fn eval(&self, args: EvalArgs) -> DriverResult<RawOutput> {
        self.eval_with_cancel(args, &CancellationToken::new()).await
    }

    /// 취소 가능한 스크립트 실행
    ///
    /// 언어는 항상 `gremlin-groovy` 로 지정되고 새 request id 가 붙습니다.
    pub async fn eval_with_cancel(
        &self,
        mut args: EvalArgs,
        cancel: &CancellationToken,
    ) -> DriverResult<RawOutput> {
        args.language = Some(GREMLIN_GROOVY.to_string());
        self.submit_with_cancel(Request::new(RequestArgs::Eval(args)), cancel)
            .await
    }

    /// 임의의 요청 실행
    pub async fn submit(&self, request: Request) -> DriverResult<RawOutput> {
        self.submit_with_cancel(request, &CancellationToken::new()).await
    }

    /// 취소 가능한 임의의 요청 실행
    ///
    /// 연결은 성공/실패와 관계없이 풀로 돌아갑니다. 교환 에러가 반환 에러보다
    /// 우선합니다.
    pub async fn submit_with_cancel(
        &self,
        request: Request,
        cancel: &CancellationToken,
    ) -> DriverResult<RawOutput> {
        let mut conn = self.pool.acquire(cancel).await?;

        let result = self
            .session
            .execute(conn.connection_mut(), &request, cancel)
            .await;

        if let Err(e) = &result {
            if e.poisons_connection() {
                tracing::debug!(connection_id = conn.id(), error = %e, "discarding connection");
                conn.mark_broken();
            }
        }

        let released = self.pool.release(conn).await;
        let output = result?;
        released?;
        Ok(output)
    }

    /// 클라이언트 닫기 (풀의 모든 유휴 연결을 닫음)
    pub async fn close(&self) -> DriverResult<()> {
        self.pool.close().await
    }

    /// 풀 메트릭
    pub fn metrics(&self) -> PoolMetrics {
        self.pool.metrics()
    }

    /// 설정
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// 열린 상태 확인
    pub fn is_open(&self) -> bool {
        self.pool.is_open()
    }
}

impl<C: Connector> Clone for Client<C> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            pool: self.pool.clone(),
            session: self.session.clone(),
        }
    }
}

impl<C: Connector> std::fmt::Debug for Client<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("url", &self.config.url)
            .field("pool", &self.pool)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
