//! Protocol Session
//!
//! 요청 하나를 연결에 쓰고, 종료 상태가 올 때까지 응답 프레임을 읽어
//! 하나의 결과로 재조립합니다.
//!
//! | 상태 | 처리 |
//! |------|------|
//! | 204 | 빈 결과로 종료 |
//! | 206 | 항목을 누적하고 계속 |
//! | 200 | 누적 중이면 이 프레임 항목까지 합쳐 하나의 리스트로, 아니면 `data` 그대로 |
//! | 407 | 같은 연결에 SASL PLAIN 인증 요청을 쓰고 계속 |
//! | 그 외 | [`DriverError::Server`] |

use std::time::Duration;

use bytes::Bytes;
use serde_json::value::RawValue;
use tokio_util::sync::CancellationToken;

use super::auth::Credentials;
use super::connection::Connection;
use super::error::{DriverError, DriverResult};
use super::output::RawOutput;
use super::with_deadline;
use crate::protocol::{GremlinCodec, Request, Response, StatusCode};

// ============================================================================
// ProtocolSession - 프로토콜 세션
// ============================================================================

/// 요청/응답 교환기
///
/// 연결 상태를 갖지 않으므로 여러 작업이 공유할 수 있습니다. 연결은 호출자가
/// 독점해서 넘겨야 합니다.
#[derive(Debug, Clone, Default)]
pub struct ProtocolSession {
    /// 인증 정보 (407 응답용)
    credentials: Option<Credentials>,
    /// 요청/응답 코덱
    codec: GremlinCodec,
    /// 교환 전체 타임아웃
    request_timeout: Option<Duration>,
    /// 요청 전체를 trace 로 기록
    trace_requests: bool,
}

impl ProtocolSession {
    /// 새 세션 생성
    pub fn new(credentials: Option<Credentials>) -> Self {
        Self {
            credentials,
            ..Default::default()
        }
    }

    /// 교환 타임아웃 설정
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// 요청 trace 기록 설정
    pub fn with_trace_requests(mut self, enabled: bool) -> Self {
        self.trace_requests = enabled;
        self
    }

    /// 인증 정보
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// 요청을 실행하고 결과를 재조립
    ///
    /// 상대방이 닫은 연결에 쓰면 [`DriverError::ConnClosed`] 입니다.
    /// `cancel` 이 취소되면 [`DriverError::Canceled`] 로 끝나며, 이때 연결의
    /// 스트림 상태는 알 수 없습니다.
    pub async fn execute<T>(
        &self,
        conn: &mut T,
        request: &Request,
        cancel: &CancellationToken,
    ) -> DriverResult<RawOutput>
    where
        T: Connection + ?Sized,
    {
        if cancel.is_cancelled() {
            return Err(DriverError::Canceled);
        }

        let exchange = with_deadline(self.request_timeout, "request timeout", self.exchange(conn, request));
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(DriverError::Canceled),
            result = exchange => result,
        }
    }

    async fn exchange<T>(&self, conn: &mut T, request: &Request) -> DriverResult<RawOutput>
    where
        T: Connection + ?Sized,
    {
        tracing::debug!(request_id = %request.request_id, op = %request.op(), "submitting request");
        if self.trace_requests {
            tracing::trace!(request = ?request, "request");
        }

        conn.send(self.frame(request)?).await?;

        let mut batch: Vec<Box<RawValue>> = Vec::new();
        let mut batching = false;
        let mut challenged = false;

        loop {
            let message = conn.recv().await?;
            let response = self.codec.decode_response(&message)?;
            let code = response.code();

            match code {
                StatusCode::NO_CONTENT => return Ok(RawOutput::empty()),
                StatusCode::PARTIAL_CONTENT => {
                    batch.extend(items(&response)?);
                    batching = true;
                }
                StatusCode::SUCCESS => {
                    if batching {
                        batch.extend(items(&response)?);
                        tracing::debug!(request_id = %request.request_id, items = batch.len(), "batched response complete");
                        return RawOutput::from_items(&batch);
                    }
                    return Ok(response
                        .result
                        .data
                        .as_deref()
                        .map(RawOutput::verbatim)
                        .unwrap_or_default());
                }
                StatusCode::AUTHENTICATE => {
                    let credentials = self.credentials.as_ref().ok_or_else(|| {
                        DriverError::authentication(
                            "server requested authentication but no credentials are configured",
                        )
                    })?;
                    if challenged {
                        return Err(DriverError::authentication(
                            "server repeated the authentication challenge",
                        ));
                    }
                    challenged = true;

                    tracing::debug!(
                        request_id = %request.request_id,
                        username = credentials.username(),
                        "answering authentication challenge"
                    );
                    let auth = credentials.authentication_request(request.request_id);
                    conn.send(self.frame(&auth)?).await?;
                }
                _ => {
                    tracing::debug!(request_id = %request.request_id, code = %code, "request failed");
                    return Err(DriverError::server(code, response.status.message));
                }
            }
        }
    }

    fn frame(&self, request: &Request) -> DriverResult<Bytes> {
        let mut codec = self.codec.clone();
        Ok(codec.encode_request(request)?)
    }
}

/// 배치 프레임의 항목들 (`data` 가 없거나 null 이면 빈 목록)
fn items(response: &Response) -> DriverResult<Vec<Box<RawValue>>> {
    response
        .result
        .items()
        .map_err(|e| DriverError::decode(format!("partial result is not a list: {}", e)))
}

// ============================================================================
// Tests
// ============================================================================
