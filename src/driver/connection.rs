//! Transport seam
//!
//! 연결 풀과 프로토콜 세션은 아래 두 트레이트만 사용합니다. 기본 구현은
//! [`super::websocket`] 의 WebSocket 전송입니다.

use async_trait::async_trait;
use bytes::Bytes;

use super::error::DriverResult;

/// 서버와의 양방향 메시지 채널
///
/// 한 번에 한 호출자만 사용합니다 (`&mut self`).
#[async_trait]
pub trait Connection: Send + 'static {
    /// 메시지 하나를 전송
    ///
    /// 상대방이 이미 닫은 연결이면 [`DriverError::ConnClosed`](super::DriverError::ConnClosed)
    /// 를 반환해야 합니다.
    async fn send(&mut self, message: Bytes) -> DriverResult<()>;

    /// 메시지 하나를 수신
    async fn recv(&mut self) -> DriverResult<Bytes>;

    /// 연결 닫기
    async fn close(&mut self) -> DriverResult<()>;
}

/// 새 연결을 여는 전송 팩토리
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// 생성되는 연결 타입
    type Connection: Connection;

    /// 서버에 연결
    async fn connect(&self) -> DriverResult<Self::Connection>;
}
