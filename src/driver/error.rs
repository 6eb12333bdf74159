//! Driver Error Types
//!
//! 드라이버 에러 정의

use std::io;
use thiserror::Error;

use crate::protocol::{ProtocolError, StatusCode};

// ============================================================================
// DriverError - 드라이버 에러
// ============================================================================

/// 드라이버 에러
#[derive(Error, Debug)]
pub enum DriverError {
    /// 상대방이 이미 닫은 연결에 쓰기 시도
    #[error("connection closed")]
    ConnClosed,

    /// 풀 고갈 후 대기가 값 없이 끝남
    #[error("no connections available")]
    NoConnectionsAvailable,

    /// 호출자가 작업을 취소함
    #[error("operation canceled")]
    Canceled,

    /// 타임아웃 에러
    #[error("Timeout: {0}")]
    Timeout(String),

    /// 전송 계층 에러 (dial/read/write/close)
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O 에러
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// 응답 디코딩 에러
    #[error("Decode error: {0}")]
    Decode(String),

    /// 요청 직렬화 에러
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// 서버가 성공이 아닌 상태 코드를 반환
    #[error("Server error: {code} - {message}")]
    Server {
        /// 상태 코드
        code: StatusCode,
        /// 상태 테이블 메시지 (없으면 일반 메시지)
        message: String,
        /// 서버가 보낸 상태 메시지
        detail: String,
    },

    /// 인증 에러
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// 풀 에러
    #[error("Pool error: {0}")]
    Pool(String),

    /// 설정 에러
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl DriverError {
    /// 타임아웃 에러 생성
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// 전송 에러 생성
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// 디코딩 에러 생성
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// 인증 에러 생성
    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// 풀 에러 생성
    pub fn pool(msg: impl Into<String>) -> Self {
        Self::Pool(msg.into())
    }

    /// 설정 에러 생성
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// 상태 코드로 서버 에러 생성
    ///
    /// 메시지는 상태 테이블에서 찾고, 없으면 일반 메시지를 사용합니다.
    pub fn server(code: StatusCode, detail: impl Into<String>) -> Self {
        Self::Server {
            code,
            message: code.describe().to_string(),
            detail: detail.into(),
        }
    }

    /// 서버 상태 코드 (서버 에러인 경우)
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::Server { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// 재시도 가능 여부
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnClosed
            | Self::NoConnectionsAvailable
            | Self::Timeout(_)
            | Self::Transport(_)
            | Self::Io(_) => true,
            Self::Server { code, .. } => code.is_transient(),
            _ => false,
        }
    }

    /// 클라이언트 에러 여부
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Authentication(_) | Self::Configuration(_) | Self::Serialization(_) => true,
            Self::Server { code, .. } => matches!(
                *code,
                StatusCode::UNAUTHORIZED
                    | StatusCode::MALFORMED_REQUEST
                    | StatusCode::INVALID_REQUEST_ARGUMENTS
            ),
            _ => false,
        }
    }

    /// 교환 도중 실패해 연결 스트림 상태를 알 수 없는지 여부
    ///
    /// 서버가 종료 상태 프레임을 보낸 경우에만 연결을 재사용할 수 있습니다.
    pub fn poisons_connection(&self) -> bool {
        !matches!(self, Self::Server { .. } | Self::Serialization(_))
    }
}

impl From<ProtocolError> for DriverError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Io(e) => DriverError::Io(e),
            ProtocolError::Serialize(e) => DriverError::Serialization(e.to_string()),
            ProtocolError::ContentTypeTooLong(_) => DriverError::Serialization(err.to_string()),
            other => DriverError::Decode(other.to_string()),
        }
    }
}

// ============================================================================
// Result Type
// ============================================================================

/// 드라이버 결과 타입
pub type DriverResult<T> = Result<T, DriverError>;

// ============================================================================
// Tests
// ============================================================================
