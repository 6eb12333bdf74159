//! Inline authentication
//!
//! 서버의 인증 요청(407)에 SASL PLAIN 으로 응답합니다.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use uuid::Uuid;

use crate::protocol::{AuthenticationArgs, Request, RequestArgs};

// ============================================================================
// Credentials - 인증 정보
// ============================================================================

/// 사용자명/비밀번호 인증 정보
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// 새 인증 정보 생성
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// 사용자명
    pub fn username(&self) -> &str {
        &self.username
    }

    /// SASL PLAIN 응답 (`0x00 username 0x00 password`, base64)
    pub fn sasl_plain(&self) -> String {
        let mut sasl = Vec::with_capacity(2 + self.username.len() + self.password.len());
        sasl.push(0);
        sasl.extend_from_slice(self.username.as_bytes());
        sasl.push(0);
        sasl.extend_from_slice(self.password.as_bytes());
        STANDARD.encode(sasl)
    }

    /// 인증 요청 생성
    ///
    /// 새 요청이 아니라 원래 요청의 id 를 재사용합니다.
    pub fn authentication_request(&self, request_id: Uuid) -> Request {
        Request::with_id(
            request_id,
            RequestArgs::Authentication(AuthenticationArgs {
                sasl: self.sasl_plain(),
                sasl_mechanism: None,
            }),
        )
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
