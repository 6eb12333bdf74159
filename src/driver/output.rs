//! Raw exchange output
//!
//! 교환 결과는 디코딩하지 않은 JSON 바이트로 돌려줍니다. 호출자가 원하는
//! 타입으로 [`RawOutput::decode`] 합니다.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;

use super::error::{DriverError, DriverResult};

/// 한 교환의 디코딩 전 결과
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOutput(Bytes);

impl RawOutput {
    /// 빈 결과 (204)
    pub fn empty() -> Self {
        Self(Bytes::new())
    }

    /// 서버가 보낸 `data` 를 그대로 사용
    pub fn verbatim(raw: &RawValue) -> Self {
        Self(Bytes::copy_from_slice(raw.get().as_bytes()))
    }

    /// 모은 항목들을 하나의 JSON 리스트로 인코딩
    pub fn from_items(items: &[Box<RawValue>]) -> DriverResult<Self> {
        let encoded =
            serde_json::to_vec(items).map_err(|e| DriverError::Serialization(e.to_string()))?;
        Ok(Self(Bytes::from(encoded)))
    }

    /// 결과가 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 인코딩된 바이트
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// 인코딩된 바이트 (소유)
    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    /// 원하는 타입으로 디코딩
    ///
    /// 빈 결과는 JSON `null` 로 취급합니다.
    pub fn decode<T: DeserializeOwned>(&self) -> DriverResult<T> {
        let bytes: &[u8] = if self.0.is_empty() { b"null" } else { &self.0 };
        serde_json::from_slice(bytes).map_err(|e| DriverError::decode(e.to_string()))
    }
}

impl AsRef<[u8]> for RawOutput {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}
