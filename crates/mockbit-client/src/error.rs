//! 원격 API 클라이언트 에러 타입.

use thiserror::Error;

/// 원격 거래소 API 관련 에러.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    Network(String),

    /// 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 인증 실패 (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 세션 만료 (토큰 갱신 실패)
    #[error("Session expired, login required")]
    SessionExpired,

    /// API 에러 응답
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// 파싱/역직렬화 에러
    #[error("Parse error: {0}")]
    Parse(String),

    /// WebSocket 에러
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// 연결 끊김
    #[error("Disconnected: {0}")]
    Disconnected(String),

    /// 잘못된 입력
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 세션 저장소 에러
    #[error("Session store error: {0}")]
    SessionStore(String),
}

/// API 작업을 위한 Result 타입.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// 재시도 가능한 에러인지 확인.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Network(_)
                | ApiError::Timeout(_)
                | ApiError::WebSocket(_)
                | ApiError::Disconnected(_)
        )
    }

    /// 인증 관련 에러인지 확인.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_) | ApiError::SessionExpired)
    }

    /// 권장 재시도 대기 시간(밀리초) 반환.
    pub fn retry_delay_ms(&self) -> Option<u64> {
        match self {
            ApiError::Network(_) => Some(1000),
            ApiError::Timeout(_) => Some(500),
            ApiError::WebSocket(_) => Some(2000),
            ApiError::Disconnected(_) => Some(5000),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(err.to_string())
        } else if err.is_connect() {
            ApiError::Network(err.to_string())
        } else if err.is_decode() {
            ApiError::Parse(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Parse(err.to_string())
    }
}

impl From<mockbit_core::CryptoError> for ApiError {
    fn from(err: mockbit_core::CryptoError) -> Self {
        ApiError::SessionStore(err.to_string())
    }
}

impl From<mockbit_core::CoreError> for ApiError {
    fn from(err: mockbit_core::CoreError) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}
