//! 클라이언트 공통 에러 타입.
//!
//! 이 모듈은 도메인 계층 전반에서 사용되는 에러 타입을 정의합니다.

use thiserror::Error;

/// 핵심 도메인 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 파싱 에러
    #[error("파싱 에러: {0}")]
    Parse(String),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 도메인 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// 입력 검증 실패 에러인지 확인합니다.
    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::InvalidInput(_) | CoreError::Parse(_))
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_validation() {
        let invalid = CoreError::InvalidInput("quantity".to_string());
        assert!(invalid.is_validation());

        let internal = CoreError::Internal("oops".to_string());
        assert!(!internal.is_validation());
    }
}
