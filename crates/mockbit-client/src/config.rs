//! 원격 API 클라이언트 설정.

use mockbit_core::ApiSettings;
use serde::{Deserialize, Serialize};

/// 원격 거래소 API 접속 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// REST API 기본 URL
    pub base_url: String,
    /// 시세 WebSocket URL
    pub ws_url: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let defaults = ApiSettings::default();
        Self {
            base_url: defaults.base_url,
            ws_url: defaults.ws_url,
            timeout_secs: defaults.timeout_secs,
        }
    }
}

impl ApiConfig {
    /// 새 설정 생성. base URL 끝의 `/`는 제거합니다.
    pub fn new(base_url: impl Into<String>, ws_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ws_url: ws_url.into(),
            timeout_secs: 10,
        }
    }

    /// 타임아웃을 설정합니다.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// 애플리케이션 설정 섹션에서 생성합니다.
    pub fn from_settings(settings: &ApiSettings) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            ws_url: settings.ws_url.clone(),
            timeout_secs: settings.timeout_secs,
        }
    }

    /// 환경 변수에서 생성합니다 (`MOCKBIT_API_URL`, `MOCKBIT_WS_URL`).
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("MOCKBIT_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            ws_url: std::env::var("MOCKBIT_WS_URL").unwrap_or(defaults.ws_url),
            timeout_secs: defaults.timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = ApiConfig::new("http://localhost:8080/", "ws://localhost:8080/ws");
        assert_eq!(config.base_url, "http://localhost:8080");
    }
}
