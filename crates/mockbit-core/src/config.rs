//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! TOML 파일과 `MOCKBIT_` 접두어 환경 변수에서 로드되며,
//! 환경 변수가 파일 값을 덮어씁니다.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 원격 거래소 API 설정
    pub api: ApiSettings,
    /// 세션 저장 설정
    pub session: SessionSettings,
    /// 로깅 설정
    pub logging: LoggingSettings,
}

/// 원격 거래소 API 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiSettings {
    /// REST API 기본 URL
    pub base_url: String,
    /// 시세 WebSocket URL
    pub ws_url: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            ws_url: "ws://localhost:8080/ws/ticker".to_string(),
            timeout_secs: 10,
        }
    }
}

/// 세션 저장 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionSettings {
    /// 암호화된 세션 파일 경로
    pub store_path: String,
    /// 마스터 키를 읽을 환경 변수 이름
    pub master_key_env: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            store_path: ".mockbit/session".to_string(),
            master_key_env: "MOCKBIT_MASTER_KEY".to_string(),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 설정 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 존재하지 않으면 기본값 위에 환경 변수만 적용됩니다.
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path).required(false),
            );
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix("MOCKBIT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| CoreError::Config(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| CoreError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_without_file() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.session.master_key_env, "MOCKBIT_MASTER_KEY");
    }
}
