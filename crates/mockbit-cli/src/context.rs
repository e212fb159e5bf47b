//! CLI 공통 컨텍스트.
//!
//! 설정 로드, 로깅 초기화, 세션 보관소와 API 클라이언트 구성을
//! 한 곳에서 처리합니다.

use anyhow::Context;
use mockbit_client::{ApiConfig, ExchangeApi, SessionStore};
use mockbit_core::{init_logging, AppConfig, LogConfig, SessionCipher};
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// 명령 실행에 필요한 공용 상태.
pub struct CliContext {
    /// 애플리케이션 설정
    pub config: AppConfig,
    /// 세션 보관소
    pub session: Arc<SessionStore>,
    /// API 클라이언트
    pub api: ExchangeApi,
}

impl CliContext {
    /// 설정을 로드하고 컨텍스트를 구성합니다.
    ///
    /// 마스터 키 환경 변수가 설정된 경우에만 세션이 디스크에 저장됩니다.
    /// 없으면 메모리 세션으로 동작하며 프로세스 종료와 함께 사라집니다.
    pub fn init(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let config = AppConfig::load(config_path).context("설정 로드 실패")?;

        init_logging(LogConfig::from_settings(&config.logging))
            .map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

        let session = match SessionCipher::from_env(&config.session.master_key_env) {
            Ok(cipher) => Arc::new(SessionStore::with_file(
                &config.session.store_path,
                cipher,
            )),
            Err(_) => {
                warn!(
                    "{} not set, session will not be persisted",
                    config.session.master_key_env
                );
                Arc::new(SessionStore::in_memory())
            }
        };

        let api = ExchangeApi::new(ApiConfig::from_settings(&config.api), session.clone())
            .context("API 클라이언트 생성 실패")?;

        Ok(Self {
            config,
            session,
            api,
        })
    }
}

/// stdin에서 한 줄을 읽습니다. 프롬프트를 먼저 출력합니다.
pub fn prompt_line(prompt: &str) -> anyhow::Result<String> {
    use std::io::Write;

    print!("{}", prompt);
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// 비밀번호를 읽습니다.
///
/// `MOCKBIT_PASSWD` 환경 변수가 있으면 그 값을 사용하고 (스크립트용),
/// 없으면 stdin에서 입력받습니다.
pub fn prompt_password(prompt: &str) -> anyhow::Result<secrecy::SecretString> {
    if let Ok(passwd) = std::env::var("MOCKBIT_PASSWD") {
        return Ok(secrecy::SecretString::from(passwd));
    }
    let line = prompt_line(prompt)?;
    Ok(secrecy::SecretString::from(line))
}
