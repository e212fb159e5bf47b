//! 로그인 세션 관리.
//!
//! 이 모듈은 로그인 세션 관련 타입을 정의합니다:
//! - `SessionTokens` - access/refresh 토큰과 사용자 프로필
//! - `SessionStore` - 메모리 보관 + 선택적 암호화 파일 저장
//!
//! access 토큰의 만료는 JWT 페이로드의 `exp` 클레임을 서명 검증 없이
//! 읽어 판단합니다. 검증은 원격 API의 몫이고, 클라이언트는 만료 여부만
//! 미리 확인합니다.

use crate::error::{ApiError, ApiResult};
use base64::Engine;
use chrono::{DateTime, Utc};
use mockbit_core::{SessionCipher, UserProfile};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// JWT 페이로드에서 읽는 최소 클레임.
#[derive(Debug, Deserialize)]
struct ExpClaim {
    exp: i64,
}

/// JWT 토큰의 `exp` 클레임을 서명 검증 없이 디코드합니다.
///
/// 형식이 잘못된 토큰은 `None`을 반환하며, 호출자는 만료된 것으로
/// 취급합니다.
fn decode_exp(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .ok()?;
    let claim: ExpClaim = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claim.exp, 0)
}

/// 로그인 세션 토큰.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTokens {
    /// access 토큰 (Bearer)
    pub access_token: String,
    /// refresh 토큰
    pub refresh_token: String,
    /// 로그인한 사용자 프로필
    pub user: UserProfile,
}

impl SessionTokens {
    /// access 토큰의 만료 시각. 페이로드를 읽을 수 없으면 `None`.
    pub fn access_expires_at(&self) -> Option<DateTime<Utc>> {
        decode_exp(&self.access_token)
    }

    /// access 토큰이 만료되었는지 확인합니다.
    ///
    /// 만료 시각을 읽을 수 없는 토큰은 만료된 것으로 취급합니다.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.access_expires_at() {
            Some(exp) => exp <= now,
            None => true,
        }
    }
}

/// 세션 보관소.
///
/// 현재 세션을 메모리에 보관하고, 경로와 암호화 키가 설정된 경우
/// AES-256-GCM으로 암호화해 디스크에 저장합니다. 저장 형식은
/// base64(nonce || ciphertext) 한 줄입니다.
pub struct SessionStore {
    inner: RwLock<Option<SessionTokens>>,
    path: Option<PathBuf>,
    cipher: Option<SessionCipher>,
}

impl SessionStore {
    /// 메모리 전용 세션 보관소를 생성합니다.
    pub fn in_memory() -> Self {
        Self {
            inner: RwLock::new(None),
            path: None,
            cipher: None,
        }
    }

    /// 암호화 파일 저장이 포함된 세션 보관소를 생성합니다.
    ///
    /// 기존 파일이 있으면 복호화해 세션을 복원합니다. 복호화에 실패한
    /// 파일은 무시합니다 (키 교체 등).
    pub fn with_file(path: impl Into<PathBuf>, cipher: SessionCipher) -> Self {
        let path = path.into();
        let initial = match std::fs::read_to_string(&path) {
            Ok(sealed) => match cipher.open_json::<SessionTokens>(&sealed) {
                Ok(tokens) => {
                    debug!(user = %tokens.user.username, "Restored session from file");
                    Some(tokens)
                }
                Err(e) => {
                    warn!("Stored session could not be decrypted: {}", e);
                    None
                }
            },
            Err(_) => None,
        };

        Self {
            inner: RwLock::new(initial),
            path: Some(path),
            cipher: Some(cipher),
        }
    }

    /// 현재 세션의 복사본을 반환합니다.
    pub async fn current(&self) -> Option<SessionTokens> {
        self.inner.read().await.clone()
    }

    /// 로그인 여부를 확인합니다.
    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.is_some()
    }

    /// 세션을 교체하고, 설정된 경우 디스크에 저장합니다.
    pub async fn set(&self, tokens: SessionTokens) -> ApiResult<()> {
        self.persist(&tokens)?;
        *self.inner.write().await = Some(tokens);
        Ok(())
    }

    /// 토큰 갱신 결과만 반영합니다. 사용자 프로필은 유지됩니다.
    pub async fn update_tokens(&self, access_token: String, refresh_token: String) -> ApiResult<()> {
        let mut guard = self.inner.write().await;
        if let Some(tokens) = guard.as_mut() {
            tokens.access_token = access_token;
            tokens.refresh_token = refresh_token;
            let snapshot = tokens.clone();
            drop(guard);
            self.persist(&snapshot)?;
        }
        Ok(())
    }

    /// 세션을 제거하고 저장 파일도 삭제합니다.
    pub async fn clear(&self) {
        *self.inner.write().await = None;
        if let Some(path) = &self.path {
            if let Err(e) = std::fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to remove session file: {}", e);
                }
            }
        }
    }

    fn persist(&self, tokens: &SessionTokens) -> ApiResult<()> {
        let (Some(path), Some(cipher)) = (&self.path, &self.cipher) else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ApiError::SessionStore(e.to_string()))?;
        }

        let sealed = cipher.seal_json(tokens)?;
        std::fs::write(path, sealed).map_err(|e| ApiError::SessionStore(e.to_string()))?;
        Ok(())
    }
}
