//! # 세션 암호화 모듈
//!
//! AES-256-GCM을 사용해 디스크에 저장되는 로그인 세션을 암호화합니다.
//!
//! ## 보안 고려사항
//! - 마스터 키는 환경변수에서 로드 (base64 인코딩된 32바이트)
//! - 각 암호화마다 고유한 nonce (12바이트) 사용
//! - nonce와 암호문을 하나의 base64 블롭으로 합쳐 저장

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::Engine;
use rand::RngCore;
use thiserror::Error;

/// 암호화 에러
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Invalid master key length: expected 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Sealed blob too short: {0} bytes")]
    BlobTooShort(usize),

    #[error("Base64 decode error: {0}")]
    Base64DecodeError(#[from] base64::DecodeError),

    #[error("UTF-8 decode error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    #[error("Master key not configured")]
    MasterKeyNotConfigured,
}

/// AES-256-GCM nonce 크기 (바이트)
pub const NONCE_SIZE: usize = 12;

/// AES-256 키 크기 (바이트)
pub const KEY_SIZE: usize = 32;

/// 세션 암호화 관리자.
pub struct SessionCipher {
    cipher: Aes256Gcm,
}

impl SessionCipher {
    /// 마스터 키로 암호화 관리자 생성.
    ///
    /// # Arguments
    /// * `master_key` - base64로 인코딩된 32바이트 마스터 키
    pub fn new(master_key: &str) -> Result<Self, CryptoError> {
        let key_bytes = Self::decode_key(master_key)?;
        let cipher = Aes256Gcm::new_from_slice(&key_bytes)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        Ok(Self { cipher })
    }

    /// 환경 변수에서 마스터 키를 읽어 생성.
    pub fn from_env(var: &str) -> Result<Self, CryptoError> {
        let key = std::env::var(var).map_err(|_| CryptoError::MasterKeyNotConfigured)?;
        Self::new(&key)
    }

    /// Base64로 인코딩된 마스터 키 디코드
    fn decode_key(master_key: &str) -> Result<Vec<u8>, CryptoError> {
        let key_bytes = base64::engine::general_purpose::STANDARD.decode(master_key)?;

        if key_bytes.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength(key_bytes.len()));
        }

        Ok(key_bytes)
    }

    /// 문자열을 암호화해 base64(nonce || ciphertext) 블롭으로 반환.
    pub fn seal(&self, plaintext: &str) -> Result<String, CryptoError> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);

        Ok(base64::engine::general_purpose::STANDARD.encode(blob))
    }

    /// `seal`이 만든 블롭을 복호화.
    pub fn open(&self, sealed: &str) -> Result<String, CryptoError> {
        let blob = base64::engine::general_purpose::STANDARD.decode(sealed.trim())?;

        if blob.len() <= NONCE_SIZE {
            return Err(CryptoError::BlobTooShort(blob.len()));
        }

        let (nonce_bytes, ciphertext) = blob.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?;

        String::from_utf8(plaintext).map_err(CryptoError::from)
    }

    /// 직렬화 가능한 값을 JSON으로 암호화.
    pub fn seal_json<T: serde::Serialize>(&self, value: &T) -> Result<String, CryptoError> {
        let json = serde_json::to_string(value)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
        self.seal(&json)
    }

    /// `seal_json`이 만든 블롭을 복호화해 역직렬화.
    pub fn open_json<T: serde::de::DeserializeOwned>(
        &self,
        sealed: &str,
    ) -> Result<T, CryptoError> {
        let json = self.open(sealed)?;
        serde_json::from_str(&json).map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
    }
}

/// 새로운 마스터 키 생성 (초기 설정용).
///
/// # Example
/// ```
/// let key = mockbit_core::crypto::generate_master_key();
/// println!("MOCKBIT_MASTER_KEY={}", key);
/// ```
pub fn generate_master_key() -> String {
    let mut key = [0u8; KEY_SIZE];
    OsRng.fill_bytes(&mut key);
    base64::engine::general_purpose::STANDARD.encode(key)
}
