//! # Mockbit Core
//!
//! 모의 거래소 클라이언트의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 클라이언트 전반에서 사용되는 기본 타입을 제공합니다:
//! - 주문 및 주문 요청 타입
//! - 체결(거래) 기록
//! - 시세 및 가격 스냅샷 구조체
//! - 마켓 코드 정의
//! - 설정 관리
//! - 로깅 인프라
//! - 세션 암호화

pub mod config;
pub mod crypto;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use crypto::{generate_master_key, CryptoError, SessionCipher};
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
