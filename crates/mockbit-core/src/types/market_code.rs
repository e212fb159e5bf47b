//! 마켓 코드 정의.
//!
//! 이 모듈은 거래소 마켓 식별자 타입을 정의합니다:
//! - `MarketCode` - "KRW-BTC" 형식의 마켓 코드
//!
//! 마켓 코드는 `호가통화-종목` 형식이며, 시세 맵과 포지션 맵의
//! 키로 사용됩니다.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 거래 가능한 마켓을 나타내는 코드 (예: "KRW-BTC").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketCode(String);

impl MarketCode {
    /// 새 마켓 코드를 생성합니다. 형식 검증 없이 대문자로 정규화합니다.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    /// 호가 통화와 종목으로 마켓 코드를 생성합니다.
    pub fn from_pair(currency: impl Into<String>, coin: impl Into<String>) -> Self {
        Self(format!(
            "{}-{}",
            currency.into().to_uppercase(),
            coin.into().to_uppercase()
        ))
    }

    /// 호가 통화를 반환합니다 (예: "KRW").
    pub fn currency(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }

    /// 종목(코인) 심볼을 반환합니다 (예: "BTC").
    pub fn coin(&self) -> &str {
        self.0.split('-').nth(1).unwrap_or(&self.0)
    }

    /// 원문 코드 문자열을 반환합니다.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// KRW 마켓인지 확인합니다.
    pub fn is_krw(&self) -> bool {
        self.currency() == "KRW"
    }
}

impl FromStr for MarketCode {
    type Err = CoreError;

    /// "통화-종목" 형식 문자열을 파싱합니다.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('-').collect();
        if parts.len() == 2 && !parts[0].is_empty() && !parts[1].is_empty() {
            Ok(Self::new(s))
        } else {
            Err(CoreError::Parse(format!("잘못된 마켓 코드: {}", s)))
        }
    }
}

impl fmt::Display for MarketCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MarketCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
