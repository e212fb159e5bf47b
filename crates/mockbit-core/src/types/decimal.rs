//! 정밀한 금융 계산을 위한 Decimal 유틸리티.
//!
//! 이 모듈은 금융 계산에 필요한 정밀 소수점 타입 및 유틸리티를 제공합니다.
//! 모든 금액/수량 계산은 부동소수점 대신 `Decimal`을 사용하므로
//! NaN이나 무한대가 집계 로직 내부로 유입될 수 없습니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 금융 정밀도를 위한 가격 타입.
pub type Price = Decimal;

/// 주문 수량을 위한 타입.
pub type Quantity = Decimal;

/// 통화 금액을 위한 타입.
pub type Amount = Decimal;

/// Decimal 연산을 위한 확장 트레이트.
pub trait DecimalExt {
    /// 0보다 큰지 확인합니다.
    fn is_positive_value(&self) -> bool;

    /// 퍼센트 문자열로 변환합니다 (예: "5.25%", 입력은 이미 % 단위).
    fn to_percent_string(&self) -> String;

    /// 지정된 소수점 자릿수로 반올림합니다.
    fn round_half_up(&self, dp: u32) -> Decimal;
}

impl DecimalExt for Decimal {
    fn is_positive_value(&self) -> bool {
        *self > Decimal::ZERO
    }

    fn to_percent_string(&self) -> String {
        format!("{:.2}%", self)
    }

    fn round_half_up(&self, dp: u32) -> Decimal {
        self.round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
    }
}

/// 통화가 포함된 금액.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// 금액
    pub amount: Decimal,
    /// 통화
    pub currency: String,
}

impl Money {
    /// 새 금액을 생성합니다.
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into().to_uppercase(),
        }
    }

    /// KRW 금액을 생성합니다.
    pub fn krw(amount: Decimal) -> Self {
        Self::new(amount, "KRW")
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_percent_string() {
        let d = dec!(5.25);
        assert_eq!(d.to_percent_string(), "5.25%");
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(dec!(10.005).round_half_up(2), dec!(10.01));
        assert_eq!(dec!(-10.005).round_half_up(2), dec!(-10.01));
    }

    #[test]
    fn test_money() {
        let m = Money::krw(dec!(10000.50));
        assert_eq!(m.to_string(), "10000.50 KRW");
    }
}
