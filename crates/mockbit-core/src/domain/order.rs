//! 주문 타입 및 주문 요청.
//!
//! 이 모듈은 주문 관련 타입을 정의합니다:
//! - `Side` - 주문 방향 (매수/매도)
//! - `OrderType` - 주문 유형 (시장가, 지정가)
//! - `OrderState` - 미체결 주문 상태
//! - `OrderRequest` - 주문 요청
//! - `OpenOrder` - 미체결 주문

use crate::error::{CoreError, CoreResult};
use crate::types::{MarketCode, Price, Quantity};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 주문 방향 (매수 또는 매도).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// 매수
    Buy,
    /// 매도
    Sell,
}

impl Side {
    /// 반대 방향을 반환합니다.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

impl std::str::FromStr for Side {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            _ => Err(CoreError::Parse(format!("잘못된 주문 방향: {}", s))),
        }
    }
}

/// 주문 유형.
///
/// 모의 거래소는 시장가와 지정가 두 가지 주문만 지원합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    /// 시장가 주문 - 현재 시장 가격으로 즉시 체결
    Market,
    /// 지정가 주문 - 지정 가격 이상/이하에서 체결
    Limit,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Market => write!(f, "MARKET"),
            OrderType::Limit => write!(f, "LIMIT"),
        }
    }
}

impl std::str::FromStr for OrderType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MARKET" => Ok(OrderType::Market),
            "LIMIT" => Ok(OrderType::Limit),
            _ => Err(CoreError::Parse(format!("잘못된 주문 유형: {}", s))),
        }
    }
}

/// 미체결 주문 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderState {
    /// 체결 대기 중
    Wait,
    /// 전량 체결됨
    Done,
    /// 취소됨
    Cancel,
}

impl OrderState {
    /// 주문이 아직 활성 상태인지 확인합니다.
    pub fn is_active(&self) -> bool {
        matches!(self, OrderState::Wait)
    }
}

/// 새 주문 생성을 위한 주문 요청.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    /// 마켓 코드
    pub market: MarketCode,
    /// 주문 방향
    pub side: Side,
    /// 주문 유형
    pub order_type: OrderType,
    /// 주문 수량
    pub quantity: Quantity,
    /// 지정가 (지정가 주문에 필수)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
}

impl OrderRequest {
    /// 시장가 주문 요청을 생성합니다.
    pub fn market(market: MarketCode, side: Side, quantity: Quantity) -> Self {
        Self {
            market,
            side,
            order_type: OrderType::Market,
            quantity,
            price: None,
        }
    }

    /// 지정가 주문 요청을 생성합니다.
    pub fn limit(market: MarketCode, side: Side, quantity: Quantity, price: Price) -> Self {
        Self {
            market,
            side,
            order_type: OrderType::Limit,
            quantity,
            price: Some(price),
        }
    }

    /// 주문 요청을 검증합니다.
    ///
    /// 수량은 양수여야 하며, 지정가 주문은 양수 가격이 필수입니다.
    pub fn validate(&self) -> CoreResult<()> {
        if self.quantity <= Decimal::ZERO {
            return Err(CoreError::InvalidInput(format!(
                "주문 수량은 양수여야 합니다: {}",
                self.quantity
            )));
        }

        match self.order_type {
            OrderType::Limit => match self.price {
                Some(p) if p > Decimal::ZERO => Ok(()),
                Some(p) => Err(CoreError::InvalidInput(format!(
                    "지정가는 양수여야 합니다: {}",
                    p
                ))),
                None => Err(CoreError::InvalidInput(
                    "지정가 주문에는 가격이 필요합니다".to_string(),
                )),
            },
            OrderType::Market => Ok(()),
        }
    }
}

/// 체결 대기 중인 주문.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenOrder {
    /// 주문 ID
    pub id: Uuid,
    /// 마켓 코드
    pub market: MarketCode,
    /// 주문 방향
    pub side: Side,
    /// 주문 유형
    pub order_type: OrderType,
    /// 남은 수량
    pub remaining_quantity: Quantity,
    /// 주문 가격 (지정가)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    /// 주문 상태
    pub state: OrderState,
    /// 주문 접수 시각
    pub placed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn test_side_wire_format() {
        let json = serde_json::to_string(&Side::Buy).unwrap();
        assert_eq!(json, "\"BUY\"");
        let side: Side = serde_json::from_str("\"SELL\"").unwrap();
        assert_eq!(side, Side::Sell);
    }

    #[test]
    fn test_order_request_validation() {
        let market = MarketCode::new("KRW-BTC");

        let ok = OrderRequest::limit(market.clone(), Side::Buy, dec!(0.1), dec!(50000000));
        assert!(ok.validate().is_ok());

        let zero_qty = OrderRequest::market(market.clone(), Side::Buy, dec!(0));
        assert!(zero_qty.validate().is_err());

        let no_price = OrderRequest {
            market,
            side: Side::Sell,
            order_type: OrderType::Limit,
            quantity: dec!(1),
            price: None,
        };
        assert!(no_price.validate().is_err());
    }
}
