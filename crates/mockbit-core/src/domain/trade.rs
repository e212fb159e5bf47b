//! 거래 체결 기록.
//!
//! 이 모듈은 체결된 주문 관련 타입을 정의합니다:
//! - `TradeRecord` - 개별 체결 기록 (거래내역 API의 한 행)
//!
//! 체결 기록은 원격 API에서 조회한 읽기 전용 데이터이며
//! 생성 이후 변경되지 않습니다.

use crate::domain::{OrderType, Side};
use crate::types::{Amount, MarketCode, Price, Quantity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 체결된 주문을 나타내는 거래 기록.
///
/// 직렬화 필드명은 거래내역 API의 와이어 형식을 따릅니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// 마켓 코드
    #[serde(rename = "marketCode")]
    pub market: MarketCode,
    /// 주문 방향
    #[serde(rename = "orderPosition")]
    pub side: Side,
    /// 주문 유형
    #[serde(rename = "orderType")]
    pub order_type: OrderType,
    /// 체결 수량
    #[serde(rename = "tradeQuantity")]
    pub quantity: Quantity,
    /// 단위당 체결 가격
    #[serde(rename = "tradePrice")]
    pub unit_price: Price,
    /// 체결 시각
    #[serde(rename = "concludedAt")]
    pub executed_at: DateTime<Utc>,
}

impl TradeRecord {
    /// 새 체결 기록을 생성합니다.
    pub fn new(
        market: MarketCode,
        side: Side,
        order_type: OrderType,
        quantity: Quantity,
        unit_price: Price,
        executed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            market,
            side,
            order_type,
            quantity,
            unit_price,
            executed_at,
        }
    }

    /// 체결 금액(수량 × 단가)을 반환합니다.
    pub fn notional_value(&self) -> Amount {
        self.quantity * self.unit_price
    }

    /// 매수 체결인지 확인합니다.
    pub fn is_buy(&self) -> bool {
        self.side == Side::Buy
    }
}
