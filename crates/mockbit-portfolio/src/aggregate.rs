//! 마켓별 포지션 집계.
//!
//! 이 모듈은 체결 기록 목록을 마켓별 순보유 수량과 매수 원가로
//! 접는 집계 단계를 정의합니다:
//! - `PositionState` - 마켓별 누적 포지션
//! - `aggregate` - 체결 기록 목록 → 포지션 맵

use mockbit_core::{Amount, MarketCode, Price, Quantity, Side, TradeRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 한 마켓의 누적 포지션.
///
/// 불변식: `cost_basis`는 현재 보유 수량에 대한 `quantity × 평균단가`와
/// 일치하며, 수량이 전량 청산되면 0으로 돌아갑니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionState {
    /// 순보유 수량 (부호 포함)
    pub quantity: Quantity,
    /// 현재 보유분에 투입된 총 원가
    pub cost_basis: Amount,
}

impl PositionState {
    /// 평균 매수 단가를 반환합니다. 보유 수량이 없으면 0.
    pub fn average_cost(&self) -> Price {
        if self.quantity > Decimal::ZERO {
            self.cost_basis / self.quantity
        } else {
            Decimal::ZERO
        }
    }

    /// 체결 기록 하나를 포지션에 반영합니다.
    ///
    /// 매수는 수량과 원가를 더하고, 매도는 매도 시점의 평균단가만큼
    /// 원가를 비례 차감합니다. 보유량을 초과하는 매도는 거부하지 않으며
    /// 수량이 음수가 될 수 있습니다. 원격 원장이 이미 검증한 기록을
    /// 재검증하지 않습니다.
    pub fn apply(&mut self, record: &TradeRecord) {
        match record.side {
            Side::Buy => {
                self.quantity += record.quantity;
                self.cost_basis += record.quantity * record.unit_price;
            }
            Side::Sell => {
                let avg_cost = self.average_cost();
                self.quantity -= record.quantity;
                self.cost_basis -= record.quantity * avg_cost;
            }
        }
    }

    /// 보유 중인 포지션인지 확인합니다.
    pub fn is_open(&self) -> bool {
        self.quantity > Decimal::ZERO
    }
}

/// 체결 기록 목록을 마켓별 포지션 맵으로 접습니다.
///
/// 입력 순서는 임의여도 됩니다. 평균단가 계산이 체결 순서에 의존하므로
/// 내부에서 체결 시각 오름차순으로 정렬한 뒤 접습니다. 호출자에게
/// 정렬 책임을 지우지 않습니다.
pub fn aggregate(records: &[TradeRecord]) -> HashMap<MarketCode, PositionState> {
    let mut sorted: Vec<&TradeRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.executed_at);

    let mut positions: HashMap<MarketCode, PositionState> = HashMap::new();

    for record in sorted {
        positions
            .entry(record.market.clone())
            .or_default()
            .apply(record);
    }

    positions
}
