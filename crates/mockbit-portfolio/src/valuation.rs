//! 포지션 평가.
//!
//! 이 모듈은 집계된 포지션을 현재가 스냅샷과 결합해 마켓별/전체
//! 평가 금액을 계산합니다:
//! - `ValuationResult` - 마켓별 평가 결과
//! - `ValuationReport` - 전체 평가 결과
//! - `valuate` - 포지션 맵 × 가격 스냅샷 → 평가 보고서

use crate::aggregate::PositionState;
use mockbit_core::{Amount, HoldingAsset, MarketCode, Price, PriceSnapshot, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 한 마켓의 평가 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    /// 마켓 코드
    pub market: MarketCode,
    /// 보유 수량
    pub quantity: Quantity,
    /// 평균 매수 단가
    pub average_cost: Price,
    /// 매수 원가
    pub cost_basis: Amount,
    /// 현재가
    pub current_price: Price,
    /// 평가 금액 (수량 × 현재가)
    pub market_value: Amount,
}

impl ValuationResult {
    /// 이 마켓의 평가 손익.
    pub fn profit(&self) -> Amount {
        self.market_value - self.cost_basis
    }

    /// 이 마켓의 수익률(%). 원가가 0이면 0.
    pub fn profit_rate(&self) -> Decimal {
        if self.cost_basis.is_zero() {
            return Decimal::ZERO;
        }
        self.profit() / self.cost_basis * Decimal::from(100)
    }
}

/// 전체 포트폴리오 평가 보고서.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValuationReport {
    /// 마켓별 평가 결과
    pub per_market: HashMap<MarketCode, ValuationResult>,
    /// 총 매수 금액
    pub total_cost: Amount,
    /// 총 평가 금액
    pub total_value: Amount,
}

impl ValuationReport {
    /// 평가된 마켓이 하나도 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.per_market.is_empty()
    }
}

/// 포지션 맵을 현재가로 평가합니다.
///
/// 수량이 0 이하인 포지션(청산됨 또는 초과 매도)은 보유 종목이 아니므로
/// 평가에서 제외합니다. 현재가가 없거나 0인 마켓은 전체에서 제외하며,
/// `total_cost`에도 포함하지 않습니다. 한쪽 합계에만 남기면 손익이
/// 왜곡되므로 양쪽 모두에서 빼는 단일 정책을 사용합니다.
///
/// 빈 포지션 맵은 0 합계의 빈 보고서를 반환합니다.
pub fn valuate(
    positions: &HashMap<MarketCode, PositionState>,
    prices: &PriceSnapshot,
) -> ValuationReport {
    let mut report = ValuationReport::default();

    for (market, position) in positions {
        if !position.is_open() {
            continue;
        }

        let current_price = match prices.price_of(market) {
            Some(p) if p > Decimal::ZERO => p,
            _ => continue,
        };

        let market_value = position.quantity * current_price;

        report.total_cost += position.cost_basis;
        report.total_value += market_value;
        report.per_market.insert(
            market.clone(),
            ValuationResult {
                market: market.clone(),
                quantity: position.quantity,
                average_cost: position.average_cost(),
                cost_basis: position.cost_basis,
                current_price,
                market_value,
            },
        );
    }

    report
}

/// 원격 API가 집계해 준 보유 종목 행을 같은 정책으로 평가합니다.
///
/// 포트폴리오 화면은 체결 기록을 다시 접는 대신 서버 집계 결과를
/// 사용하므로, 이 경로는 `HoldingAsset`에서 바로 평가 보고서를 만듭니다.
pub fn valuate_holdings(holdings: &[HoldingAsset], prices: &PriceSnapshot) -> ValuationReport {
    let positions: HashMap<MarketCode, PositionState> = holdings
        .iter()
        .map(|h| {
            (
                h.market_code.clone(),
                PositionState {
                    quantity: h.quantity,
                    cost_basis: h.total_cost,
                },
            )
        })
        .collect();

    valuate(&positions, prices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn position(qty: Decimal, cost: Decimal) -> PositionState {
        PositionState {
            quantity: qty,
            cost_basis: cost,
        }
    }

    #[test]
    fn test_valuate_basic() {
        let mut positions = HashMap::new();
        positions.insert(MarketCode::new("KRW-BTC"), position(dec!(1), dec!(10000000)));

        let mut prices = PriceSnapshot::new();
        prices.insert(MarketCode::new("KRW-BTC"), dec!(12000000));

        let report = valuate(&positions, &prices);

        assert_eq!(report.total_cost, dec!(10000000));
        assert_eq!(report.total_value, dec!(12000000));

        let btc = &report.per_market[&MarketCode::new("KRW-BTC")];
        assert_eq!(btc.profit(), dec!(2000000));
        assert_eq!(btc.profit_rate(), dec!(20));
    }

    #[test]
    fn test_unpriced_market_excluded_from_both_totals() {
        let mut positions = HashMap::new();
        positions.insert(MarketCode::new("KRW-BTC"), position(dec!(1), dec!(10000000)));
        positions.insert(MarketCode::new("KRW-ETH"), position(dec!(2), dec!(4000000)));

        let mut prices = PriceSnapshot::new();
        prices.insert(MarketCode::new("KRW-BTC"), dec!(11000000));
        // KRW-ETH 가격 없음

        let report = valuate(&positions, &prices);

        assert_eq!(report.per_market.len(), 1);
        assert_eq!(report.total_cost, dec!(10000000));
        assert_eq!(report.total_value, dec!(11000000));
    }

    #[test]
    fn test_zero_price_excluded() {
        let mut positions = HashMap::new();
        positions.insert(MarketCode::new("KRW-BTC"), position(dec!(1), dec!(10000000)));

        let mut prices = PriceSnapshot::new();
        prices.insert(MarketCode::new("KRW-BTC"), dec!(0));

        let report = valuate(&positions, &prices);
        assert!(report.is_empty());
        assert_eq!(report.total_value, dec!(0));
    }

    #[test]
    fn test_closed_and_negative_positions_excluded() {
        let mut positions = HashMap::new();
        positions.insert(MarketCode::new("KRW-BTC"), position(dec!(0), dec!(0)));
        positions.insert(MarketCode::new("KRW-XRP"), position(dec!(-2), dec!(0)));

        let mut prices = PriceSnapshot::new();
        prices.insert(MarketCode::new("KRW-BTC"), dec!(10000000));
        prices.insert(MarketCode::new("KRW-XRP"), dec!(1000));

        let report = valuate(&positions, &prices);
        assert!(report.is_empty());
    }

    #[test]
    fn test_empty_positions_zero_totals() {
        let report = valuate(&HashMap::new(), &PriceSnapshot::new());
        assert_eq!(report.total_cost, dec!(0));
        assert_eq!(report.total_value, dec!(0));
    }

    #[test]
    fn test_valuate_holdings_rows() {
        let holdings = vec![HoldingAsset {
            market_code: MarketCode::new("KRW-ETH"),
            quantity: dec!(2),
            average_cost: dec!(2000000),
            total_cost: dec!(4000000),
        }];

        let mut prices = PriceSnapshot::new();
        prices.insert(MarketCode::new("KRW-ETH"), dec!(2200000));

        let report = valuate_holdings(&holdings, &prices);
        assert_eq!(report.total_cost, dec!(4000000));
        assert_eq!(report.total_value, dec!(4400000));
    }
}
