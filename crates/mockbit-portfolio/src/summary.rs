//! 손익 요약.
//!
//! 이 모듈은 평가 결과에서 손익 지표를 도출합니다:
//! - `summarize` - 총 원가/총 평가액 → 손익, 수익률
//! - `total_summary` - 예수금을 포함한 총 자산 요약
//! - `allocation` - 마켓별 평가 비중 (원형 차트용)
//! - `summarize_window` - 기간 누적 손익 (실현 + 미실현)

use crate::aggregate::PositionState;
use crate::valuation::{valuate, ValuationReport};
use chrono::{DateTime, Duration, Utc};
use mockbit_core::{Amount, DecimalExt, MarketCode, PriceSnapshot, Side, TradeRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 손익 요약.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// 평가 손익 (총 평가액 − 총 원가)
    pub profit: Amount,
    /// 수익률(%). 원가가 0이면 0.
    pub profit_rate: Decimal,
}

/// 총 원가와 총 평가액에서 손익 요약을 계산합니다.
///
/// 원가가 0일 때 수익률은 0입니다. 0으로 나눈 NaN/무한대가 표시 계층으로
/// 전파되는 일은 없어야 합니다.
pub fn summarize(total_cost: Amount, total_value: Amount) -> Summary {
    let profit = total_value - total_cost;
    let profit_rate = if total_cost.is_zero() {
        Decimal::ZERO
    } else {
        profit / total_cost * Decimal::from(100)
    };

    Summary {
        profit,
        profit_rate,
    }
}

/// 예수금을 포함한 포트폴리오 전체 요약.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// 총 매수 금액
    pub total_buy_amount: Amount,
    /// 총 평가 금액
    pub total_valuation: Amount,
    /// 총 보유 자산 (예수금 + 평가 금액)
    pub total_asset: Amount,
    /// 총 평가 손익
    pub profit: Amount,
    /// 총 평가 수익률(%)
    pub profit_rate: Decimal,
}

/// 평가 보고서와 예수금에서 전체 요약을 만듭니다.
pub fn total_summary(report: &ValuationReport, cash: Amount) -> PortfolioSummary {
    let summary = summarize(report.total_cost, report.total_value);

    PortfolioSummary {
        total_buy_amount: report.total_cost,
        total_valuation: report.total_value,
        total_asset: cash + report.total_value,
        profit: summary.profit,
        profit_rate: summary.profit_rate,
    }
}

/// 마켓별 평가 비중 한 조각.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSlice {
    /// 마켓 코드
    pub market: MarketCode,
    /// 전체 평가액 대비 비중(%)
    pub weight: Decimal,
}

/// 마켓별 평가 비중을 계산합니다.
///
/// 총 평가액이 0이면 빈 목록을 반환합니다. 비중은 소수점 둘째 자리까지
/// 반올림하며 0이 된 조각은 버립니다. 비중 내림차순으로 정렬합니다.
pub fn allocation(report: &ValuationReport) -> Vec<AllocationSlice> {
    if report.total_value.is_zero() {
        return Vec::new();
    }

    let mut slices: Vec<AllocationSlice> = report
        .per_market
        .values()
        .map(|v| AllocationSlice {
            market: v.market.clone(),
            weight: (v.market_value / report.total_value * Decimal::from(100)).round_half_up(2),
        })
        .filter(|s| s.weight > Decimal::ZERO)
        .collect();

    slices.sort_by(|a, b| b.weight.cmp(&a.weight).then(a.market.cmp(&b.market)));
    slices
}

/// 기간 누적 손익 요약.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    /// 조회 기간 (일)
    pub window_days: i64,
    /// 기간 내 체결 수
    pub trade_count: usize,
    /// 실현 손익 (기간 내 매도분)
    pub realized_profit: Amount,
    /// 미실현 손익 (기간 내 변동분의 현재가 평가)
    pub unrealized_profit: Amount,
    /// 기간 누적 손익 (실현 + 미실현)
    pub period_profit: Amount,
    /// 기간 수익률(%, 기간 내 매수 금액 대비)
    pub period_profit_rate: Decimal,
}

impl PeriodSummary {
    fn empty(window_days: i64) -> Self {
        Self {
            window_days,
            trade_count: 0,
            realized_profit: Decimal::ZERO,
            unrealized_profit: Decimal::ZERO,
            period_profit: Decimal::ZERO,
            period_profit_rate: Decimal::ZERO,
        }
    }
}

/// 기간 누적 손익을 계산합니다.
///
/// `executed_at >= now − window_days`인 체결만 집계합니다 (경계 포함).
/// 기간 내 체결을 시각 오름차순으로 접으면서 매도는 매도 시점의
/// 평균단가 대비 차익을 실현 손익으로 계상하고, 접고 남은 보유분은
/// 현재가로 평가해 미실현 손익으로 계상합니다. 가격이 없는 마켓은
/// 평가 단계의 제외 정책을 그대로 따릅니다.
///
/// 수익률 분모는 기간 내 총 매수 금액이며, 0이면 수익률도 0입니다.
pub fn summarize_window(
    records: &[TradeRecord],
    prices: &PriceSnapshot,
    window_days: i64,
    now: DateTime<Utc>,
) -> PeriodSummary {
    let window_start = now - Duration::days(window_days);

    let mut in_window: Vec<&TradeRecord> = records
        .iter()
        .filter(|r| r.executed_at >= window_start)
        .collect();

    if in_window.is_empty() {
        return PeriodSummary::empty(window_days);
    }

    in_window.sort_by_key(|r| r.executed_at);

    let mut positions: HashMap<MarketCode, PositionState> = HashMap::new();
    let mut realized_profit = Decimal::ZERO;
    let mut total_buy_cost = Decimal::ZERO;
    let trade_count = in_window.len();

    for record in in_window {
        let position = positions.entry(record.market.clone()).or_default();

        if record.side == Side::Sell {
            let avg_cost = position.average_cost();
            realized_profit += record.quantity * (record.unit_price - avg_cost);
        } else {
            total_buy_cost += record.notional_value();
        }

        position.apply(record);
    }

    let report = valuate(&positions, prices);
    let unrealized_profit = report.total_value - report.total_cost;

    let period_profit = realized_profit + unrealized_profit;
    let period_profit_rate = if total_buy_cost.is_zero() {
        Decimal::ZERO
    } else {
        period_profit / total_buy_cost * Decimal::from(100)
    };

    PeriodSummary {
        window_days,
        trade_count,
        realized_profit,
        unrealized_profit,
        period_profit,
        period_profit_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockbit_core::OrderType;
    use rust_decimal_macros::dec;

    fn record(
        market: &str,
        side: Side,
        qty: Decimal,
        price: Decimal,
        executed_at: DateTime<Utc>,
    ) -> TradeRecord {
        TradeRecord::new(
            MarketCode::new(market),
            side,
            OrderType::Limit,
            qty,
            price,
            executed_at,
        )
    }

    #[test]
    fn test_summarize() {
        let summary = summarize(dec!(10000000), dec!(12000000));
        assert_eq!(summary.profit, dec!(2000000));
        assert_eq!(summary.profit_rate, dec!(20));
    }

    #[test]
    fn test_summarize_zero_cost() {
        let summary = summarize(dec!(0), dec!(0));
        assert_eq!(summary.profit, dec!(0));
        assert_eq!(summary.profit_rate, dec!(0));
    }

    #[test]
    fn test_summarize_idempotent() {
        let first = summarize(dec!(5000000), dec!(4500000));
        let second = summarize(dec!(5000000), dec!(4500000));
        assert_eq!(first, second);
    }

    #[test]
    fn test_total_summary_includes_cash() {
        let mut positions = HashMap::new();
        positions.insert(
            MarketCode::new("KRW-BTC"),
            PositionState {
                quantity: dec!(1),
                cost_basis: dec!(10000000),
            },
        );

        let mut prices = PriceSnapshot::new();
        prices.insert(MarketCode::new("KRW-BTC"), dec!(12000000));

        let report = valuate(&positions, &prices);
        let summary = total_summary(&report, dec!(3000000));

        assert_eq!(summary.total_buy_amount, dec!(10000000));
        assert_eq!(summary.total_valuation, dec!(12000000));
        assert_eq!(summary.total_asset, dec!(15000000));
        assert_eq!(summary.profit, dec!(2000000));
        assert_eq!(summary.profit_rate, dec!(20));
    }

    #[test]
    fn test_allocation_weights() {
        let mut positions = HashMap::new();
        positions.insert(
            MarketCode::new("KRW-BTC"),
            PositionState {
                quantity: dec!(1),
                cost_basis: dec!(1),
            },
        );
        positions.insert(
            MarketCode::new("KRW-ETH"),
            PositionState {
                quantity: dec!(1),
                cost_basis: dec!(1),
            },
        );

        let mut prices = PriceSnapshot::new();
        prices.insert(MarketCode::new("KRW-BTC"), dec!(7500000));
        prices.insert(MarketCode::new("KRW-ETH"), dec!(2500000));

        let slices = allocation(&valuate(&positions, &prices));

        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].market.as_str(), "KRW-BTC");
        assert_eq!(slices[0].weight, dec!(75.00));
        assert_eq!(slices[1].weight, dec!(25.00));
    }

    #[test]
    fn test_allocation_empty_when_no_value() {
        let report = ValuationReport::default();
        assert!(allocation(&report).is_empty());
    }

    #[test]
    fn test_window_filters_old_trades() {
        let now = Utc::now();
        let records = vec![
            // 기간 밖 (40일 전)
            record(
                "KRW-BTC",
                Side::Buy,
                dec!(1),
                dec!(10000000),
                now - Duration::days(40),
            ),
            // 기간 안 (5일 전)
            record(
                "KRW-ETH",
                Side::Buy,
                dec!(1),
                dec!(2000000),
                now - Duration::days(5),
            ),
        ];

        let mut prices = PriceSnapshot::new();
        prices.insert(MarketCode::new("KRW-BTC"), dec!(20000000));
        prices.insert(MarketCode::new("KRW-ETH"), dec!(2200000));

        let summary = summarize_window(&records, &prices, 30, now);

        // BTC 매수는 기간 밖이므로 ETH 변동분만 집계된다.
        assert_eq!(summary.trade_count, 1);
        assert_eq!(summary.period_profit, dec!(200000));
        assert_eq!(summary.period_profit_rate, dec!(10));
    }

    #[test]
    fn test_window_boundary_inclusive() {
        let now = Utc::now();
        let boundary = now - Duration::days(7);

        let records = vec![record("KRW-BTC", Side::Buy, dec!(1), dec!(100), boundary)];

        let mut prices = PriceSnapshot::new();
        prices.insert(MarketCode::new("KRW-BTC"), dec!(110));

        let summary = summarize_window(&records, &prices, 7, now);
        assert_eq!(summary.trade_count, 1);
    }

    #[test]
    fn test_window_realized_and_unrealized_split() {
        let now = Utc::now();
        let records = vec![
            record(
                "KRW-ETH",
                Side::Buy,
                dec!(2),
                dec!(2000000),
                now - Duration::days(3),
            ),
            record(
                "KRW-ETH",
                Side::Sell,
                dec!(1),
                dec!(2500000),
                now - Duration::days(1),
            ),
        ];

        let mut prices = PriceSnapshot::new();
        prices.insert(MarketCode::new("KRW-ETH"), dec!(2200000));

        let summary = summarize_window(&records, &prices, 30, now);

        // 실현: 1 × (2,500,000 − 2,000,000), 미실현: 1 × (2,200,000 − 2,000,000)
        assert_eq!(summary.realized_profit, dec!(500000));
        assert_eq!(summary.unrealized_profit, dec!(200000));
        assert_eq!(summary.period_profit, dec!(700000));
        assert_eq!(summary.period_profit_rate, dec!(17.5));
    }

    #[test]
    fn test_window_empty_records() {
        let summary = summarize_window(&[], &PriceSnapshot::new(), 30, Utc::now());
        assert_eq!(summary.period_profit, dec!(0));
        assert_eq!(summary.period_profit_rate, dec!(0));
    }
}
