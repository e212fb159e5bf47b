//! 자산 상태 컨테이너.
//!
//! 여러 소비자(화면, 리포트)가 같은 원시 입력을 공유하고, 입력이 바뀔
//! 때마다 파생 값을 다시 계산하기 위한 단일 상태 컨테이너입니다.
//!
//! 컨테이너는 원시 입력만 보관합니다: 시세 스냅샷, 보유 종목, 예수금,
//! 거래내역. 총 평가액이나 수익률 같은 파생 값은 필드로 캐시하지 않고
//! 셀렉터 호출 시마다 순수 함수 파이프라인으로 다시 계산합니다.
//! 파생 값이 원본과 어긋난 채 굳는 일을 막기 위한 구조입니다.

use crate::error::ApiResult;
use crate::rest::ExchangeApi;
use crate::ticker::MarketEvent;
use chrono::{DateTime, Utc};
use mockbit_core::{Amount, HoldingAsset, PriceSnapshot, TradeRecord};
use mockbit_portfolio::{
    allocation, summarize_window, total_summary, valuate_holdings, AllocationSlice,
    PeriodSummary, PortfolioSummary, ValuationReport,
};
use rust_decimal::Decimal;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// 거래내역 재조회 최소 간격.
const HISTORY_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Default)]
struct AssetState {
    tickers: PriceSnapshot,
    holdings: Vec<HoldingAsset>,
    cash: Amount,
    trade_history: Vec<TradeRecord>,
    history_fetched_at: Option<Instant>,
}

/// 원시 입력 상태 컨테이너.
///
/// 쓰기(갱신)와 읽기(셀렉터)가 서로 다른 태스크에서 호출되어도
/// 안전합니다. 셀렉터는 락 아래에서 입력 스냅샷을 읽고 순수 함수를
/// 호출할 뿐이므로 호출 간 숨은 상태가 없습니다.
#[derive(Default)]
pub struct AssetStore {
    state: RwLock<AssetState>,
}

impl AssetStore {
    /// 빈 상태 컨테이너를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    // === 원시 입력 갱신 ===

    /// 시세 이벤트를 스냅샷에 반영합니다.
    pub async fn apply_event(&self, event: &MarketEvent) {
        if let MarketEvent::Ticker(ticker) = event {
            self.state.write().await.tickers.apply(ticker);
        }
    }

    /// 보유 종목과 예수금을 원격 API에서 다시 조회합니다.
    pub async fn refresh_portfolio(&self, api: &ExchangeApi) -> ApiResult<()> {
        let holdings = api.portfolio(None).await?;
        let cash = api.cash_balance().await?;

        let mut state = self.state.write().await;
        state.holdings = holdings;
        state.cash = cash.asset;
        Ok(())
    }

    /// 거래내역을 원격 API에서 조회합니다.
    ///
    /// 직전 조회가 5분 이내면 보관된 내역을 재사용합니다. 캐시되는 것은
    /// 원시 입력이며 파생 값이 아닙니다.
    pub async fn refresh_history(&self, api: &ExchangeApi) -> ApiResult<()> {
        {
            let state = self.state.read().await;
            if let Some(fetched_at) = state.history_fetched_at {
                if fetched_at.elapsed() < HISTORY_CACHE_TTL {
                    debug!("Trade history cache still fresh, skipping fetch");
                    return Ok(());
                }
            }
        }
        self.refresh_history_force(api).await
    }

    /// 캐시를 무시하고 거래내역을 다시 조회합니다.
    pub async fn refresh_history_force(&self, api: &ExchangeApi) -> ApiResult<()> {
        let history = api.trade_history().await?;

        let mut state = self.state.write().await;
        state.trade_history = history;
        state.history_fetched_at = Some(Instant::now());
        Ok(())
    }

    // === 원시 입력 조회 ===

    /// 현재 시세 스냅샷의 복사본.
    pub async fn price_snapshot(&self) -> PriceSnapshot {
        self.state.read().await.tickers.clone()
    }

    /// 보유 종목 행의 복사본.
    pub async fn holdings(&self) -> Vec<HoldingAsset> {
        self.state.read().await.holdings.clone()
    }

    /// 예수금 잔고.
    pub async fn cash(&self) -> Amount {
        self.state.read().await.cash
    }

    /// 거래내역의 복사본.
    pub async fn trade_history(&self) -> Vec<TradeRecord> {
        self.state.read().await.trade_history.clone()
    }

    // === 파생 셀렉터 (호출 시마다 재계산) ===

    /// 보유 종목의 현재가 평가 보고서.
    pub async fn valuation(&self) -> ValuationReport {
        let state = self.state.read().await;
        valuate_holdings(&state.holdings, &state.tickers)
    }

    /// 예수금을 포함한 포트폴리오 전체 요약.
    pub async fn summary(&self) -> PortfolioSummary {
        let state = self.state.read().await;
        let report = valuate_holdings(&state.holdings, &state.tickers);
        total_summary(&report, state.cash)
    }

    /// 마켓별 평가 비중.
    pub async fn allocation(&self) -> Vec<AllocationSlice> {
        allocation(&self.valuation().await)
    }

    /// 기간 누적 손익 요약.
    pub async fn period_summary(&self, window_days: i64, now: DateTime<Utc>) -> PeriodSummary {
        let state = self.state.read().await;
        summarize_window(&state.trade_history, &state.tickers, window_days, now)
    }

    // === 테스트/오프라인 주입 ===

    /// 보유 종목과 예수금을 직접 주입합니다.
    pub async fn set_portfolio(&self, holdings: Vec<HoldingAsset>, cash: Decimal) {
        let mut state = self.state.write().await;
        state.holdings = holdings;
        state.cash = cash;
    }

    /// 거래내역을 직접 주입합니다.
    pub async fn set_trade_history(&self, history: Vec<TradeRecord>) {
        let mut state = self.state.write().await;
        state.trade_history = history;
        state.history_fetched_at = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockbit_core::{MarketCode, Ticker};
    use rust_decimal_macros::dec;

    fn ticker(code: &str, price: Decimal) -> MarketEvent {
        MarketEvent::Ticker(Ticker {
            code: MarketCode::new(code),
            trade_price: price,
            signed_change_price: dec!(0),
            signed_change_rate: dec!(0),
            high_price: price,
            low_price: price,
            acc_trade_volume_24h: dec!(0),
            timestamp: Utc::now(),
        })
    }

    fn holding(code: &str, qty: Decimal, total_cost: Decimal) -> HoldingAsset {
        HoldingAsset {
            market_code: MarketCode::new(code),
            quantity: qty,
            average_cost: if qty.is_zero() { dec!(0) } else { total_cost / qty },
            total_cost,
        }
    }

    #[tokio::test]
    async fn test_summary_recomputes_on_each_tick() {
        let store = AssetStore::new();
        store
            .set_portfolio(vec![holding("KRW-BTC", dec!(1), dec!(10000000))], dec!(500000))
            .await;

        store.apply_event(&ticker("KRW-BTC", dec!(11000000))).await;
        let first = store.summary().await;
        assert_eq!(first.profit, dec!(1000000));
        assert_eq!(first.total_asset, dec!(11500000));

        // 새 틱이 들어오면 같은 셀렉터가 새 값을 낸다. 캐시가 없다.
        store.apply_event(&ticker("KRW-BTC", dec!(9000000))).await;
        let second = store.summary().await;
        assert_eq!(second.profit, dec!(-1000000));
    }

    #[tokio::test]
    async fn test_summary_without_prices_is_zero() {
        let store = AssetStore::new();
        store
            .set_portfolio(vec![holding("KRW-BTC", dec!(1), dec!(10000000))], dec!(0))
            .await;

        let summary = store.summary().await;
        assert_eq!(summary.total_valuation, dec!(0));
        assert_eq!(summary.profit_rate, dec!(0));
    }

    #[tokio::test]
    async fn test_non_ticker_events_ignored() {
        let store = AssetStore::new();
        store.apply_event(&MarketEvent::Connected).await;
        store.apply_event(&MarketEvent::Disconnected).await;
        assert!(store.price_snapshot().await.is_empty());
    }
}
