//! 시장 데이터 타입 및 구조체.
//!
//! 이 모듈은 시장 데이터 관련 타입을 정의합니다:
//! - `MarketInfo` - 마켓 목록의 한 행
//! - `Ticker` - 실시간 시세 데이터
//! - `PriceSnapshot` - 마켓 코드 → 현재가 매핑

use crate::types::{MarketCode, Price, Quantity};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 거래 가능한 마켓 정보.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketInfo {
    /// 마켓 코드
    pub market: MarketCode,
    /// 한글 종목명
    pub korean_name: String,
    /// 영문 종목명
    pub english_name: String,
}

impl MarketInfo {
    /// 검색어가 마켓 코드 또는 종목명에 포함되는지 확인합니다.
    pub fn matches(&self, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        let term = term.to_lowercase();
        self.market.as_str().to_lowercase().contains(&term)
            || self.korean_name.to_lowercase().contains(&term)
            || self.english_name.to_lowercase().contains(&term)
    }
}

/// 마켓 목록에 검색 필터를 적용합니다.
pub fn filter_markets<'a>(markets: &'a [MarketInfo], term: &str) -> Vec<&'a MarketInfo> {
    markets.iter().filter(|m| m.matches(term)).collect()
}

/// 실시간 시세 데이터.
///
/// 시세 WebSocket 피드가 전달하는 형식을 따릅니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticker {
    /// 마켓 코드
    pub code: MarketCode,
    /// 최근 체결가
    pub trade_price: Price,
    /// 전일 대비 변동액 (부호 포함)
    pub signed_change_price: Decimal,
    /// 전일 대비 변동률 (부호 포함, 0.01 = 1%)
    pub signed_change_rate: Decimal,
    /// 24시간 최고가
    pub high_price: Price,
    /// 24시간 최저가
    pub low_price: Price,
    /// 24시간 누적 거래량
    pub acc_trade_volume_24h: Quantity,
    /// 수신 시각
    pub timestamp: DateTime<Utc>,
}

impl Ticker {
    /// 전일 대비 상승 여부.
    pub fn is_rising(&self) -> bool {
        self.signed_change_price > Decimal::ZERO
    }
}

/// 마켓 코드에서 현재가로의 매핑.
///
/// 외부 시세 피드에서 공급되는 읽기 전용 입력입니다. 집계/평가 로직은
/// 이 스냅샷을 인자로 받을 뿐 갱신 주기를 알지 못합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceSnapshot(HashMap<MarketCode, Price>);

impl PriceSnapshot {
    /// 빈 스냅샷을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 마켓의 현재가를 기록합니다.
    pub fn insert(&mut self, market: MarketCode, price: Price) {
        self.0.insert(market, price);
    }

    /// 시세 이벤트를 스냅샷에 반영합니다.
    pub fn apply(&mut self, ticker: &Ticker) {
        self.0.insert(ticker.code.clone(), ticker.trade_price);
    }

    /// 마켓의 현재가를 조회합니다. 가격이 없으면 `None`.
    pub fn price_of(&self, market: &MarketCode) -> Option<Price> {
        self.0.get(market).copied()
    }

    /// 스냅샷에 포함된 마켓 수.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 스냅샷이 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 내부 맵에 대한 반복자.
    pub fn iter(&self) -> impl Iterator<Item = (&MarketCode, &Price)> {
        self.0.iter()
    }
}

impl FromIterator<(MarketCode, Price)> for PriceSnapshot {
    fn from_iter<T: IntoIterator<Item = (MarketCode, Price)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
