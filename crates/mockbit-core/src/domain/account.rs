//! 계정 및 보유 자산 타입.
//!
//! 이 모듈은 계정 관련 타입을 정의합니다:
//! - `UserProfile` - 사용자 프로필
//! - `HoldingAsset` - 보유 종목의 한 행 (원격 API 집계 결과)
//! - `CashBalance` - 예수금 잔고

use crate::types::{Amount, MarketCode, Price, Quantity};
use serde::{Deserialize, Serialize};

/// 사용자 프로필.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// 로그인 아이디
    pub username: String,
    /// 이메일
    pub email: String,
    /// 닉네임
    pub nickname: String,
}

/// 원격 API가 반환하는 보유 종목 집계 행.
///
/// 잔고 원장은 원격 거래소가 소유하며, 이 타입은 그 조회 결과일 뿐입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingAsset {
    /// 마켓 코드
    #[serde(alias = "name")]
    pub market_code: MarketCode,
    /// 보유 수량
    pub quantity: Quantity,
    /// 평균 매수 단가
    pub average_cost: Price,
    /// 총 매수 금액
    pub total_cost: Amount,
}

/// 예수금 잔고 (KRW).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CashBalance {
    /// 보유 현금
    pub asset: Amount,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_holding_name_alias() {
        // 일부 응답은 market_code 대신 name 키를 사용한다.
        let json = r#"{"name": "KRW-BTC", "quantity": 0.5, "average_cost": 10000000, "total_cost": 5000000}"#;
        let holding: HoldingAsset = serde_json::from_str(json).unwrap();
        assert_eq!(holding.market_code.as_str(), "KRW-BTC");
        assert_eq!(holding.total_cost, dec!(5000000));
    }
}
