//! 원격 거래소 REST API 클라이언트.
//!
//! 계정, 마켓, 주문, 거래내역 엔드포인트를 감싸는 인증 클라이언트입니다.
//! 인증이 필요한 요청은 Bearer 토큰을 자동으로 첨부하고, 401 응답을
//! 받으면 refresh 토큰으로 한 번 갱신 후 원래 요청을 재시도합니다.
//! 갱신까지 실패하면 세션을 비우고 `ApiError::SessionExpired`를
//! 반환합니다.

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::session::{SessionStore, SessionTokens};
use mockbit_core::{
    CashBalance, HoldingAsset, MarketInfo, OpenOrder, OrderRequest, OrderType, Side, TradeRecord,
    UserProfile,
};
use reqwest::{Client, Method, StatusCode};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

// ============================================================================
// API 응답 타입
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    user: UserProfile,
    access_token: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
    refresh_token: String,
}

/// 메시지만 담긴 단순 응답.
#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    /// 서버 안내 메시지
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// 거래내역 와이어 행.
///
/// 숫자 필드는 검증 없이 f64로 받은 뒤 [`sanitize_decimal`]로 정리합니다.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TradeHistoryRow {
    concluded_at: chrono::DateTime<chrono::Utc>,
    market_code: String,
    order_position: String,
    order_type: String,
    trade_price: f64,
    trade_quantity: f64,
}

/// 와이어 숫자 값을 Decimal로 정리합니다.
///
/// 비정상 값(NaN/무한대/음수)은 0으로 강제하고 경고를 남깁니다.
/// 조용히 합계를 오염시키는 것보다 0으로 떨어뜨리는 쪽을 택합니다.
fn sanitize_decimal(value: f64, field: &str, market: &str) -> Decimal {
    if !value.is_finite() || value < 0.0 {
        warn!(market, field, value, "Malformed numeric field clamped to zero");
        return Decimal::ZERO;
    }
    Decimal::from_f64(value).unwrap_or_else(|| {
        warn!(market, field, value, "Unrepresentable numeric field clamped to zero");
        Decimal::ZERO
    })
}

impl TradeHistoryRow {
    fn into_record(self) -> ApiResult<TradeRecord> {
        let market: mockbit_core::MarketCode = self.market_code.parse()?;
        let side: Side = self.order_position.parse()?;
        let order_type: OrderType = self.order_type.parse()?;

        Ok(TradeRecord::new(
            market.clone(),
            side,
            order_type,
            sanitize_decimal(self.trade_quantity, "tradeQuantity", market.as_str()),
            sanitize_decimal(self.trade_price, "tradePrice", market.as_str()),
            self.concluded_at,
        ))
    }
}

// ============================================================================
// 클라이언트
// ============================================================================

/// 원격 모의 거래소 API 클라이언트.
pub struct ExchangeApi {
    config: ApiConfig,
    client: Client,
    session: Arc<SessionStore>,
}

impl ExchangeApi {
    /// 새 API 클라이언트를 생성합니다.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `ApiError::Network`를 반환합니다.
    pub fn new(config: ApiConfig, session: Arc<SessionStore>) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Network(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            config,
            client,
            session,
        })
    }

    /// 세션 보관소에 대한 참조를 반환합니다.
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        access_token: Option<&str>,
    ) -> ApiResult<reqwest::Response> {
        let mut request = self.client.request(method.clone(), self.url(path));

        if let Some(token) = access_token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!("{} {}", method, path);
        Ok(request.send().await?)
    }

    /// 인증 요청 본체. 401이면 토큰을 한 번 갱신하고 재시도합니다.
    async fn request_authed<T: for<'de> Deserialize<'de>>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> ApiResult<T> {
        let tokens = self
            .session
            .current()
            .await
            .ok_or_else(|| ApiError::Unauthorized("로그인이 필요합니다".to_string()))?;

        let response = self
            .send(method.clone(), path, body.as_ref(), Some(&tokens.access_token))
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let refreshed = self.refresh_tokens(&tokens).await?;
            let retried = self
                .send(method, path, body.as_ref(), Some(&refreshed))
                .await?;
            return Self::handle_response(retried).await;
        }

        Self::handle_response(response).await
    }

    /// 인증 없는 요청.
    async fn request_public<T: for<'de> Deserialize<'de>>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> ApiResult<T> {
        let response = self.send(method, path, body.as_ref(), None).await?;
        Self::handle_response(response).await
    }

    /// refresh 토큰으로 access 토큰을 갱신합니다. 새 access 토큰을 반환합니다.
    async fn refresh_tokens(&self, tokens: &SessionTokens) -> ApiResult<String> {
        debug!("Access token rejected, refreshing");

        let response = self
            .send(
                Method::POST,
                "/auth/refresh",
                Some(&json!({ "refreshToken": tokens.refresh_token })),
                None,
            )
            .await?;

        if !response.status().is_success() {
            warn!("Token refresh failed, clearing session");
            self.session.clear().await;
            return Err(ApiError::SessionExpired);
        }

        let refreshed: RefreshResponse = response.json().await?;
        let access = refreshed.access_token.clone();
        self.session
            .update_tokens(refreshed.access_token, refreshed.refresh_token)
            .await?;

        Ok(access)
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> ApiResult<T> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| status.to_string());

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized(message));
        }

        Err(ApiError::Api {
            status: status.as_u16(),
            message,
        })
    }

    // === 계정 작업 ===

    /// 로그인 후 세션을 저장합니다.
    pub async fn login(&self, username: &str, password: &SecretString) -> ApiResult<UserProfile> {
        let body = json!({
            "username": username,
            "passwd": password.expose_secret(),
        });

        let response: LoginResponse = self
            .request_public(Method::POST, "/api/v1/login", Some(body))
            .await?;

        let user = response.user.clone();
        self.session
            .set(SessionTokens {
                access_token: response.access_token,
                refresh_token: response.refresh_token,
                user: response.user,
            })
            .await?;

        info!(username, "Logged in");
        Ok(user)
    }

    /// 회원 가입.
    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        nickname: &str,
        password: &SecretString,
    ) -> ApiResult<MessageResponse> {
        let body = json!({
            "username": username,
            "email": email,
            "nickname": nickname,
            "passwd": password.expose_secret(),
        });

        self.request_public(Method::POST, "/api/v1/signup", Some(body))
            .await
    }

    /// 로그아웃. 서버 호출 성공 여부와 무관하게 로컬 세션은 비웁니다.
    pub async fn logout(&self) -> ApiResult<()> {
        let result = self
            .request_authed::<MessageResponse>(Method::POST, "/api/v1/logout", None)
            .await;
        self.session.clear().await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.is_auth_error() => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// 내 프로필 조회.
    pub async fn profile(&self) -> ApiResult<UserProfile> {
        self.request_authed(Method::GET, "/auth/profile", None).await
    }

    /// 닉네임 변경.
    pub async fn change_nickname(&self, nickname: &str) -> ApiResult<MessageResponse> {
        self.request_authed(
            Method::PATCH,
            "/auth/nickname",
            Some(json!({ "nickname": nickname })),
        )
        .await
    }

    /// 비밀번호 변경.
    pub async fn change_password(
        &self,
        current: &SecretString,
        new: &SecretString,
    ) -> ApiResult<MessageResponse> {
        self.request_authed(
            Method::PATCH,
            "/auth/password",
            Some(json!({
                "currentPasswd": current.expose_secret(),
                "newPasswd": new.expose_secret(),
            })),
        )
        .await
    }

    /// 회원 탈퇴. 성공하면 세션도 비웁니다.
    pub async fn delete_account(&self) -> ApiResult<MessageResponse> {
        let response = self
            .request_authed::<MessageResponse>(Method::DELETE, "/auth/me", None)
            .await?;
        self.session.clear().await;
        Ok(response)
    }

    /// 파산 신청. 잔고와 보유 종목이 초기 상태로 리셋됩니다.
    pub async fn declare_bankruptcy(&self) -> ApiResult<MessageResponse> {
        self.request_authed(Method::POST, "/auth/bankrupt", None)
            .await
    }

    // === 시장 데이터 ===

    /// 마켓 목록 조회.
    pub async fn markets(&self) -> ApiResult<Vec<MarketInfo>> {
        self.request_public(Method::GET, "/markets", None).await
    }

    // === 자산/거래 작업 ===

    /// 보유 종목 조회. 마켓 코드를 주면 해당 마켓만 조회합니다.
    pub async fn portfolio(&self, market: Option<&str>) -> ApiResult<Vec<HoldingAsset>> {
        let path = match market {
            Some(code) => format!("/portfolio?market_code={}", code),
            None => "/portfolio".to_string(),
        };
        self.request_authed(Method::GET, &path, None).await
    }

    /// 예수금 잔고 조회.
    pub async fn cash_balance(&self) -> ApiResult<CashBalance> {
        self.request_authed(Method::GET, "/holdings", None).await
    }

    /// 거래내역 조회. 와이어 숫자 필드는 Decimal로 정리됩니다.
    pub async fn trade_history(&self) -> ApiResult<Vec<TradeRecord>> {
        let rows: Vec<TradeHistoryRow> = self
            .request_authed(Method::GET, "/trade-history", None)
            .await?;

        rows.into_iter().map(TradeHistoryRow::into_record).collect()
    }

    // === 주문 작업 ===

    /// 새 주문 제출. 전송 전에 요청을 검증합니다.
    pub async fn place_order(&self, request: &OrderRequest) -> ApiResult<OpenOrder> {
        request.validate()?;

        let mut body = json!({
            "market": request.market.as_str(),
            "side": request.side,
            "orderType": request.order_type,
            "quantity": request.quantity,
        });
        if let Some(price) = request.price {
            body["price"] = json!(price);
        }

        let order: OpenOrder = self
            .request_authed(Method::POST, "/orders", Some(body))
            .await?;

        info!(
            market = %order.market,
            side = %order.side,
            order_id = %order.id,
            "Order placed"
        );
        Ok(order)
    }

    /// 미체결 주문 목록 조회.
    pub async fn open_orders(&self) -> ApiResult<Vec<OpenOrder>> {
        self.request_authed(Method::GET, "/orders/wait", None).await
    }

    /// 주문 취소.
    pub async fn cancel_order(&self, order_id: Uuid) -> ApiResult<MessageResponse> {
        self.request_authed(Method::DELETE, &format!("/orders/{}", order_id), None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sanitize_decimal_clamps_bad_values() {
        assert_eq!(sanitize_decimal(f64::NAN, "p", "KRW-BTC"), Decimal::ZERO);
        assert_eq!(
            sanitize_decimal(f64::INFINITY, "p", "KRW-BTC"),
            Decimal::ZERO
        );
        assert_eq!(sanitize_decimal(-1.5, "p", "KRW-BTC"), Decimal::ZERO);
        assert_eq!(sanitize_decimal(1.5, "p", "KRW-BTC"), dec!(1.5));
    }

    #[test]
    fn test_history_row_conversion() {
        let row = TradeHistoryRow {
            concluded_at: "2025-06-01T09:30:00Z".parse().unwrap(),
            market_code: "KRW-BTC".to_string(),
            order_position: "BUY".to_string(),
            order_type: "LIMIT".to_string(),
            trade_price: 10_000_000.0,
            trade_quantity: 0.5,
        };

        let record = row.into_record().unwrap();
        assert_eq!(record.market.as_str(), "KRW-BTC");
        assert_eq!(record.side, Side::Buy);
        assert_eq!(record.notional_value(), dec!(5000000));
    }

    #[test]
    fn test_history_row_rejects_bad_market() {
        let row = TradeHistoryRow {
            concluded_at: "2025-06-01T09:30:00Z".parse().unwrap(),
            market_code: "NOT_A_MARKET".to_string(),
            order_position: "BUY".to_string(),
            order_type: "LIMIT".to_string(),
            trade_price: 1.0,
            trade_quantity: 1.0,
        };

        assert!(row.into_record().is_err());
    }
}
