//! REST 클라이언트 통합 테스트 (mockito 기반).

use chrono::{Duration, Utc};
use mockbit_client::{ApiConfig, ApiError, ExchangeApi, SessionStore, SessionTokens};
use mockbit_core::UserProfile;
use rust_decimal_macros::dec;
use secrecy::SecretString;
use std::sync::Arc;

fn profile() -> UserProfile {
    UserProfile {
        username: "tester".to_string(),
        email: "tester@example.com".to_string(),
        nickname: "테스터".to_string(),
    }
}

/// 서명 없는 테스트용 JWT를 만듭니다.
fn fake_jwt(subject: &str, exp_offset_hours: i64) -> String {
    use base64::Engine;
    let engine = &base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let header = engine.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let exp = (Utc::now() + Duration::hours(exp_offset_hours)).timestamp();
    let payload = engine.encode(format!(r#"{{"sub":"{}","exp":{}}}"#, subject, exp));
    format!("{}.{}.sig", header, payload)
}

async fn seeded_session(access: &str, refresh: &str) -> Arc<SessionStore> {
    let store = Arc::new(SessionStore::in_memory());
    let tokens = SessionTokens {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
        user: profile(),
    };
    store.set(tokens).await.unwrap();
    store
}

fn api_for(server: &mockito::Server, session: Arc<SessionStore>) -> ExchangeApi {
    let config = ApiConfig::new(server.url(), "ws://unused");
    ExchangeApi::new(config, session).unwrap()
}

#[tokio::test]
async fn test_login_stores_session() {
    let mut server = mockito::Server::new_async().await;

    let access = fake_jwt("tester", 1);
    let body = format!(
        r#"{{
            "user": {{"username": "tester", "email": "tester@example.com", "nickname": "테스터"}},
            "accessToken": "{}",
            "refreshToken": "refresh-1"
        }}"#,
        access
    );

    let mock = server
        .mock("POST", "/api/v1/login")
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await;

    let session = Arc::new(SessionStore::in_memory());
    let api = api_for(&server, session.clone());

    let user = api
        .login("tester", &SecretString::from("passwd123".to_string()))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(user.nickname, "테스터");

    let tokens = session.current().await.unwrap();
    assert_eq!(tokens.access_token, access);
    assert!(!tokens.is_expired(Utc::now()));
}

#[tokio::test]
async fn test_unauthorized_triggers_refresh_and_retry() {
    let mut server = mockito::Server::new_async().await;

    // 만료된 access 토큰으로 요청하면 401
    let stale = server
        .mock("GET", "/auth/profile")
        .match_header("authorization", "Bearer old-token")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "token expired"}"#)
        .create_async()
        .await;

    // refresh 토큰으로 갱신
    let refresh = server
        .mock("POST", "/auth/refresh")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"accessToken": "new-token", "refreshToken": "new-refresh"}"#)
        .create_async()
        .await;

    // 새 토큰으로 재시도하면 성공
    let fresh = server
        .mock("GET", "/auth/profile")
        .match_header("authorization", "Bearer new-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"username": "tester", "email": "tester@example.com", "nickname": "테스터"}"#)
        .create_async()
        .await;

    let session = seeded_session("old-token", "refresh-0").await;
    let api = api_for(&server, session.clone());

    let user = api.profile().await.unwrap();

    stale.assert_async().await;
    refresh.assert_async().await;
    fresh.assert_async().await;

    assert_eq!(user.username, "tester");

    // 세션에는 갱신된 토큰이 반영된다.
    let tokens = session.current().await.unwrap();
    assert_eq!(tokens.access_token, "new-token");
    assert_eq!(tokens.refresh_token, "new-refresh");
}

#[tokio::test]
async fn test_refresh_failure_clears_session() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("GET", "/auth/profile")
        .with_status(401)
        .with_body(r#"{"message": "token expired"}"#)
        .create_async()
        .await;

    server
        .mock("POST", "/auth/refresh")
        .with_status(401)
        .with_body(r#"{"message": "refresh token expired"}"#)
        .create_async()
        .await;

    let session = seeded_session("old-token", "dead-refresh").await;
    let api = api_for(&server, session.clone());

    let result = api.profile().await;
    assert!(matches!(result, Err(ApiError::SessionExpired)));
    assert!(session.current().await.is_none());
}

#[tokio::test]
async fn test_trade_history_sanitizes_malformed_rows() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("GET", "/trade-history")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
                {
                    "concludedAt": "2025-06-01T09:30:00Z",
                    "marketCode": "KRW-BTC",
                    "orderPosition": "BUY",
                    "orderType": "LIMIT",
                    "tradePrice": 10000000.0,
                    "tradeQuantity": 0.5
                },
                {
                    "concludedAt": "2025-06-02T10:00:00Z",
                    "marketCode": "KRW-ETH",
                    "orderPosition": "SELL",
                    "orderType": "MARKET",
                    "tradePrice": -2500000.0,
                    "tradeQuantity": 1.0
                }
            ]"#,
        )
        .create_async()
        .await;

    let session = seeded_session("token", "refresh").await;
    let api = api_for(&server, session);

    let records = api.trade_history().await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].unit_price, dec!(10000000));
    // 음수 가격은 0으로 강제된다.
    assert_eq!(records[1].unit_price, dec!(0));
    assert_eq!(records[1].quantity, dec!(1));
}

#[tokio::test]
async fn test_api_error_carries_server_message() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("POST", "/api/v1/signup")
        .with_status(409)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "이미 사용 중인 닉네임입니다"}"#)
        .create_async()
        .await;

    let api = api_for(&server, Arc::new(SessionStore::in_memory()));

    let result = api
        .signup("tester", "t@example.com", "테스터", &SecretString::from("pw".to_string()))
        .await;

    match result {
        Err(ApiError::Api { status, message }) => {
            assert_eq!(status, 409);
            assert_eq!(message, "이미 사용 중인 닉네임입니다");
        }
        other => panic!("unexpected result: {:?}", other.map(|m| m.message)),
    }
}

#[tokio::test]
async fn test_markets_listing() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("GET", "/markets")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
                {"market": "KRW-BTC", "korean_name": "비트코인", "english_name": "Bitcoin"},
                {"market": "KRW-ETH", "korean_name": "이더리움", "english_name": "Ethereum"}
            ]"#,
        )
        .create_async()
        .await;

    let api = api_for(&server, Arc::new(SessionStore::in_memory()));
    let markets = api.markets().await.unwrap();

    assert_eq!(markets.len(), 2);
    assert_eq!(markets[0].market.coin(), "BTC");
}
