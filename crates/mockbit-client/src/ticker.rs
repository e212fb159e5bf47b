//! 시세 WebSocket 스트림.
//!
//! WebSocket 연결을 통해 실시간 시세 스트리밍을 제공합니다.
//! 구독 프레임은 티켓과 마켓 코드 목록을 담은 JSON 배열이며, 서버는
//! 마켓별 시세 프레임을 텍스트 또는 바이너리로 내려줍니다.

use crate::error::{ApiError, ApiResult};
use chrono::{DateTime, Utc};
use futures::{SinkExt, StreamExt};
use mockbit_core::{MarketCode, Ticker};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeSet;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, error, info};

// ============================================================================
// WebSocket 메시지 타입
// ============================================================================

/// 구독 프레임의 티켓 부분.
#[derive(Debug, Serialize)]
struct TicketFrame {
    ticket: String,
}

/// 시세 스트림 프레임.
#[derive(Debug, Deserialize)]
struct WsTicker {
    #[serde(rename = "type")]
    frame_type: String,
    code: String,
    trade_price: f64,
    signed_change_price: f64,
    signed_change_rate: f64,
    high_price: f64,
    low_price: f64,
    acc_trade_volume_24h: f64,
    timestamp: i64,
}

/// 시세 스트림 이벤트.
#[derive(Debug, Clone)]
pub enum MarketEvent {
    /// 시세 업데이트
    Ticker(Ticker),
    /// 연결됨
    Connected,
    /// 연결 해제
    Disconnected,
    /// 에러 발생
    Error(String),
}

// ============================================================================
// 시세 스트림
// ============================================================================

/// 시세 WebSocket 스트림.
pub struct TickerStream {
    ws_url: String,
    ws: Option<WebSocketStream<MaybeTlsStream<TcpStream>>>,
    subscriptions: BTreeSet<MarketCode>,
    event_rx: Option<mpsc::Receiver<MarketEvent>>,
    event_tx: Option<mpsc::Sender<MarketEvent>>,
}

impl TickerStream {
    /// 새로운 시세 스트림을 생성합니다.
    pub fn new(ws_url: impl Into<String>) -> Self {
        let (tx, rx) = mpsc::channel(1000);
        Self {
            ws_url: ws_url.into(),
            ws: None,
            subscriptions: BTreeSet::new(),
            event_rx: Some(rx),
            event_tx: Some(tx),
        }
    }

    /// WebSocket 서버에 연결합니다.
    pub async fn connect(&mut self) -> ApiResult<()> {
        info!("Connecting to ticker WebSocket: {}", self.ws_url);

        let (ws_stream, _) = connect_async(&self.ws_url)
            .await
            .map_err(|e| ApiError::WebSocket(e.to_string()))?;

        self.ws = Some(ws_stream);
        info!("Connected to ticker WebSocket");

        Ok(())
    }

    /// WebSocket 서버와의 연결을 해제합니다.
    pub async fn disconnect(&mut self) -> ApiResult<()> {
        if let Some(mut ws) = self.ws.take() {
            ws.close(None)
                .await
                .map_err(|e| ApiError::WebSocket(e.to_string()))?;
        }
        self.subscriptions.clear();
        info!("Disconnected from ticker WebSocket");
        Ok(())
    }

    /// 마켓들의 시세 업데이트를 구독합니다.
    ///
    /// 서버는 구독 프레임 전체를 매번 새 구독 목록으로 취급하므로,
    /// 기존 구독에 합쳐 전체 목록을 다시 전송합니다.
    pub async fn subscribe(&mut self, codes: &[MarketCode]) -> ApiResult<()> {
        for code in codes {
            self.subscriptions.insert(code.clone());
        }
        self.send_subscription().await
    }

    /// 마켓 구독을 해제합니다. 남은 목록으로 구독 프레임을 다시 보냅니다.
    pub async fn unsubscribe(&mut self, codes: &[MarketCode]) -> ApiResult<()> {
        for code in codes {
            self.subscriptions.remove(code);
        }
        self.send_subscription().await
    }

    async fn send_subscription(&mut self) -> ApiResult<()> {
        let codes: Vec<String> = self
            .subscriptions
            .iter()
            .map(|c| c.as_str().to_string())
            .collect();

        let frame = json!([
            TicketFrame {
                ticket: uuid::Uuid::new_v4().to_string(),
            },
            {
                "type": "ticker",
                "codes": codes,
            },
        ]);

        let ws = self
            .ws
            .as_mut()
            .ok_or_else(|| ApiError::Disconnected("Not connected".to_string()))?;

        ws.send(Message::Text(frame.to_string().into()))
            .await
            .map_err(|e| ApiError::WebSocket(e.to_string()))?;

        debug!(count = self.subscriptions.len(), "Subscription frame sent");
        Ok(())
    }

    /// 문자열에서 소수점 숫자를 파싱합니다.
    fn parse_decimal(value: f64) -> Decimal {
        if !value.is_finite() {
            return Decimal::ZERO;
        }
        Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
    }

    /// WebSocket 메시지를 MarketEvent로 파싱합니다.
    fn parse_message(text: &str) -> Option<MarketEvent> {
        let ticker = serde_json::from_str::<WsTicker>(text).ok()?;
        if ticker.frame_type != "ticker" {
            return None;
        }

        Some(MarketEvent::Ticker(Ticker {
            code: MarketCode::new(ticker.code),
            trade_price: Self::parse_decimal(ticker.trade_price),
            signed_change_price: Self::parse_decimal(ticker.signed_change_price),
            signed_change_rate: Self::parse_decimal(ticker.signed_change_rate),
            high_price: Self::parse_decimal(ticker.high_price),
            low_price: Self::parse_decimal(ticker.low_price),
            acc_trade_volume_24h: Self::parse_decimal(ticker.acc_trade_volume_24h),
            timestamp: DateTime::from_timestamp_millis(ticker.timestamp).unwrap_or_else(Utc::now),
        }))
    }

    /// 메시지 처리 루프를 시작합니다.
    ///
    /// 수신 태스크가 이벤트를 채널로 보내며, 이후 [`next_event`]로
    /// 꺼낼 수 있습니다.
    ///
    /// [`next_event`]: TickerStream::next_event
    pub async fn run(&mut self) -> ApiResult<()> {
        let tx = self
            .event_tx
            .take()
            .ok_or_else(|| ApiError::WebSocket("Event sender already taken".to_string()))?;

        let ws = self
            .ws
            .take()
            .ok_or_else(|| ApiError::Disconnected("Not connected".to_string()))?;

        let (_write, mut read) = ws.split();

        let _ = tx.send(MarketEvent::Connected).await;

        tokio::spawn(async move {
            while let Some(msg) = read.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        if let Some(event) = Self::parse_message(&text) {
                            if tx.send(event).await.is_err() {
                                error!("Failed to send event to channel");
                                break;
                            }
                        }
                    }
                    Ok(Message::Binary(data)) => {
                        // 일부 서버는 시세 프레임을 바이너리로 내려준다.
                        if let Ok(text) = String::from_utf8(data.to_vec()) {
                            if let Some(event) = Self::parse_message(&text) {
                                if tx.send(event).await.is_err() {
                                    error!("Failed to send event to channel");
                                    break;
                                }
                            }
                        }
                    }
                    Ok(Message::Ping(_)) => {
                        debug!("Received ping");
                        // Pong은 tungstenite에서 자동으로 처리됨
                    }
                    Ok(Message::Close(_)) => {
                        info!("WebSocket closed by server");
                        let _ = tx.send(MarketEvent::Disconnected).await;
                        break;
                    }
                    Err(e) => {
                        error!("WebSocket error: {}", e);
                        let _ = tx.send(MarketEvent::Error(e.to_string())).await;
                        break;
                    }
                    _ => {}
                }
            }
        });

        Ok(())
    }

    /// 다음 시세 이벤트를 반환합니다. 채널이 닫히면 `None`.
    pub async fn next_event(&mut self) -> Option<MarketEvent> {
        match &mut self.event_rx {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_ticker_frame() {
        let text = r#"{
            "type": "ticker",
            "code": "KRW-BTC",
            "trade_price": 50000000.0,
            "signed_change_price": 1200000.0,
            "signed_change_rate": 0.0246,
            "high_price": 51000000.0,
            "low_price": 48000000.0,
            "acc_trade_volume_24h": 1234.5,
            "timestamp": 1748770200000
        }"#;

        let event = TickerStream::parse_message(text).unwrap();
        let MarketEvent::Ticker(ticker) = event else {
            panic!("expected ticker event");
        };

        assert_eq!(ticker.code.as_str(), "KRW-BTC");
        assert_eq!(ticker.trade_price, dec!(50000000));
        assert!(ticker.is_rising());
    }

    #[test]
    fn test_parse_ignores_other_frames() {
        assert!(TickerStream::parse_message(r#"{"type":"orderbook","code":"KRW-BTC"}"#).is_none());
        assert!(TickerStream::parse_message("not json").is_none());
    }

    #[test]
    fn test_parse_decimal_clamps_non_finite() {
        assert_eq!(TickerStream::parse_decimal(f64::NAN), Decimal::ZERO);
        assert_eq!(TickerStream::parse_decimal(2.5), dec!(2.5));
    }
}
