//! 마켓/시세 관련 명령.

use crate::context::CliContext;
use mockbit_client::{MarketEvent, TickerStream};
use mockbit_core::{filter_markets, DecimalExt, MarketCode};
use rust_decimal::Decimal;
use tracing::{info, warn};

/// 마켓 목록 조회. 검색어를 주면 코드/종목명으로 필터링합니다.
pub async fn list_markets(ctx: &CliContext, search: Option<&str>) -> anyhow::Result<()> {
    let markets = ctx.api.markets().await?;
    let filtered = filter_markets(&markets, search.unwrap_or(""));

    if filtered.is_empty() {
        println!("검색 결과가 없습니다.");
        return Ok(());
    }

    println!("\n{:<12} {:<16} {}", "마켓", "한글명", "영문명");
    println!("{}", "-".repeat(48));
    for market in &filtered {
        println!(
            "{:<12} {:<16} {}",
            market.market, market.korean_name, market.english_name
        );
    }
    println!("\n총 {}개 마켓", filtered.len());
    Ok(())
}

/// 최대 재연결 시도 횟수.
const MAX_RECONNECTS: u32 = 5;

/// 실시간 시세를 구독해 출력합니다. Ctrl-C로 종료합니다.
pub async fn watch(ctx: &CliContext, codes: &[String]) -> anyhow::Result<()> {
    let codes: Vec<MarketCode> = codes
        .iter()
        .map(|c| c.parse())
        .collect::<Result<_, _>>()?;

    println!("실시간 시세 구독 중... (Ctrl-C로 종료)\n");

    let mut reconnects = 0u32;

    loop {
        match stream_once(ctx, &codes).await {
            Ok(()) => return Ok(()),
            Err(e) => {
                reconnects += 1;
                if reconnects > MAX_RECONNECTS {
                    anyhow::bail!("재연결 한도 초과: {}", e);
                }
                warn!(attempt = reconnects, "Ticker stream lost: {}", e);
                println!("⚠️  연결이 끊겼습니다. 재연결 중... ({}/{})", reconnects, MAX_RECONNECTS);
                tokio::time::sleep(std::time::Duration::from_secs(2)).await;
            }
        }
    }
}

/// 한 번의 WebSocket 세션을 수행합니다. 정상 종료는 `Ok`, 끊김은 `Err`.
async fn stream_once(ctx: &CliContext, codes: &[MarketCode]) -> anyhow::Result<()> {
    let mut stream = TickerStream::new(&ctx.config.api.ws_url);
    stream.connect().await?;
    stream.subscribe(codes).await?;
    stream.run().await?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("\n종료합니다.");
                return Ok(());
            }
            event = stream.next_event() => {
                match event {
                    Some(MarketEvent::Ticker(ticker)) => {
                        let rate_pct = ticker.signed_change_rate * Decimal::from(100);
                        let arrow = if ticker.is_rising() { "▲" } else { "▼" };
                        println!(
                            "{:<12} {:>16} KRW  {} {:>8} ({})",
                            ticker.code,
                            ticker.trade_price,
                            arrow,
                            rate_pct.round_half_up(2).to_percent_string(),
                            ticker.signed_change_price,
                        );
                    }
                    Some(MarketEvent::Connected) => {
                        info!("Ticker stream connected");
                    }
                    Some(MarketEvent::Disconnected) => {
                        anyhow::bail!("서버가 연결을 종료했습니다");
                    }
                    Some(MarketEvent::Error(e)) => {
                        anyhow::bail!("스트림 에러: {}", e);
                    }
                    None => {
                        anyhow::bail!("이벤트 채널이 닫혔습니다");
                    }
                }
            }
        }
    }
}
