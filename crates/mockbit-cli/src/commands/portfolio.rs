//! 보유 자산/손익 관련 명령.

use crate::context::CliContext;
use chrono::Utc;
use mockbit_client::{AssetStore, MarketEvent, TickerStream};
use mockbit_core::{DecimalExt, MarketCode};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::warn;

/// 시세 수집 제한 시간.
const PRICE_COLLECT_TIMEOUT: Duration = Duration::from_secs(5);

/// WebSocket으로 잠깐 구독해 필요한 마켓들의 현재가를 수집합니다.
///
/// 모든 마켓의 시세를 받았거나 제한 시간이 지나면 종료합니다.
/// 수집하지 못한 마켓은 평가에서 제외되며, 그 사실을 경고로 남깁니다.
async fn collect_prices(ctx: &CliContext, store: &AssetStore, codes: &[MarketCode]) {
    if codes.is_empty() {
        return;
    }

    let mut pending: BTreeSet<MarketCode> = codes.iter().cloned().collect();

    let result = tokio::time::timeout(PRICE_COLLECT_TIMEOUT, async {
        let mut stream = TickerStream::new(&ctx.config.api.ws_url);
        stream.connect().await?;
        stream.subscribe(codes).await?;
        stream.run().await?;

        while !pending.is_empty() {
            match stream.next_event().await {
                Some(event @ MarketEvent::Ticker(_)) => {
                    if let MarketEvent::Ticker(ticker) = &event {
                        pending.remove(&ticker.code);
                    }
                    store.apply_event(&event).await;
                }
                Some(MarketEvent::Connected) => {}
                Some(MarketEvent::Disconnected) | None => break,
                Some(MarketEvent::Error(e)) => {
                    warn!("Ticker stream error while collecting prices: {}", e);
                    break;
                }
            }
        }
        Ok::<(), anyhow::Error>(())
    })
    .await;

    match result {
        Ok(Err(e)) => warn!("Price collection failed: {}", e),
        Err(_) => warn!("Price collection timed out"),
        Ok(Ok(())) => {}
    }
}

/// 보유 자산 평가와 총 자산 요약을 출력합니다.
pub async fn show_portfolio(ctx: &CliContext) -> anyhow::Result<()> {
    let store = AssetStore::new();
    store.refresh_portfolio(&ctx.api).await?;

    let holdings = store.holdings().await;
    let codes: Vec<MarketCode> = holdings.iter().map(|h| h.market_code.clone()).collect();
    collect_prices(ctx, &store, &codes).await;

    let report = store.valuation().await;
    let summary = store.summary().await;

    if holdings.is_empty() {
        println!("\n보유 종목이 없습니다.");
    } else {
        println!(
            "\n{:<12} {:>14} {:>16} {:>16} {:>16} {:>9}",
            "마켓", "수량", "평균단가", "평가금액", "평가손익", "수익률"
        );
        println!("{}", "-".repeat(90));

        let mut markets: Vec<_> = report.per_market.values().collect();
        markets.sort_by(|a, b| b.market_value.cmp(&a.market_value));

        for row in markets {
            println!(
                "{:<12} {:>14} {:>16} {:>16} {:>16} {:>9}",
                row.market,
                row.quantity,
                row.average_cost.round_half_up(0),
                row.market_value.round_half_up(0),
                row.profit().round_half_up(0),
                row.profit_rate().round_half_up(2).to_percent_string(),
            );
        }

        let unpriced = holdings.len() - report.per_market.len();
        if unpriced > 0 {
            println!("\n⚠️  시세를 받지 못한 {}개 종목은 평가에서 제외되었습니다.", unpriced);
        }
    }

    println!("\n총 매수 금액: {:>20} KRW", summary.total_buy_amount.round_half_up(0));
    println!("총 평가 금액: {:>20} KRW", summary.total_valuation.round_half_up(0));
    println!("총 평가 손익: {:>20} KRW ({})",
        summary.profit.round_half_up(0),
        summary.profit_rate.round_half_up(2).to_percent_string(),
    );
    println!("예수금 포함 총 자산: {:>13} KRW", summary.total_asset.round_half_up(0));

    let allocation = store.allocation().await;
    if !allocation.is_empty() {
        println!("\n보유 비중");
        for slice in allocation {
            println!("  {:<12} {:>7}", slice.market, slice.weight.to_percent_string());
        }
    }

    Ok(())
}

/// 거래내역을 출력합니다.
pub async fn show_history(ctx: &CliContext, days: Option<i64>) -> anyhow::Result<()> {
    let store = AssetStore::new();
    store.refresh_history(&ctx.api).await?;

    let mut records = store.trade_history().await;

    if let Some(days) = days {
        let cutoff = Utc::now() - chrono::Duration::days(days);
        records.retain(|r| r.executed_at >= cutoff);
    }

    if records.is_empty() {
        println!("\n거래 내역이 없습니다.");
        return Ok(());
    }

    // 최근 체결부터 출력
    records.sort_by_key(|r| std::cmp::Reverse(r.executed_at));

    println!(
        "\n{:<20} {:<12} {:<6} {:<8} {:>16} {:>16}",
        "체결 시각", "마켓", "구분", "유형", "수량", "단가"
    );
    println!("{}", "-".repeat(84));

    for record in &records {
        println!(
            "{:<20} {:<12} {:<6} {:<8} {:>16} {:>16}",
            record.executed_at.format("%Y-%m-%d %H:%M:%S"),
            record.market,
            record.side,
            record.order_type,
            record.quantity,
            record.unit_price,
        );
    }

    println!("\n총 {}건", records.len());
    Ok(())
}

/// 기간 누적 손익을 출력합니다.
pub async fn show_profit(ctx: &CliContext, days: i64) -> anyhow::Result<()> {
    if days <= 0 {
        anyhow::bail!("조회 기간은 1일 이상이어야 합니다");
    }

    let store = AssetStore::new();
    store.refresh_history(&ctx.api).await?;

    let records = store.trade_history().await;
    let codes: BTreeSet<MarketCode> = records.iter().map(|r| r.market.clone()).collect();
    let codes: Vec<MarketCode> = codes.into_iter().collect();
    collect_prices(ctx, &store, &codes).await;

    let summary = store.period_summary(days, Utc::now()).await;

    println!("\n최근 {}일 누적 손익", summary.window_days);
    println!("{}", "-".repeat(40));
    println!("기간 내 체결:     {:>12}건", summary.trade_count);
    println!("실현 손익:        {:>16} KRW", summary.realized_profit.round_half_up(0));
    println!("미실현 손익:      {:>16} KRW", summary.unrealized_profit.round_half_up(0));
    println!("누적 손익:        {:>16} KRW", summary.period_profit.round_half_up(0));
    println!(
        "누적 수익률:      {:>16}",
        summary.period_profit_rate.round_half_up(2).to_percent_string()
    );

    Ok(())
}
