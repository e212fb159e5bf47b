//! 주문 관련 명령.

use crate::context::CliContext;
use mockbit_core::{MarketCode, OrderRequest, OrderType, Side};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

/// 주문을 제출합니다.
pub async fn place(
    ctx: &CliContext,
    market: &str,
    side: &str,
    order_type: &str,
    quantity: &str,
    price: Option<&str>,
) -> anyhow::Result<()> {
    let market: MarketCode = market.parse()?;
    let side: Side = side.parse()?;
    let order_type: OrderType = order_type.parse()?;

    let quantity: Decimal = quantity
        .parse()
        .map_err(|_| anyhow::anyhow!("잘못된 수량: {}", quantity))?;

    let price: Option<Decimal> = price
        .map(|p| {
            p.parse()
                .map_err(|_| anyhow::anyhow!("잘못된 가격: {}", p))
        })
        .transpose()?;

    let request = match order_type {
        OrderType::Market => OrderRequest::market(market, side, quantity),
        OrderType::Limit => {
            let price = price.ok_or_else(|| anyhow::anyhow!("지정가 주문에는 --price가 필요합니다"))?;
            OrderRequest::limit(market, side, quantity, price)
        }
    };

    let order = ctx.api.place_order(&request).await?;

    info!(order_id = %order.id, "Order accepted");
    println!("\n✅ 주문 접수 완료");
    println!("  주문 ID:  {}", order.id);
    println!("  마켓:     {}", order.market);
    println!("  방향:     {}", order.side);
    println!("  유형:     {}", order.order_type);
    println!("  수량:     {}", order.remaining_quantity);
    if let Some(price) = order.price {
        println!("  지정가:   {} KRW", price);
    }
    Ok(())
}

/// 미체결 주문 목록을 출력합니다.
pub async fn list_open(ctx: &CliContext) -> anyhow::Result<()> {
    let orders = ctx.api.open_orders().await?;

    if orders.is_empty() {
        println!("\n미체결 주문이 없습니다.");
        return Ok(());
    }

    println!(
        "\n{:<38} {:<12} {:<6} {:>14} {:>16} {:<20}",
        "주문 ID", "마켓", "구분", "남은 수량", "지정가", "접수 시각"
    );
    println!("{}", "-".repeat(110));

    for order in &orders {
        println!(
            "{:<38} {:<12} {:<6} {:>14} {:>16} {:<20}",
            order.id,
            order.market,
            order.side,
            order.remaining_quantity,
            order
                .price
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string()),
            order.placed_at.format("%Y-%m-%d %H:%M:%S"),
        );
    }

    println!("\n총 {}건", orders.len());
    Ok(())
}

/// 주문을 취소합니다.
pub async fn cancel(ctx: &CliContext, order_id: &str) -> anyhow::Result<()> {
    let order_id: Uuid = order_id
        .parse()
        .map_err(|_| anyhow::anyhow!("잘못된 주문 ID: {}", order_id))?;

    let response = ctx.api.cancel_order(order_id).await?;
    println!("✅ {}", response.message);
    Ok(())
}
