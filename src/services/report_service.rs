use chrono::NaiveDate;
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::reports::{DailySales, DailySalesReport, TopProduct, TopProductsReport},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    response::{ApiResponse, Meta},
    routes::params::ReportQuery,
};

#[derive(FromRow)]
struct DailySalesRow {
    day: NaiveDate,
    orders: i64,
    revenue: i64,
}

#[derive(FromRow)]
struct TopProductRow {
    product_id: Uuid,
    name: String,
    quantity_sold: i64,
    revenue: i64,
}

/// Orders and revenue per day over the window. Cancelled orders never count.
pub async fn daily_sales(
    pool: &DbPool,
    user: &AuthUser,
    query: ReportQuery,
) -> AppResult<ApiResponse<DailySalesReport>> {
    ensure_admin(user)?;
    let days = query.days.unwrap_or(7).clamp(1, 90);

    let rows = sqlx::query_as::<_, DailySalesRow>(
        r#"
        SELECT CAST(o.created_at AT TIME ZONE 'UTC' AS DATE) AS day,
               COUNT(*) AS orders,
               COALESCE(SUM(o.total), 0)::BIGINT AS revenue
        FROM orders o
        WHERE o.status <> 'cancelled'
          AND o.created_at >= NOW() - make_interval(days => $1)
        GROUP BY day
        ORDER BY day DESC
        "#,
    )
    .bind(days)
    .fetch_all(pool)
    .await?;

    let items = rows
        .into_iter()
        .map(|row| DailySales {
            day: row.day,
            orders: row.orders,
            revenue: row.revenue,
        })
        .collect();

    Ok(ApiResponse::success(
        "Daily sales",
        DailySalesReport { items },
        Some(Meta::empty()),
    ))
}

/// Best sellers by units over the window.
pub async fn top_products(
    pool: &DbPool,
    user: &AuthUser,
    query: ReportQuery,
) -> AppResult<ApiResponse<TopProductsReport>> {
    ensure_admin(user)?;
    let days = query.days.unwrap_or(7).clamp(1, 90);
    let limit = query.limit.unwrap_or(5).clamp(1, 50);

    let rows = sqlx::query_as::<_, TopProductRow>(
        r#"
        SELECT oi.product_id, p.name,
               SUM(oi.quantity)::BIGINT AS quantity_sold,
               SUM(oi.subtotal)::BIGINT AS revenue
        FROM order_items oi
        JOIN orders o ON o.id = oi.order_id
        JOIN products p ON p.id = oi.product_id
        WHERE o.status <> 'cancelled'
          AND o.created_at >= NOW() - make_interval(days => $1)
        GROUP BY oi.product_id, p.name
        ORDER BY quantity_sold DESC, revenue DESC
        LIMIT $2
        "#,
    )
    .bind(days)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let items = rows
        .into_iter()
        .map(|row| TopProduct {
            product_id: row.product_id,
            name: row.name,
            quantity_sold: row.quantity_sold,
            revenue: row.revenue,
        })
        .collect();

    Ok(ApiResponse::success(
        "Top products",
        TopProductsReport { items },
        Some(Meta::empty()),
    ))
}
