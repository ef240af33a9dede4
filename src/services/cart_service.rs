use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::cart::{AddToCartRequest, AdjustCartItemRequest, CartItemDto, CartList},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CartItem, Product},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
};

#[derive(FromRow)]
struct CartWithProductRow {
    cart_id: Uuid,
    quantity: i32,
    product_id: Uuid,
    name: String,
    description: Option<String>,
    price: i64,
    stock: i32,
    active: bool,
    promoted: bool,
    image_url: Option<String>,
    category_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct StockRow {
    stock: i32,
    active: bool,
}

pub async fn list_cart(
    pool: &DbPool,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<CartList>> {
    let (page, limit, offset) = pagination.normalize();
    let rows = sqlx::query_as::<_, CartWithProductRow>(
        r#"
        SELECT ci.id AS cart_id, ci.quantity,
               p.id AS product_id, p.name, p.description, p.price, p.stock, p.active,
               p.promoted, p.image_url, p.category_id, p.created_at, p.updated_at
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.user_id = $1
        ORDER BY ci.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user.user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cart_items WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_one(pool)
        .await?;

    // Whole-cart totals, not just the current page.
    let (total_items, total_price): (i64, i64) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(ci.quantity), 0)::BIGINT,
               COALESCE(SUM(ci.quantity * p.price), 0)::BIGINT
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.user_id = $1
        "#,
    )
    .bind(user.user_id)
    .fetch_one(pool)
    .await?;

    let items = rows
        .into_iter()
        .map(|row| CartItemDto {
            id: row.cart_id,
            subtotal: row.price * row.quantity as i64,
            product: Product {
                id: row.product_id,
                name: row.name,
                description: row.description,
                price: row.price,
                stock: row.stock,
                active: row.active,
                promoted: row.promoted,
                image_url: row.image_url,
                category_id: row.category_id,
                available: row.active && row.stock > 0,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            quantity: row.quantity,
        })
        .collect();

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success(
        "OK",
        CartList {
            items,
            total_items,
            total_price,
        },
        Some(meta),
    ))
}

async fn live_stock(pool: &DbPool, product_id: Uuid) -> AppResult<StockRow> {
    let row: Option<StockRow> =
        sqlx::query_as("SELECT stock, active FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_optional(pool)
            .await?;
    row.ok_or_else(|| AppError::BadRequest("product not found".to_string()))
}

/// Insert or replace the cart line for a product, validated against live stock.
pub async fn add_to_cart(
    pool: &DbPool,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let product = live_stock(pool, payload.product_id).await?;
    if !product.active || product.stock <= 0 {
        return Err(AppError::BadRequest("product is not available".to_string()));
    }
    if payload.quantity > product.stock {
        return Err(AppError::BadRequest(format!(
            "only {} left in stock",
            product.stock
        )));
    }

    let cart_item: CartItem = sqlx::query_as(
        r#"
        INSERT INTO cart_items (user_id, product_id, quantity)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, product_id) DO UPDATE SET quantity = EXCLUDED.quantity
        RETURNING *
        "#,
    )
    .bind(user.user_id)
    .bind(payload.product_id)
    .bind(payload.quantity)
    .fetch_one(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "cart_update",
        Some("cart_items"),
        Some(serde_json::json!({ "product_id": payload.product_id, "quantity": payload.quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("OK", cart_item, None))
}

/// Apply a signed delta to a cart line. Hitting zero removes the line;
/// it is never stored with a zero quantity.
pub async fn adjust_cart_item(
    pool: &DbPool,
    user: &AuthUser,
    product_id: Uuid,
    payload: AdjustCartItemRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing: Option<CartItem> =
        sqlx::query_as("SELECT * FROM cart_items WHERE user_id = $1 AND product_id = $2")
            .bind(user.user_id)
            .bind(product_id)
            .fetch_optional(pool)
            .await?;
    let existing = match existing {
        Some(item) => item,
        None => return Err(AppError::NotFound),
    };

    let new_quantity = existing.quantity + payload.delta;
    if new_quantity <= 0 {
        sqlx::query("DELETE FROM cart_items WHERE id = $1")
            .bind(existing.id)
            .execute(pool)
            .await?;

        if let Err(err) = log_audit(
            pool,
            Some(user.user_id),
            "cart_remove",
            Some("cart_items"),
            Some(serde_json::json!({ "product_id": product_id })),
        )
        .await
        {
            tracing::warn!(error = %err, "audit log failed");
        }

        return Ok(ApiResponse::success(
            "Removed from cart",
            serde_json::json!({}),
            Some(Meta::empty()),
        ));
    }

    let product = live_stock(pool, product_id).await?;
    if new_quantity > product.stock {
        return Err(AppError::BadRequest(format!(
            "only {} left in stock",
            product.stock
        )));
    }

    let updated: CartItem = sqlx::query_as(
        "UPDATE cart_items SET quantity = $2 WHERE id = $1 RETURNING *",
    )
    .bind(existing.id)
    .bind(new_quantity)
    .fetch_one(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "cart_update",
        Some("cart_items"),
        Some(serde_json::json!({ "product_id": product_id, "quantity": new_quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "OK",
        serde_json::to_value(updated).map_err(|e| AppError::Internal(e.into()))?,
        Some(Meta::empty()),
    ))
}

pub async fn remove_from_cart(
    pool: &DbPool,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM cart_items WHERE product_id = $1 AND user_id = $2")
        .bind(product_id)
        .bind(user.user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "cart_remove",
        Some("cart_items"),
        Some(serde_json::json!({ "product_id": product_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn clear_cart(
    pool: &DbPool,
    user: &AuthUser,
) -> AppResult<ApiResponse<serde_json::Value>> {
    sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user.user_id)
        .execute(pool)
        .await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "cart_clear",
        Some("cart_items"),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Cart cleared",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
