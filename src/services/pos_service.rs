use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};
use sea_orm::ActiveModelTrait;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::{
        orders::{OrderList, OrderWithItems},
        pos::PosSaleRequest,
    },
    entity::{
        order_items::ActiveModel as OrderItemActive,
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, OrderKind, OrderStatus},
        payment_methods::Entity as PaymentMethods,
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_cashier},
    models::OrderItem,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::order_service::{build_order_number, order_from_entity, order_item_from_entity},
    state::AppState,
};

/// Register an in-person sale. The cashier's terminal sends the item list and
/// the total it displayed; the server re-reads every product under a row lock,
/// recomputes the total, and refuses to record a sale on stale prices or
/// insufficient stock. All-or-nothing.
pub async fn register_sale(
    state: &AppState,
    user: &AuthUser,
    payload: PosSaleRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_cashier(user)?;

    if payload.items.is_empty() {
        return Err(AppError::BadRequest("Sale has no items".into()));
    }
    if payload.kind == OrderKind::Delivery {
        return Err(AppError::BadRequest(
            "POS sales are dine-in or pickup only".into(),
        ));
    }

    // Collapse duplicate lines for the same product.
    let mut wanted: Vec<(Uuid, i32)> = Vec::new();
    for item in &payload.items {
        if item.quantity <= 0 {
            return Err(AppError::BadRequest(
                "quantity must be greater than 0".into(),
            ));
        }
        match wanted.iter_mut().find(|(id, _)| *id == item.product_id) {
            Some((_, quantity)) => *quantity += item.quantity,
            None => wanted.push((item.product_id, item.quantity)),
        }
    }

    let txn = state.orm.begin().await?;

    let method = PaymentMethods::find_by_id(payload.payment_method_id)
        .one(&txn)
        .await?;
    match method {
        Some(m) if m.active => {}
        _ => return Err(AppError::BadRequest("Invalid payment method".into())),
    }

    let product_ids: Vec<Uuid> = wanted.iter().map(|(id, _)| *id).collect();
    let products = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .lock(LockType::Update)
        .all(&txn)
        .await?;
    let products: HashMap<Uuid, _> = products.into_iter().map(|p| (p.id, p)).collect();

    let mut subtotal: i64 = 0;
    for (product_id, quantity) in &wanted {
        let product = products
            .get(product_id)
            .ok_or_else(|| AppError::BadRequest(format!("product {} not found", product_id)))?;
        if !product.active {
            return Err(AppError::BadRequest(format!(
                "{} is not available",
                product.name
            )));
        }
        if product.stock < *quantity {
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for {}",
                product.name
            )));
        }
        subtotal += product.price * (*quantity as i64);
    }

    if subtotal != payload.total {
        return Err(AppError::BadRequest(format!(
            "total mismatch: register shows {}, server computed {}",
            payload.total, subtotal
        )));
    }

    let now = Utc::now();
    let order_id = Uuid::new_v4();
    let order = OrderActive {
        id: Set(order_id),
        order_number: Set(build_order_number(order_id)),
        user_id: Set(user.user_id),
        courier_id: Set(None),
        payment_method_id: Set(payload.payment_method_id),
        kind: Set(payload.kind),
        // In-person sales have no pending phase; the kitchen works from confirmed.
        status: Set(OrderStatus::Confirmed),
        delivery_address: Set(None),
        delivery_reference: Set(None),
        subtotal: Set(subtotal),
        shipping_fee: Set(0),
        total: Set(subtotal),
        customer_note: Set(None),
        kitchen_note: Set(payload.kitchen_note),
        created_at: NotSet,
        confirmed_at: Set(Some(now.into())),
        preparing_at: Set(None),
        ready_at: Set(None),
        delivered_at: Set(None),
        cancelled_at: Set(None),
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut order_items: Vec<OrderItem> = Vec::new();
    for (product_id, quantity) in &wanted {
        let product = &products[product_id];
        let line = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(*product_id),
            quantity: Set(*quantity),
            unit_price: Set(product.price),
            subtotal: Set(product.price * (*quantity as i64)),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;

        order_items.push(order_item_from_entity(line));

        Products::update_many()
            .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).sub(*quantity))
            .filter(ProdCol::Id.eq(*product_id))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "pos_sale",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "total": order.total })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Sale recorded",
        OrderWithItems {
            order: order_from_entity(order),
            items: order_items,
        },
        Some(Meta::empty()),
    ))
}

/// The cashier's sales since local midnight UTC, newest first.
pub async fn list_today_sales(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_cashier(user)?;
    let (page, limit, offset) = pagination.normalize();

    let start_of_day = Utc::now()
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("invalid day start")))?;

    let condition = Condition::all()
        .add(OrderCol::UserId.eq(user.user_id))
        .add(OrderCol::CreatedAt.gte(start_of_day));

    let finder = Orders::find()
        .filter(condition)
        .order_by_desc(OrderCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Sales",
        OrderList { items: orders },
        Some(meta),
    ))
}
