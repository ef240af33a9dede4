use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::{
        couriers::AssignCourierRequest,
        orders::{OrderList, OrderWithItems},
    },
    entity::{
        couriers::Entity as Couriers,
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, OrderKind,
            OrderStatus,
        },
        products::{
            ActiveModel as ProductActive, Column as ProdCol, Entity as Products,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_staff},
    models::{Order, Product},
    response::{ApiResponse, Meta},
    routes::admin::{InventoryAdjustRequest, LowStockQuery, ProductList, UpdateOrderStatusRequest},
    routes::params::{OrderListQuery, SortOrder},
    services::order_service::{order_from_entity, order_item_from_entity},
    services::product_service::product_from_entity,
    state::AppState,
};

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_staff(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        let status = OrderStatus::parse(status)
            .ok_or_else(|| AppError::BadRequest("Invalid order status".into()))?;
        condition = condition.add(OrderCol::Status.eq(status));
    }
    if let Some(kind) = query.kind.as_ref().filter(|k| !k.is_empty()) {
        let kind = match kind.as_str() {
            "dine_in" => OrderKind::DineIn,
            "pickup" => OrderKind::Pickup,
            "delivery" => OrderKind::Delivery,
            _ => return Err(AppError::BadRequest("Invalid order kind".into())),
        };
        condition = condition.add(OrderCol::Kind.eq(kind));
    }

    let mut finder = Orders::find().filter(condition);

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

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

    let order_list = OrderList { items: orders };

    Ok(ApiResponse::success("Orders", order_list, Some(meta)))
}

pub async fn get_order_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_staff(user)?;
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(order_from_entity);
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    let data = OrderWithItems { order, items };
    Ok(ApiResponse::success("Order found", data, Some(Meta::empty())))
}

/// Move an order through the fulfillment machine. Illegal moves are rejected;
/// each state stamps its own timestamp; cancelling puts the line-item stock
/// back, all inside one transaction.
pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_staff(user)?;
    let next = OrderStatus::parse(&payload.status)
        .ok_or_else(|| AppError::BadRequest("Invalid order status".into()))?;

    let txn = state.orm.begin().await?;

    let existing = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let existing = match existing {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let current = existing.status.clone();
    if !current.can_transition_to(&next) {
        return Err(AppError::BadRequest(format!(
            "cannot move order from {} to {}",
            current.as_str(),
            next.as_str()
        )));
    }

    let now = Utc::now();
    let mut active: OrderActive = existing.into();
    active.status = Set(next.clone());
    active.updated_at = Set(now.into());
    match next {
        OrderStatus::Confirmed => active.confirmed_at = Set(Some(now.into())),
        OrderStatus::InPreparation => active.preparing_at = Set(Some(now.into())),
        OrderStatus::Ready => active.ready_at = Set(Some(now.into())),
        OrderStatus::Delivered => active.delivered_at = Set(Some(now.into())),
        OrderStatus::Cancelled => active.cancelled_at = Set(Some(now.into())),
        OrderStatus::OutForDelivery | OrderStatus::Pending => {}
    }

    if next == OrderStatus::Cancelled {
        // The sale never happened; put the units back on the shelf.
        let items = OrderItems::find()
            .filter(OrderItemCol::OrderId.eq(id))
            .all(&txn)
            .await?;
        for item in items {
            Products::update_many()
                .col_expr(
                    ProdCol::Stock,
                    Expr::col(ProdCol::Stock).add(item.quantity),
                )
                .filter(ProdCol::Id.eq(item.product_id))
                .exec(&txn)
                .await?;
        }
    }

    let order = active.update(&txn).await?;
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({
            "order_id": order.id,
            "from": current.as_str(),
            "to": order.status.as_str(),
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order updated",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

/// Put an available courier on a delivery order.
pub async fn assign_courier(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: AssignCourierRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;

    let order = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    if order.kind != OrderKind::Delivery {
        return Err(AppError::BadRequest(
            "only delivery orders take a courier".into(),
        ));
    }
    if order.status.is_terminal() {
        return Err(AppError::BadRequest(format!(
            "order is already {}",
            order.status.as_str()
        )));
    }

    let courier = Couriers::find_by_id(payload.courier_id).one(&txn).await?;
    let courier = match courier {
        Some(c) => c,
        None => return Err(AppError::BadRequest("Courier not found".into())),
    };
    if !courier.available {
        return Err(AppError::BadRequest("Courier is not available".into()));
    }

    let mut active: OrderActive = order.into();
    active.courier_id = Set(Some(courier.id));
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_courier_assign",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "courier_id": courier.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Courier assigned",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

pub async fn list_low_stock(
    state: &AppState,
    user: &AuthUser,
    query: LowStockQuery,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_admin(user)?;
    let threshold = query.threshold.unwrap_or(5);
    let (page, limit, offset) = query.pagination.normalize();

    let mut finder = Products::find().filter(ProdCol::Stock.lte(threshold));
    finder = finder
        .order_by_asc(ProdCol::Stock)
        .order_by_desc(ProdCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let data = ProductList { items };
    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Low stock", data, Some(meta)))
}

pub async fn adjust_inventory(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: InventoryAdjustRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    if payload.delta == 0 {
        return Err(AppError::BadRequest("delta must not be 0".into()));
    }

    let txn = state.orm.begin().await?;
    let product = Products::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let new_stock = product.stock + payload.delta;
    if new_stock < 0 {
        return Err(AppError::BadRequest("stock cannot be negative".into()));
    }

    let mut active: ProductActive = product.into();
    active.stock = Set(new_stock);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "inventory_adjust",
        Some("products"),
        Some(serde_json::json!({ "product_id": updated.id, "delta": payload.delta })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Inventory updated",
        product_from_entity(updated),
        Some(Meta::empty()),
    ))
}
