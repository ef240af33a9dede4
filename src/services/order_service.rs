use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{CheckoutRequest, OrderList, OrderTracking, OrderWithItems, PaymentMethodList},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders,
            Model as OrderModel, OrderKind, OrderStatus,
        },
        payment_methods::{Column as PaymentCol, Entity as PaymentMethods},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderItem, PaymentMethod},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
};

pub async fn list_payment_methods(
    state: &AppState,
) -> AppResult<ApiResponse<PaymentMethodList>> {
    let items = PaymentMethods::find()
        .filter(PaymentCol::Active.eq(true))
        .order_by_asc(PaymentCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|m| PaymentMethod {
            id: m.id,
            name: m.name,
            kind: m.kind,
            active: m.active,
        })
        .collect();

    Ok(ApiResponse::success(
        "Payment methods",
        PaymentMethodList { items },
        None,
    ))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        let status = OrderStatus::parse(status)
            .ok_or_else(|| AppError::BadRequest("Invalid order status".into()))?;
        condition = condition.add(OrderCol::Status.eq(status));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
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
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

/// Convert the caller's cart into an order. Product rows are locked for the
/// duration of the transaction so concurrent checkouts cannot oversell; any
/// validation failure rolls the whole thing back.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    if payload.kind == OrderKind::Delivery
        && payload
            .delivery_address
            .as_deref()
            .map_or(true, |a| a.trim().is_empty())
    {
        return Err(AppError::BadRequest(
            "delivery orders require a delivery address".into(),
        ));
    }

    let txn = state.orm.begin().await?;

    let method = PaymentMethods::find_by_id(payload.payment_method_id)
        .one(&txn)
        .await?;
    match method {
        Some(m) if m.active => {}
        _ => return Err(AppError::BadRequest("Invalid payment method".into())),
    }

    let cart = CartItems::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .all(&txn)
        .await?;
    if cart.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let product_ids: Vec<Uuid> = cart.iter().map(|item| item.product_id).collect();
    let products = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .lock(LockType::Update)
        .all(&txn)
        .await?;
    let products: HashMap<Uuid, _> = products.into_iter().map(|p| (p.id, p)).collect();

    let mut subtotal: i64 = 0;
    for item in &cart {
        let product = products
            .get(&item.product_id)
            .ok_or_else(|| AppError::BadRequest("product no longer exists".into()))?;
        if item.quantity <= 0 {
            return Err(AppError::BadRequest("Cart has invalid quantity".into()));
        }
        if !product.active {
            return Err(AppError::BadRequest(format!(
                "{} is no longer available",
                product.name
            )));
        }
        if product.stock < item.quantity {
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for {}",
                product.name
            )));
        }
        subtotal += product.price * (item.quantity as i64);
    }

    let shipping_fee = if payload.kind == OrderKind::Delivery {
        state.config.delivery_fee
    } else {
        0
    };

    let order_id = Uuid::new_v4();
    let order = OrderActive {
        id: Set(order_id),
        order_number: Set(build_order_number(order_id)),
        user_id: Set(user.user_id),
        courier_id: Set(None),
        payment_method_id: Set(payload.payment_method_id),
        kind: Set(payload.kind),
        status: Set(OrderStatus::Pending),
        delivery_address: Set(payload.delivery_address),
        delivery_reference: Set(payload.delivery_reference),
        subtotal: Set(subtotal),
        shipping_fee: Set(shipping_fee),
        total: Set(subtotal + shipping_fee),
        customer_note: Set(payload.customer_note),
        kitchen_note: Set(None),
        created_at: NotSet,
        confirmed_at: Set(None),
        preparing_at: Set(None),
        ready_at: Set(None),
        delivered_at: Set(None),
        cancelled_at: Set(None),
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut order_items: Vec<OrderItem> = Vec::new();

    for item in &cart {
        let product = &products[&item.product_id];
        let line = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(item.product_id),
            quantity: Set(item.quantity),
            unit_price: Set(product.price),
            subtotal: Set(product.price * (item.quantity as i64)),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;

        order_items.push(order_item_from_entity(line));

        // reduce stock
        Products::update_many()
            .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).sub(item.quantity))
            .filter(ProdCol::Id.eq(item.product_id))
            .exec(&txn)
            .await?;
    }

    // clear cart
    CartItems::delete_many()
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "checkout",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "order_number": order.order_number })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order placed",
        OrderWithItems {
            order: order_from_entity(order),
            items: order_items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?;
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

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn track_order(
    state: &AppState,
    user: &AuthUser,
    order_number: &str,
) -> AppResult<ApiResponse<OrderTracking>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::OrderNumber.eq(order_number)),
        )
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let tracking = OrderTracking {
        order_number: order.order_number,
        status: order.status,
        kind: order.kind,
        created_at: order.created_at.with_timezone(&Utc),
        confirmed_at: order.confirmed_at.map(|dt| dt.with_timezone(&Utc)),
        preparing_at: order.preparing_at.map(|dt| dt.with_timezone(&Utc)),
        ready_at: order.ready_at.map(|dt| dt.with_timezone(&Utc)),
        delivered_at: order.delivered_at.map(|dt| dt.with_timezone(&Utc)),
        cancelled_at: order.cancelled_at.map(|dt| dt.with_timezone(&Utc)),
    };

    Ok(ApiResponse::success("OK", tracking, Some(Meta::empty())))
}

pub fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        order_number: model.order_number,
        user_id: model.user_id,
        courier_id: model.courier_id,
        payment_method_id: model.payment_method_id,
        kind: model.kind,
        status: model.status,
        delivery_address: model.delivery_address,
        delivery_reference: model.delivery_reference,
        subtotal: model.subtotal,
        shipping_fee: model.shipping_fee,
        total: model.total,
        customer_note: model.customer_note,
        kitchen_note: model.kitchen_note,
        created_at: model.created_at.with_timezone(&Utc),
        confirmed_at: model.confirmed_at.map(|dt| dt.with_timezone(&Utc)),
        preparing_at: model.preparing_at.map(|dt| dt.with_timezone(&Utc)),
        ready_at: model.ready_at.map(|dt| dt.with_timezone(&Utc)),
        delivered_at: model.delivered_at.map(|dt| dt.with_timezone(&Utc)),
        cancelled_at: model.cancelled_at.map(|dt| dt.with_timezone(&Utc)),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        quantity: model.quantity,
        unit_price: model.unit_price,
        subtotal: model.subtotal,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub fn build_order_number(order_id: Uuid) -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = order_id.simple().to_string();
    let short = &suffix[..8];
    format!("ORD-{}-{}", date, short)
}

#[cfg(test)]
mod tests {
    use super::build_order_number;
    use uuid::Uuid;

    #[test]
    fn order_numbers_embed_date_and_id_prefix() {
        let id = Uuid::new_v4();
        let number = build_order_number(id);
        assert!(number.starts_with("ORD-"));
        // ORD- + YYYYMMDD + - + 8 hex chars
        assert_eq!(number.len(), 4 + 8 + 1 + 8);
        assert!(number.ends_with(&id.simple().to_string()[..8]));
    }
}
