use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::{
        couriers::{CourierList, CreateCourierRequest, UpdateAvailabilityRequest},
        orders::OrderList,
    },
    entity::{
        couriers::{ActiveModel, Column, Entity as Couriers, Model as CourierModel},
        orders::{Column as OrderCol, Entity as Orders, OrderStatus},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ROLE_COURIER, ensure_admin, ensure_courier},
    models::Courier,
    response::{ApiResponse, Meta},
    routes::params::CourierListQuery,
    services::order_service::order_from_entity,
    state::AppState,
};

/// Create the delivery profile for a user that already carries the courier role.
pub async fn create_courier(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCourierRequest,
) -> AppResult<ApiResponse<Courier>> {
    ensure_admin(user)?;

    let account = Users::find_by_id(payload.user_id).one(&state.orm).await?;
    let account = match account {
        Some(u) => u,
        None => return Err(AppError::BadRequest("User not found".into())),
    };
    if account.role != ROLE_COURIER {
        return Err(AppError::BadRequest(
            "user does not have the courier role".into(),
        ));
    }

    let existing = Couriers::find()
        .filter(Column::UserId.eq(payload.user_id))
        .one(&state.orm)
        .await?;
    if existing.is_some() {
        return Err(AppError::BadRequest(
            "courier profile already exists".into(),
        ));
    }

    let courier = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(payload.user_id),
        vehicle: Set(payload.vehicle),
        plate: Set(payload.plate),
        available: Set(true),
        rating: Set(5.0),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "courier_create",
        Some("couriers"),
        Some(serde_json::json!({ "courier_id": courier.id, "user_id": courier.user_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Courier created",
        courier_from_entity(courier),
        Some(Meta::empty()),
    ))
}

pub async fn list_couriers(
    state: &AppState,
    user: &AuthUser,
    query: CourierListQuery,
) -> AppResult<ApiResponse<CourierList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(available) = query.available {
        condition = condition.add(Column::Available.eq(available));
    }

    let finder = Couriers::find()
        .filter(condition)
        .order_by_desc(Column::Rating);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(courier_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Couriers",
        CourierList { items },
        Some(meta),
    ))
}

/// A courier flips their own availability between runs.
pub async fn set_my_availability(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateAvailabilityRequest,
) -> AppResult<ApiResponse<Courier>> {
    ensure_courier(user)?;

    let profile = Couriers::find()
        .filter(Column::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?;
    let profile = match profile {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let mut active: ActiveModel = profile.into();
    active.available = Set(payload.available);
    let courier = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "courier_availability",
        Some("couriers"),
        Some(serde_json::json!({ "courier_id": courier.id, "available": courier.available })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Availability updated",
        courier_from_entity(courier),
        Some(Meta::empty()),
    ))
}

/// Deliveries currently on this courier's plate, oldest first.
pub async fn my_orders(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<OrderList>> {
    ensure_courier(user)?;

    let profile = Couriers::find()
        .filter(Column::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?;
    let profile = match profile {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let items = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::CourierId.eq(profile.id))
                .add(
                    OrderCol::Status
                        .is_not_in([OrderStatus::Delivered, OrderStatus::Cancelled]),
                ),
        )
        .order_by_asc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Assigned orders",
        OrderList { items },
        Some(Meta::empty()),
    ))
}

pub fn courier_from_entity(model: CourierModel) -> Courier {
    Courier {
        id: model.id,
        user_id: model.user_id,
        vehicle: model.vehicle,
        plate: model.plate,
        available: model.available,
        rating: model.rating,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
