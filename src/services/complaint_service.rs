use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::complaints::{ComplaintList, CreateComplaintRequest, UpdateComplaintRequest},
    entity::{
        complaints::{
            ActiveModel, Column, ComplaintStatus, Entity as Complaints, Model as ComplaintModel,
        },
        orders::{Column as OrderCol, Entity as Orders},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::Complaint,
    response::{ApiResponse, Meta},
    routes::params::{ComplaintListQuery, Pagination},
    state::AppState,
};

/// A customer files a complaint against one of their own orders.
pub async fn create_complaint(
    state: &AppState,
    user: &AuthUser,
    payload: CreateComplaintRequest,
) -> AppResult<ApiResponse<Complaint>> {
    if payload.description.trim().is_empty() {
        return Err(AppError::BadRequest("description is required".into()));
    }

    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::Id.eq(payload.order_id))
                .add(OrderCol::UserId.eq(user.user_id)),
        )
        .one(&state.orm)
        .await?;
    if order.is_none() {
        return Err(AppError::NotFound);
    }

    let complaint = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        order_id: Set(payload.order_id),
        reason: Set(payload.reason),
        description: Set(payload.description),
        status: Set(ComplaintStatus::New),
        response: Set(None),
        attended_by: Set(None),
        created_at: NotSet,
        responded_at: Set(None),
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "complaint_create",
        Some("complaints"),
        Some(serde_json::json!({ "complaint_id": complaint.id, "order_id": complaint.order_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Complaint filed",
        complaint_from_entity(complaint),
        Some(Meta::empty()),
    ))
}

pub async fn list_my_complaints(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<ComplaintList>> {
    let (page, limit, offset) = pagination.normalize();

    let finder = Complaints::find()
        .filter(Column::UserId.eq(user.user_id))
        .order_by_desc(Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(complaint_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Complaints",
        ComplaintList { items },
        Some(meta),
    ))
}

/// Staff queue, oldest first so nothing rots at the bottom.
pub async fn list_all_complaints(
    state: &AppState,
    user: &AuthUser,
    query: ComplaintListQuery,
) -> AppResult<ApiResponse<ComplaintList>> {
    ensure_staff(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        let status = ComplaintStatus::parse(status)
            .ok_or_else(|| AppError::BadRequest("Invalid complaint status".into()))?;
        condition = condition.add(Column::Status.eq(status));
    }

    let finder = Complaints::find()
        .filter(condition)
        .order_by_asc(Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(complaint_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Complaints",
        ComplaintList { items },
        Some(meta),
    ))
}

/// Staff update: advance the workflow and/or answer the customer. Writing a
/// response stamps who answered and when, and moves a fresh complaint to
/// answered unless the caller chose a status explicitly.
pub async fn update_complaint(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateComplaintRequest,
) -> AppResult<ApiResponse<Complaint>> {
    ensure_staff(user)?;

    if payload.status.is_none() && payload.response.is_none() {
        return Err(AppError::BadRequest(
            "provide a status or a response".into(),
        ));
    }

    let status = match payload.status.as_deref() {
        Some(s) => Some(
            ComplaintStatus::parse(s)
                .ok_or_else(|| AppError::BadRequest("Invalid complaint status".into()))?,
        ),
        None => None,
    };

    let existing = Complaints::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    let mut active: ActiveModel = existing.into();
    if let Some(response) = payload.response {
        if response.trim().is_empty() {
            return Err(AppError::BadRequest("response must not be empty".into()));
        }
        active.response = Set(Some(response));
        active.attended_by = Set(Some(user.user_id));
        active.responded_at = Set(Some(Utc::now().into()));
        if status.is_none() {
            active.status = Set(ComplaintStatus::Answered);
        }
    }
    if let Some(status) = status {
        active.status = Set(status);
    }

    let complaint = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "complaint_update",
        Some("complaints"),
        Some(serde_json::json!({ "complaint_id": complaint.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Complaint updated",
        complaint_from_entity(complaint),
        Some(Meta::empty()),
    ))
}

pub fn complaint_from_entity(model: ComplaintModel) -> Complaint {
    Complaint {
        id: model.id,
        user_id: model.user_id,
        order_id: model.order_id,
        reason: model.reason,
        description: model.description,
        status: model.status,
        response: model.response,
        attended_by: model.attended_by,
        created_at: model.created_at.with_timezone(&Utc),
        responded_at: model.responded_at.map(|dt| dt.with_timezone(&Utc)),
    }
}
