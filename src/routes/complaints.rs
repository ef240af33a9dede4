use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::complaints::{ComplaintList, CreateComplaintRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Complaint,
    response::ApiResponse,
    routes::params::Pagination,
    services::complaint_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_my_complaints).post(create_complaint))
}

#[utoipa::path(
    post,
    path = "/api/complaints",
    request_body = CreateComplaintRequest,
    responses(
        (status = 200, description = "File a complaint against one of your orders", body = ApiResponse<Complaint>),
        (status = 400, description = "Missing description"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Complaints"
)]
pub async fn create_complaint(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateComplaintRequest>,
) -> AppResult<Json<ApiResponse<Complaint>>> {
    let resp = complaint_service::create_complaint(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/complaints",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Caller's complaints, newest first", body = ApiResponse<ComplaintList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Complaints"
)]
pub async fn list_my_complaints(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ComplaintList>>> {
    let resp = complaint_service::list_my_complaints(&state, &user, pagination).await?;
    Ok(Json(resp))
}
