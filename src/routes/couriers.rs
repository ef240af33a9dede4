use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, patch, post},
};

use crate::{
    dto::{
        couriers::{CourierList, CreateCourierRequest, UpdateAvailabilityRequest},
        orders::OrderList,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Courier,
    response::ApiResponse,
    routes::params::CourierListQuery,
    services::courier_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_couriers).post(create_courier))
        .route("/me/availability", patch(set_my_availability))
        .route("/me/orders", get(my_orders))
}

#[utoipa::path(
    post,
    path = "/api/couriers",
    request_body = CreateCourierRequest,
    responses(
        (status = 200, description = "Create a courier profile (admin only)", body = ApiResponse<Courier>),
        (status = 400, description = "Unknown user, wrong role, or profile exists"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Couriers"
)]
pub async fn create_courier(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCourierRequest>,
) -> AppResult<Json<ApiResponse<Courier>>> {
    let resp = courier_service::create_courier(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/couriers",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("available" = Option<bool>, Query, description = "Filter by availability")
    ),
    responses(
        (status = 200, description = "List couriers (admin only)", body = ApiResponse<CourierList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Couriers"
)]
pub async fn list_couriers(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<CourierListQuery>,
) -> AppResult<Json<ApiResponse<CourierList>>> {
    let resp = courier_service::list_couriers(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/couriers/me/availability",
    request_body = UpdateAvailabilityRequest,
    responses(
        (status = 200, description = "Toggle own availability (courier only)", body = ApiResponse<Courier>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "No courier profile"),
    ),
    security(("bearer_auth" = [])),
    tag = "Couriers"
)]
pub async fn set_my_availability(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateAvailabilityRequest>,
) -> AppResult<Json<ApiResponse<Courier>>> {
    let resp = courier_service::set_my_availability(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/couriers/me/orders",
    responses(
        (status = 200, description = "Courier's open deliveries, oldest first", body = ApiResponse<OrderList>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "No courier profile"),
    ),
    security(("bearer_auth" = [])),
    tag = "Couriers"
)]
pub async fn my_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = courier_service::my_orders(&state, &user).await?;
    Ok(Json(resp))
}
