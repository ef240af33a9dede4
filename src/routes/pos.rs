use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};

use crate::{
    dto::{
        orders::{OrderList, OrderWithItems},
        pos::PosSaleRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::Pagination,
    services::pos_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/sales", post(register_sale).get(list_today_sales))
}

#[utoipa::path(
    post,
    path = "/api/pos/sales",
    request_body = PosSaleRequest,
    responses(
        (status = 200, description = "In-person sale recorded (cashier only)", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Empty sale, stale total, or insufficient stock"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "POS"
)]
pub async fn register_sale(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<PosSaleRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = pos_service::register_sale(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/pos/sales",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Cashier's sales for today", body = ApiResponse<OrderList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "POS"
)]
pub async fn list_today_sales(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = pos_service::list_today_sales(&state, &user, pagination).await?;
    Ok(Json(resp))
}
