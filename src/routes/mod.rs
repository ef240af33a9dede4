use axum::{Router, routing::get};

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod complaints;
pub mod couriers;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod pos;
pub mod products;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/categories", categories::router())
        .nest("/products", products::router())
        .nest("/cart", cart::router())
        .nest("/orders", orders::router())
        .route("/payment-methods", get(orders::list_payment_methods))
        .nest("/pos", pos::router())
        .nest("/couriers", couriers::router())
        .nest("/complaints", complaints::router())
        .nest("/admin", admin::router())
}
