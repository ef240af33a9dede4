use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::orders::OrderKind;

#[derive(Debug, Deserialize, ToSchema)]
pub struct PosSaleItem {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PosSaleRequest {
    pub items: Vec<PosSaleItem>,
    pub kind: OrderKind,
    pub payment_method_id: Uuid,
    /// Total the register displayed; the server recomputes and must agree.
    pub total: i64,
    pub kitchen_note: Option<String>,
}
