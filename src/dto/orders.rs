use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::orders::{OrderKind, OrderStatus},
    models::{Order, OrderItem, PaymentMethod},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub kind: OrderKind,
    pub payment_method_id: Uuid,
    pub delivery_address: Option<String>,
    pub delivery_reference: Option<String>,
    pub customer_note: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

/// Status snapshot keyed by order number, for the "where is my order" lookup.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderTracking {
    pub order_number: String,
    pub status: OrderStatus,
    pub kind: OrderKind,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub preparing_at: Option<DateTime<Utc>>,
    pub ready_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct PaymentMethodList {
    #[schema(value_type = Vec<PaymentMethod>)]
    pub items: Vec<PaymentMethod>,
}
