use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Fulfillment status of an order. Stored as a string column; the transition
/// table below is the single source of truth for which moves are legal.
#[derive(
    Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "in_preparation")]
    InPreparation,
    #[sea_orm(string_value = "ready")]
    Ready,
    #[sea_orm(string_value = "out_for_delivery")]
    OutForDelivery,
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl OrderStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "in_preparation" => Some(Self::InPreparation),
            "ready" => Some(Self::Ready),
            "out_for_delivery" => Some(Self::OutForDelivery),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::InPreparation => "in_preparation",
            Self::Ready => "ready",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Legal forward moves, plus cancellation from any non-terminal state.
    /// Dine-in and pickup orders go `ready -> delivered` directly.
    pub fn can_transition_to(&self, next: &OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (Pending, Confirmed)
            | (Confirmed, InPreparation)
            | (InPreparation, Ready)
            | (Ready, OutForDelivery)
            | (Ready, Delivered)
            | (OutForDelivery, Delivered) => true,
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}

/// How the order is fulfilled.
#[derive(
    Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    #[sea_orm(string_value = "dine_in")]
    DineIn,
    #[sea_orm(string_value = "pickup")]
    Pickup,
    #[sea_orm(string_value = "delivery")]
    Delivery,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub courier_id: Option<Uuid>,
    pub payment_method_id: Uuid,
    pub kind: OrderKind,
    pub status: OrderStatus,
    pub delivery_address: Option<String>,
    pub delivery_reference: Option<String>,
    pub subtotal: i64,
    pub shipping_fee: i64,
    pub total: i64,
    pub customer_note: Option<String>,
    pub kitchen_note: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub confirmed_at: Option<DateTimeWithTimeZone>,
    pub preparing_at: Option<DateTimeWithTimeZone>,
    pub ready_at: Option<DateTimeWithTimeZone>,
    pub delivered_at: Option<DateTimeWithTimeZone>,
    pub cancelled_at: Option<DateTimeWithTimeZone>,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::couriers::Entity",
        from = "Column::CourierId",
        to = "super::couriers::Column::Id"
    )]
    Couriers,
    #[sea_orm(
        belongs_to = "super::payment_methods::Entity",
        from = "Column::PaymentMethodId",
        to = "super::payment_methods::Column::Id"
    )]
    PaymentMethods,
    #[sea_orm(has_many = "super::order_items::Entity")]
    OrderItems,
    #[sea_orm(has_many = "super::complaints::Entity")]
    Complaints,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::couriers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Couriers.def()
    }
}

impl Related<super::payment_methods::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentMethods.def()
    }
}

impl Related<super::order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl Related<super::complaints::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Complaints.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::OrderStatus;

    #[test]
    fn forward_transitions_are_legal() {
        assert!(OrderStatus::Pending.can_transition_to(&OrderStatus::Confirmed));
        assert!(OrderStatus::Confirmed.can_transition_to(&OrderStatus::InPreparation));
        assert!(OrderStatus::InPreparation.can_transition_to(&OrderStatus::Ready));
        assert!(OrderStatus::Ready.can_transition_to(&OrderStatus::OutForDelivery));
        assert!(OrderStatus::OutForDelivery.can_transition_to(&OrderStatus::Delivered));
    }

    #[test]
    fn pickup_orders_can_skip_delivery_leg() {
        assert!(OrderStatus::Ready.can_transition_to(&OrderStatus::Delivered));
    }

    #[test]
    fn cannot_skip_ahead_or_move_backwards() {
        assert!(!OrderStatus::Pending.can_transition_to(&OrderStatus::Ready));
        assert!(!OrderStatus::Ready.can_transition_to(&OrderStatus::Confirmed));
        assert!(!OrderStatus::Pending.can_transition_to(&OrderStatus::Delivered));
    }

    #[test]
    fn cancellation_is_reachable_from_any_non_terminal_state() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::InPreparation,
            OrderStatus::Ready,
            OrderStatus::OutForDelivery,
        ] {
            assert!(status.can_transition_to(&OrderStatus::Cancelled));
        }
    }

    #[test]
    fn terminal_states_accept_nothing() {
        for next in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::InPreparation,
            OrderStatus::Ready,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert!(!OrderStatus::Cancelled.can_transition_to(&next));
            assert!(!OrderStatus::Delivered.can_transition_to(&next));
        }
    }

    #[test]
    fn parse_round_trips_every_status() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::InPreparation,
            OrderStatus::Ready,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("paid"), None);
    }
}
