use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Courier;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCourierRequest {
    pub user_id: Uuid,
    pub vehicle: Option<String>,
    pub plate: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAvailabilityRequest {
    pub available: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignCourierRequest {
    pub courier_id: Uuid,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct CourierList {
    #[schema(value_type = Vec<Courier>)]
    pub items: Vec<Courier>,
}
