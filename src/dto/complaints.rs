use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{entity::complaints::ComplaintReason, models::Complaint};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateComplaintRequest {
    pub order_id: Uuid,
    pub reason: ComplaintReason,
    pub description: String,
}

/// Staff update: move the workflow status and/or write a response.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateComplaintRequest {
    pub status: Option<String>,
    pub response: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ComplaintList {
    #[schema(value_type = Vec<Complaint>)]
    pub items: Vec<Complaint>,
}
