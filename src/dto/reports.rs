use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct DailySales {
    pub day: NaiveDate,
    pub orders: i64,
    pub revenue: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct DailySalesReport {
    #[schema(value_type = Vec<DailySales>)]
    pub items: Vec<DailySales>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopProduct {
    pub product_id: Uuid,
    pub name: String,
    pub quantity_sold: i64,
    pub revenue: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct TopProductsReport {
    #[schema(value_type = Vec<TopProduct>)]
    pub items: Vec<TopProduct>,
}
