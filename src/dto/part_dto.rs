//! DTOs de inventario de repuestos

use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePartRequest {
    #[validate(length(min = 1, max = 50))]
    pub part_number: String,

    #[validate(length(min = 1, max = 100))]
    pub name: String,

    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub unit_cost: Option<Decimal>,

    #[validate(range(min = 0))]
    pub quantity_on_hand: i32,

    #[validate(range(min = 0))]
    pub minimum_quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePartRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub unit_cost: Option<Decimal>,

    #[validate(range(min = 0))]
    pub quantity_on_hand: Option<i32>,

    #[validate(range(min = 0))]
    pub minimum_quantity: Option<i32>,
}
