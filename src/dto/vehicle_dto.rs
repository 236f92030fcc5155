//! DTOs de vehículos

use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

/// Request para crear un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 11, max = 17))]
    pub vin: String,

    #[validate(length(min = 1, max = 50))]
    pub make: String,

    #[validate(length(min = 1, max = 50))]
    pub model: String,

    #[validate(range(min = 1900, max = 2100))]
    pub year: i32,

    pub license_plate: Option<String>,
    pub telematics_id: Option<String>,
    pub unit_number: Option<String>,
    pub status: Option<String>,
    pub mileage: Option<i32>,
    pub engine_hours: Option<Decimal>,
}

/// Request para actualizar un vehículo existente
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 11, max = 17))]
    pub vin: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub make: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub model: Option<String>,

    #[validate(range(min = 1900, max = 2100))]
    pub year: Option<i32>,

    pub license_plate: Option<String>,
    pub telematics_id: Option<String>,
    pub unit_number: Option<String>,
    pub status: Option<String>,
    pub mileage: Option<i32>,
    pub engine_hours: Option<Decimal>,
}
