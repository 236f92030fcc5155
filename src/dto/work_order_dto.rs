//! DTOs de órdenes de trabajo

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateWorkOrderRequest {
    pub vehicle_id: Uuid,

    #[validate(length(min = 1, max = 500))]
    pub description: String,

    /// Low, Medium, High, Critical. Por defecto Medium.
    pub priority: Option<String>,

    pub reported_issue: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateWorkOrderStatusRequest {
    /// Open, In-progress, Completed, Cancelled
    #[validate(length(min = 1, max = 20))]
    pub status: String,

    pub diagnosis: Option<String>,
    pub resolution: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WorkOrderFilters {
    pub status: Option<String>,
}
