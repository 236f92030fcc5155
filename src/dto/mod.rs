pub mod common;
pub mod dashboard_dto;
pub mod maintenance_dto;
pub mod part_dto;
pub mod telematics_dto;
pub mod vehicle_dto;
pub mod work_order_dto;
