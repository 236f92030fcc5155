pub mod dashboard_controller;
pub mod maintenance_controller;
pub mod part_controller;
pub mod schedule_controller;
pub mod sync_controller;
pub mod vehicle_controller;
pub mod work_order_controller;
