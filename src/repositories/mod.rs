pub mod activity_log_repository;
pub mod assignment_repository;
pub mod diagnostic_repository;
pub mod part_repository;
pub mod schedule_repository;
pub mod sync_run_repository;
pub mod vehicle_repository;
pub mod work_order_repository;
