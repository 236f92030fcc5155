pub mod activity_log;
pub mod alert;
pub mod diagnostic;
pub mod maintenance;
pub mod part;
pub mod sync_run;
pub mod vehicle;
pub mod work_order;
