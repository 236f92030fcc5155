pub mod alert_service;
pub mod due_state;
pub mod sync_service;
pub mod telematics_client;
