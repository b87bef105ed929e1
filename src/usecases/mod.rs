pub mod metrics;
pub mod sync_service;
