pub mod backup_scheduler;
pub mod live_store;
