pub mod cancel_dispatch;
pub mod get_dispatch_status;
pub mod get_settings;
pub mod list_deliveries;
pub mod list_groups;
pub mod list_instances;
pub mod register_instance;
pub mod start_dispatch;
pub mod update_settings;
