pub mod commit;
pub mod config;
pub mod contract;
pub mod core_service;
pub mod dispatch;
pub mod icon;
pub mod logging;
pub mod model;
pub mod navigator;
pub mod overlay_state;
pub mod page_guard;
pub mod runtime;
pub mod search;
pub mod settings;
pub mod transport;
pub mod trigger;
