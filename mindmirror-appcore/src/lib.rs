pub mod service;

pub use service::{AppService, ConfigOverrides, apply_setting, user_facing_capture_error};
