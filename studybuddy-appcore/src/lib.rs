pub mod service;

pub use service::{AppService, ServiceError, user_facing_capture_error};
