//! HTTP handlers: trigger webhooks, the verification callback, the
//! informative-mail endpoint, and infrastructure probes.

pub mod health;
pub mod informative;
pub mod triggers;
pub mod verification;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use informative::send_informative;
pub use triggers::{notification_created, user_created};
pub use verification::handle_verification_click;
