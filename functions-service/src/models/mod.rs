pub mod notification;
pub mod user;

pub use notification::{Notification, NotificationData, NotificationKind};
pub use user::{User, Verification};
