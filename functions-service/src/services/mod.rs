pub mod database;
pub mod error;
pub mod metrics;
pub mod notifications;
pub mod providers;
pub mod templates;
pub mod verification;

pub use database::{FirebaseStore, MemoryStore, StoreError, UserStore};
pub use error::ServiceError;
pub use metrics::{get_metrics, init_metrics, record_email};
pub use notifications::{NotificationOutcome, NotificationService};
pub use providers::{
    EmailMessage, EmailProvider, MockEmailProvider, ProviderError, ProviderResponse,
    ResendProvider,
};
pub use verification::{VerificationOutcome, VerificationService};
