use functions_service::config::{
    BrandingConfig, FirebaseConfig, FunctionsConfig, ResendConfig, VerificationConfig,
};
use functions_service::models::User;
use functions_service::services::{MockEmailProvider, UserStore};
use functions_service::startup::Application;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;

pub const TEST_BASE_URL: &str = "https://functions.test.local";
pub const TEST_DEFAULT_LOGO: &str = "https://cdn.test.local/default-logo.png";

pub struct TestApp {
    pub address: String,
    pub store: Arc<dyn UserStore>,
    pub mailbox: Arc<MockEmailProvider>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        // Port 0, in-memory store, mock mailbox
        let config = FunctionsConfig {
            common: CoreConfig { port: 0 },
            resend: ResendConfig {
                api_key: None,
                from_onboarding: "Onboarding <onboarding@test.local>".to_string(),
                from_alerts: "Finsync <alerts@test.local>".to_string(),
                from_info: "Finsync <info@test.local>".to_string(),
                enabled: false,
            },
            firebase: FirebaseConfig {
                database_url: "http://localhost:9000".to_string(),
                auth_token: None,
                enabled: false,
            },
            verification: VerificationConfig {
                base_url: TEST_BASE_URL.to_string(),
                ttl_hours: 1,
                success_url: None,
            },
            branding: BrandingConfig {
                logo_url: TEST_DEFAULT_LOGO.to_string(),
                bank_name: "Finsync".to_string(),
            },
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let store = app.store();
        let mailbox = app.mock_email().expect("Test application must use the mock provider");
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to come up
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            store,
            mailbox,
        }
    }

    /// Seed a user record as the external signup process would.
    pub async fn seed_user(&self, user_id: &str, user: User) {
        self.store
            .put_user(user_id, &user)
            .await
            .expect("Failed to seed user");
    }

    pub async fn user(&self, user_id: &str) -> User {
        self.store
            .get_user(user_id)
            .await
            .expect("Failed to load user")
            .expect("User not found")
    }
}

/// A minimal user with an email address, as created by signup.
pub fn user_with_email(email: &str) -> User {
    User {
        email: Some(email.to_string()),
        ..Default::default()
    }
}
