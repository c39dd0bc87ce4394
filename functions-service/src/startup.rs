//! Application startup and lifecycle management.

use crate::config::FunctionsConfig;
use crate::handlers;
use crate::services::{
    init_metrics, EmailProvider, FirebaseStore, MemoryStore, MockEmailProvider,
    NotificationService, ResendProvider, UserStore, VerificationService,
};
use axum::{
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: FunctionsConfig,
    pub store: Arc<dyn UserStore>,
    pub email_provider: Arc<dyn EmailProvider>,
    pub verification: VerificationService,
    pub notifications: NotificationService,
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
    mock_email: Option<Arc<MockEmailProvider>>,
}

impl Application {
    /// Build the application: resolve the store and email provider once from
    /// configuration and bind the listener (port 0 = random port for tests).
    pub async fn build(config: FunctionsConfig) -> Result<Self, AppError> {
        init_metrics();

        let store: Arc<dyn UserStore> = if config.firebase.enabled {
            let store = FirebaseStore::new(config.firebase.clone())
                .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))?;
            tracing::info!(url = %config.firebase.database_url, "Realtime Database store initialized");
            Arc::new(store)
        } else {
            tracing::info!("Firebase disabled, using in-memory store");
            Arc::new(MemoryStore::new())
        };

        let mut mock_email = None;
        let email_provider: Arc<dyn EmailProvider> = if config.resend.enabled {
            let provider = ResendProvider::new(config.resend.clone())
                .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))?;
            tracing::info!("Resend email provider initialized");
            Arc::new(provider)
        } else {
            tracing::info!("Resend provider disabled, using mock email provider");
            let mock = Arc::new(MockEmailProvider::new(true));
            mock_email = Some(mock.clone());
            mock
        };

        let verification = VerificationService::new(
            store.clone(),
            email_provider.clone(),
            config.verification.clone(),
            config.resend.from_onboarding.clone(),
        );
        let notifications = NotificationService::new(
            store.clone(),
            email_provider.clone(),
            config.branding.clone(),
            config.resend.from_alerts.clone(),
        );

        let state = AppState {
            config: config.clone(),
            store,
            email_provider,
            verification,
            notifications,
        };

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Functions service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
            mock_email,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The user store, for seeding data in tests.
    pub fn store(&self) -> Arc<dyn UserStore> {
        self.state.store.clone()
    }

    /// The mock mailbox, present when the Resend provider is disabled.
    pub fn mock_email(&self) -> Option<Arc<MockEmailProvider>> {
        self.mock_email.clone()
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = router(self.state);
        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/triggers/user_created", post(handlers::user_created))
        .route(
            "/triggers/notification_created",
            post(handlers::notification_created),
        )
        .route(
            "/handle_verification_click",
            get(handlers::handle_verification_click).post(handlers::handle_verification_click),
        )
        .route("/send_informative", post(handlers::send_informative))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
