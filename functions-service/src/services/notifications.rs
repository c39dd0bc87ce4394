use crate::config::BrandingConfig;
use crate::models::{Notification, NotificationKind, User};
use crate::services::metrics::record_email;
use crate::services::templates::{
    self, display_or_placeholder, format_amount, format_timestamp, DebitAlertFields,
};
use crate::services::{EmailMessage, EmailProvider, ServiceError, UserStore};
use chrono::Utc;
use std::sync::Arc;

/// Which template handled a notification-created event.
#[derive(Debug, PartialEq)]
pub enum NotificationOutcome {
    DebitAlertSent,
    /// Unknown notification types fall back to the informative template
    /// rather than being dropped or rejected.
    GenericSent,
}

#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn UserStore>,
    email: Arc<dyn EmailProvider>,
    branding: BrandingConfig,
    from: String,
}

impl NotificationService {
    pub fn new(
        store: Arc<dyn UserStore>,
        email: Arc<dyn EmailProvider>,
        branding: BrandingConfig,
        from: String,
    ) -> Self {
        Self {
            store,
            email,
            branding,
            from,
        }
    }

    /// Trigger: a notification record was created. Loads the owning user,
    /// renders the matching template, and sends the email.
    pub async fn handle_notification_created(
        &self,
        user_id: &str,
        notification_id: &str,
        notification: &Notification,
    ) -> Result<NotificationOutcome, ServiceError> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(ServiceError::UserNotFound)?;

        let Some(email) = user.email.as_deref().filter(|e| !e.trim().is_empty()) else {
            tracing::warn!(user_id = %user_id, "User has no email field, cannot deliver notification");
            return Err(ServiceError::MissingEmail);
        };

        let subject = notification
            .title
            .clone()
            .unwrap_or_else(|| "Debit Alert!".to_string());
        let logo_url = self.resolve_logo(notification, &user);

        let (html, outcome) = match notification.kind {
            NotificationKind::DebitAlert => (
                self.render_debit_alert(notification, notification_id, &user, logo_url),
                NotificationOutcome::DebitAlertSent,
            ),
            NotificationKind::Unknown => {
                tracing::warn!(
                    user_id = %user_id,
                    notification_id = %notification_id,
                    "Unknown notification type, falling back to informative template"
                );
                let body = notification
                    .body
                    .clone()
                    .unwrap_or_else(|| "You have a new notification on your account.".to_string());
                (
                    templates::render_informative(&subject, &body, user.display_name(), &logo_url),
                    NotificationOutcome::GenericSent,
                )
            }
        };

        let template = match outcome {
            NotificationOutcome::DebitAlertSent => "debit_alert",
            NotificationOutcome::GenericSent => "informative",
        };

        let message = EmailMessage {
            from: self.from.clone(),
            to: vec![email.to_string()],
            subject: subject.clone(),
            body_html: Some(html),
            body_text: None,
            reply_to: None,
        };

        let response = self.email.send(&message).await.inspect_err(|_| {
            record_email(template, "failed");
        })?;
        record_email(template, "sent");

        tracing::info!(
            user_id = %user_id,
            notification_id = %notification_id,
            kind = %notification.kind,
            to = %email,
            provider_id = ?response.provider_id,
            "Notification email sent"
        );

        Ok(outcome)
    }

    /// Branding logo precedence: data-level, then notification-level, then
    /// user-level, then the configured default.
    fn resolve_logo(&self, notification: &Notification, user: &User) -> String {
        notification
            .data
            .logo_url
            .clone()
            .or_else(|| notification.logo_url.clone())
            .or_else(|| user.logo_url.clone())
            .unwrap_or_else(|| self.branding.logo_url.clone())
    }

    fn render_debit_alert(
        &self,
        notification: &Notification,
        notification_id: &str,
        user: &User,
        logo_url: String,
    ) -> String {
        let data = &notification.data;

        let created_at = notification
            .created_at
            .map(|t| t.to_rfc3339())
            .or_else(|| data.date_time.clone())
            .unwrap_or_else(|| Utc::now().to_rfc3339());

        let reference = data
            .transaction_id
            .clone()
            .or_else(|| data.reference.clone())
            .unwrap_or_else(|| notification_id.to_string());

        let fields = DebitAlertFields {
            first_name: user.display_name().to_string(),
            amount: format_amount(data.amount),
            balance: format_amount(data.balance.or(user.account_balance)),
            account_number: display_or_placeholder(user.account_number.as_deref()),
            date_time: format_timestamp(&created_at),
            narration: display_or_placeholder(
                data.description.as_deref().or(notification.body.as_deref()),
            ),
            reference,
            bank_name: user
                .bank_name
                .clone()
                .unwrap_or_else(|| self.branding.bank_name.clone()),
            logo_url,
        };

        templates::render_debit_alert(&fields)
    }
}
