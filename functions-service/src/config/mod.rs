use secrecy::SecretString;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::Path;

/// Default callback URL of the deployed verification endpoint.
const DEFAULT_VERIFICATION_BASE_URL: &str =
    "https://handle-verification-click-5czh4imcxq-uc.a.run.app";

/// Built-in brand logo, used when nothing else is configured.
pub const DEFAULT_LOGO_URL: &str =
    "https://firebasestorage.googleapis.com/v0/b/finsync-8ea36.firebasestorage.app/o/icon-dark.png?alt=media&token=1f1862ab-cee1-4972-950c-b11549096d29";

#[derive(Debug, Clone, Deserialize)]
pub struct FunctionsConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub resend: ResendConfig,
    pub firebase: FirebaseConfig,
    pub verification: VerificationConfig,
    pub branding: BrandingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResendConfig {
    /// Resolved once at startup: secret file first, then environment.
    #[serde(skip)]
    pub api_key: Option<SecretString>,
    pub from_onboarding: String,
    pub from_alerts: String,
    pub from_info: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FirebaseConfig {
    pub database_url: String,
    /// Legacy database secret appended as `auth` query parameter.
    pub auth_token: Option<String>,
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerificationConfig {
    pub base_url: String,
    pub ttl_hours: i64,
    /// When set, successful verification redirects here instead of
    /// rendering the built-in success page.
    pub success_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrandingConfig {
    pub logo_url: String,
    pub bank_name: String,
}

impl FunctionsConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let secrets_dir =
            env::var("SECRETS_DIR").unwrap_or_else(|_| "/etc/secrets".to_string());
        let api_key = resolve_secret(&secrets_dir, "RESEND_API_KEY");
        if is_prod && api_key.is_none() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "RESEND_API_KEY is required in production but found neither in {} nor in the environment",
                secrets_dir
            )));
        }

        Ok(FunctionsConfig {
            common: common_config,
            resend: ResendConfig {
                api_key: api_key.map(SecretString::new),
                from_onboarding: get_env(
                    "RESEND_FROM_ONBOARDING",
                    Some("Onboarding <onboarding@finsyncdigitalservice.com>"),
                    is_prod,
                )?,
                from_alerts: get_env(
                    "RESEND_FROM_ALERTS",
                    Some("Finsync <alerts@finsyncdigitalservice.com>"),
                    is_prod,
                )?,
                from_info: get_env(
                    "RESEND_FROM_INFO",
                    Some("Finsync <info@finsyncdigitalservice.com>"),
                    is_prod,
                )?,
                enabled: env::var("RESEND_ENABLED")
                    .unwrap_or_else(|_| "false".to_string())
                    .parse()
                    .unwrap_or(false),
            },
            firebase: FirebaseConfig {
                database_url: get_env(
                    "FIREBASE_DB_URL",
                    Some("https://finsync-8ea36-default-rtdb.firebaseio.com"),
                    is_prod,
                )?,
                auth_token: env::var("FIREBASE_DB_AUTH").ok(),
                enabled: env::var("FIREBASE_ENABLED")
                    .unwrap_or_else(|_| "false".to_string())
                    .parse()
                    .unwrap_or(false),
            },
            verification: VerificationConfig {
                base_url: first_non_empty(&["FUNCTION_BASE_URL", "VERIFICATION_BASE_URL"])
                    .unwrap_or_else(|| DEFAULT_VERIFICATION_BASE_URL.to_string()),
                ttl_hours: env::var("VERIFICATION_TTL_HOURS")
                    .unwrap_or_else(|_| "1".to_string())
                    .parse()
                    .unwrap_or(1),
                success_url: env::var("VERIFICATION_SUCCESS_URL").ok(),
            },
            branding: BrandingConfig {
                logo_url: get_env("FINSYNC_LOGO_URL", Some(DEFAULT_LOGO_URL), false)?,
                bank_name: get_env("FINSYNC_BANK_NAME", Some("Finsync"), false)?,
            },
        })
    }
}

/// Resolve a secret value: managed secret mount first, then the environment.
/// Empty values count as absent so a send never proceeds with a blank key.
fn resolve_secret(secrets_dir: &str, name: &str) -> Option<String> {
    let path = Path::new(secrets_dir).join(name);
    if let Ok(contents) = std::fs::read_to_string(&path) {
        let trimmed = contents.trim();
        if !trimmed.is_empty() {
            tracing::debug!(secret = name, "Resolved secret from mounted store");
            return Some(trimmed.to_string());
        }
    }
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn first_non_empty(keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| env::var(k).ok().filter(|v| !v.trim().is_empty()))
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
