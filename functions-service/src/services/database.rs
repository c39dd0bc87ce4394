use crate::config::FirebaseConfig;
use crate::models::{User, Verification};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Verification token matched {0} users; tokens must be unique")]
    TokenCollision(usize),
}

/// Access to user records at `/users/{userId}`.
///
/// The store never deletes users; this service only writes the verification
/// sub-record and the `verified` flag.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StoreError>;

    async fn put_user(&self, user_id: &str, user: &User) -> Result<(), StoreError>;

    async fn put_verification(
        &self,
        user_id: &str,
        verification: &Verification,
    ) -> Result<(), StoreError>;

    /// Find the user owning a verification token. Tokens are generated to be
    /// unique; more than one match is a data-integrity error.
    async fn find_by_verification_token(
        &self,
        token: &str,
    ) -> Result<Option<(String, User)>, StoreError>;

    /// Mark the user verified and clear the verification sub-record in one
    /// step, so a consumed token can never validate again.
    async fn mark_verified(&self, user_id: &str) -> Result<(), StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

/// Realtime Database REST client.
pub struct FirebaseStore {
    config: FirebaseConfig,
    client: reqwest::Client,
    base_url: String,
}

impl FirebaseStore {
    pub fn new(config: FirebaseConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| StoreError::Connection(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = config.database_url.trim_end_matches('/').to_string();

        Ok(Self {
            config,
            client,
            base_url,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}.json", self.base_url, path)
    }

    fn auth_query(&self) -> Vec<(String, String)> {
        match &self.config.auth_token {
            Some(token) => vec![("auth".to_string(), token.clone())],
            None => Vec::new(),
        }
    }

    async fn check(response: reqwest::Response, context: &str) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::RequestFailed(format!(
                "{}: database returned {}: {}",
                context, status, body
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl UserStore for FirebaseStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let response = self
            .client
            .get(self.url(&format!("users/{}", user_id)))
            .query(&self.auth_query())
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let response = Self::check(response, "get_user").await?;
        // RTDB returns JSON `null` for a missing node
        let user: Option<User> = response
            .json()
            .await
            .map_err(|e| StoreError::RequestFailed(format!("get_user: invalid body: {}", e)))?;
        Ok(user)
    }

    async fn put_user(&self, user_id: &str, user: &User) -> Result<(), StoreError> {
        let response = self
            .client
            .put(self.url(&format!("users/{}", user_id)))
            .query(&self.auth_query())
            .json(user)
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Self::check(response, "put_user").await?;
        Ok(())
    }

    async fn put_verification(
        &self,
        user_id: &str,
        verification: &Verification,
    ) -> Result<(), StoreError> {
        let response = self
            .client
            .patch(self.url(&format!("users/{}/verification", user_id)))
            .query(&self.auth_query())
            .json(verification)
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Self::check(response, "put_verification").await?;
        Ok(())
    }

    async fn find_by_verification_token(
        &self,
        token: &str,
    ) -> Result<Option<(String, User)>, StoreError> {
        let mut query = self.auth_query();
        query.push(("orderBy".to_string(), "\"verification/token\"".to_string()));
        query.push(("equalTo".to_string(), format!("\"{}\"", token)));
        query.push(("limitToFirst".to_string(), "2".to_string()));

        let response = self
            .client
            .get(self.url("users"))
            .query(&query)
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let response = Self::check(response, "find_by_verification_token").await?;
        let matches: Option<HashMap<String, User>> = response.json().await.map_err(|e| {
            StoreError::RequestFailed(format!("find_by_verification_token: invalid body: {}", e))
        })?;

        let matches = matches.unwrap_or_default();
        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.into_iter().next()),
            n => Err(StoreError::TokenCollision(n)),
        }
    }

    async fn mark_verified(&self, user_id: &str) -> Result<(), StoreError> {
        // Single PATCH at the user level sets the flag and removes the
        // sub-record together; RTDB deletes keys written as null.
        let response = self
            .client
            .patch(self.url(&format!("users/{}", user_id)))
            .query(&self.auth_query())
            .json(&serde_json::json!({ "verified": true, "verification": null }))
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Self::check(response, "mark_verified").await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        let mut query = self.auth_query();
        query.push(("shallow".to_string(), "true".to_string()));

        let response = self
            .client
            .get(self.url("users"))
            .query(&query)
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Self::check(response, "health_check").await?;
        Ok(())
    }
}

/// In-memory store used when Firebase is disabled (local dev and tests).
#[derive(Clone, Default)]
pub struct MemoryStore {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn put_user(&self, user_id: &str, user: &User) -> Result<(), StoreError> {
        self.users
            .write()
            .await
            .insert(user_id.to_string(), user.clone());
        Ok(())
    }

    async fn put_verification(
        &self,
        user_id: &str,
        verification: &Verification,
    ) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| StoreError::UserNotFound(user_id.to_string()))?;
        user.verification = Some(verification.clone());
        Ok(())
    }

    async fn find_by_verification_token(
        &self,
        token: &str,
    ) -> Result<Option<(String, User)>, StoreError> {
        let users = self.users.read().await;
        let matches: Vec<(String, User)> = users
            .iter()
            .filter(|(_, u)| {
                u.verification
                    .as_ref()
                    .is_some_and(|v| v.token == token)
            })
            .map(|(id, u)| (id.clone(), u.clone()))
            .collect();

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.into_iter().next()),
            n => Err(StoreError::TokenCollision(n)),
        }
    }

    async fn mark_verified(&self, user_id: &str) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| StoreError::UserNotFound(user_id.to_string()))?;
        user.verified = true;
        user.verification = None;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_token(token: &str) -> User {
        User {
            email: Some("a@example.com".to_string()),
            verification: Some(Verification::new(token.to_string(), 1)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn memory_store_finds_token_owner() {
        let store = MemoryStore::new();
        store
            .put_user("u1", &user_with_token("tok-1"))
            .await
            .expect("put");

        let found = store
            .find_by_verification_token("tok-1")
            .await
            .expect("lookup");
        assert_eq!(found.map(|(id, _)| id), Some("u1".to_string()));

        let missing = store
            .find_by_verification_token("tok-2")
            .await
            .expect("lookup");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn duplicate_tokens_are_a_collision_error() {
        let store = MemoryStore::new();
        store.put_user("u1", &user_with_token("dup")).await.unwrap();
        store.put_user("u2", &user_with_token("dup")).await.unwrap();

        let err = store.find_by_verification_token("dup").await.unwrap_err();
        assert!(matches!(err, StoreError::TokenCollision(2)));
    }

    #[tokio::test]
    async fn mark_verified_clears_the_sub_record() {
        let store = MemoryStore::new();
        store.put_user("u1", &user_with_token("tok")).await.unwrap();

        store.mark_verified("u1").await.expect("mark verified");

        let user = store.get_user("u1").await.unwrap().expect("user");
        assert!(user.verified);
        assert!(user.verification.is_none());
        assert!(store
            .find_by_verification_token("tok")
            .await
            .unwrap()
            .is_none());
    }
}
