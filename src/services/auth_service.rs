use crate::config::AuthConfig;
use crate::domain::auth::{Claims, Password};
use crate::domain::auth_session::AuthSession;
use crate::error::{AppError, Result};
use opentelemetry::{KeyValue, global, metrics::Counter};
use uuid::Uuid;

#[derive(Clone, Debug)]
struct Metrics {
    tokens_issued_total: Counter<u64>,
    token_rejections_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("ephemeral-board");
        Self {
            tokens_issued_total: meter
                .u64_counter("auth_tokens_issued_total")
                .with_description("Total number of access tokens issued")
                .build(),
            token_rejections_total: meter
                .u64_counter("auth_token_rejections_total")
                .with_description("Access tokens rejected during verification")
                .build(),
        }
    }
}

/// Password hashing and access-token issuance.
#[derive(Clone, Debug)]
pub struct AuthService {
    config: AuthConfig,
    metrics: Metrics,
}

impl AuthService {
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        Self { config, metrics: Metrics::new() }
    }

    /// Hashes on the blocking pool so argon2 does not stall the runtime.
    ///
    /// # Errors
    /// Returns `AppError::Internal` if hashing fails.
    #[tracing::instrument(err, skip(self, password))]
    pub async fn hash_password(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        tokio::task::spawn_blocking(move || Password::hash(&password)).await.map_err(|_| AppError::Internal)?
    }

    /// # Errors
    /// Returns `AppError::Internal` if the stored hash is unreadable.
    #[tracing::instrument(err, skip(self, password, password_hash))]
    pub async fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool> {
        let password = password.to_string();
        let password_hash = password_hash.to_string();
        tokio::task::spawn_blocking(move || Password::verify(&password, &password_hash))
            .await
            .map_err(|_| AppError::Internal)?
    }

    /// # Errors
    /// Returns `AppError::Internal` if the token cannot be signed.
    #[tracing::instrument(err, skip(self), fields(user_id = %user_id))]
    pub fn create_session(&self, user_id: Uuid) -> Result<AuthSession> {
        let claims = Claims::new(user_id, self.config.access_token_ttl_secs);
        let token = claims.encode(&self.config.jwt_secret)?;
        self.metrics.tokens_issued_total.add(1, &[]);
        Ok(AuthSession { token, expires_at: claims.exp })
    }

    /// Verifies an access token and returns the account id it was issued to.
    ///
    /// # Errors
    /// Returns `AppError::AuthError` if the token is invalid or expired.
    pub fn verify_token(&self, token: &str) -> Result<Uuid> {
        match Claims::decode(token, &self.config.jwt_secret) {
            Ok(claims) => Ok(claims.sub),
            Err(e) => {
                self.metrics.token_rejections_total.add(1, &[KeyValue::new("reason", "invalid")]);
                Err(e)
            }
        }
    }
}
