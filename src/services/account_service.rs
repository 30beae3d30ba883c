use crate::adapters::database::DbPool;
use crate::adapters::database::user_repo::UserRepository;
use crate::domain::auth_session::AuthSession;
use crate::domain::user::UserSummary;
use crate::error::{AppError, Result};
use crate::services::auth_service::AuthService;
use opentelemetry::{KeyValue, global, metrics::Counter};

#[derive(Clone, Debug)]
struct AccountMetrics {
    users_registered_total: Counter<u64>,
    logins_total: Counter<u64>,
}

impl AccountMetrics {
    fn new() -> Self {
        let meter = global::meter("ephemeral-board");
        Self {
            users_registered_total: meter
                .u64_counter("users_registered_total")
                .with_description("Total number of successful user registrations")
                .build(),
            logins_total: meter
                .u64_counter("auth_login_total")
                .with_description("Login attempts, labelled by outcome")
                .build(),
        }
    }
}

/// Registration input after field validation.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password: String,
}

impl NewAccount {
    /// # Errors
    /// Returns a message describing the first invalid field.
    pub fn new(username: String, email: String, password: String) -> std::result::Result<Self, String> {
        if !(3..=256).contains(&username.chars().count()) {
            return Err("\"username\" length must be between 3 and 256 characters".to_string());
        }
        validate_email(&email)?;
        validate_password(&password)?;
        Ok(Self { username, email, password })
    }
}

/// # Errors
/// Returns a message if the address is out of bounds or obviously malformed.
pub fn validate_email(email: &str) -> std::result::Result<(), String> {
    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.'));
    if !(6..=256).contains(&email.chars().count()) || !well_formed {
        return Err("\"email\" must be a valid email".to_string());
    }
    Ok(())
}

/// # Errors
/// Returns a message if the password is too short or too long.
pub fn validate_password(password: &str) -> std::result::Result<(), String> {
    if !(6..=1024).contains(&password.chars().count()) {
        return Err("\"password\" length must be between 6 and 1024 characters".to_string());
    }
    Ok(())
}

#[derive(Clone, Debug)]
pub struct AccountService {
    pool: DbPool,
    user_repo: UserRepository,
    auth_service: AuthService,
    metrics: AccountMetrics,
}

impl AccountService {
    #[must_use]
    pub fn new(pool: DbPool, user_repo: UserRepository, auth_service: AuthService) -> Self {
        Self { pool, user_repo, auth_service, metrics: AccountMetrics::new() }
    }

    /// # Errors
    /// Returns `AppError::Conflict` if the email or username is taken.
    #[tracing::instrument(skip(self, account), fields(user_id = tracing::field::Empty), err(level = "warn"))]
    pub async fn register(&self, account: NewAccount) -> Result<UserSummary> {
        let password_hash = self.auth_service.hash_password(&account.password).await?;

        let mut conn = self.pool.acquire().await?;
        let user = self.user_repo.create(&mut conn, &account.username, &account.email, &password_hash).await?;

        tracing::Span::current().record("user_id", tracing::field::display(user.id));
        tracing::info!("User registered successfully");
        self.metrics.users_registered_total.add(1, &[]);

        Ok(UserSummary { id: user.id, username: user.username })
    }

    /// # Errors
    /// Returns `AppError::AuthError` if the credentials do not match an account.
    #[tracing::instrument(skip(self, email, password), fields(user_id = tracing::field::Empty), err(level = "warn"))]
    pub async fn login(&self, email: String, password: String) -> Result<AuthSession> {
        let mut conn = self.pool.acquire().await?;
        let Some(user) = self.user_repo.find_by_email(&mut conn, &email).await? else {
            tracing::warn!("Login failed: user not found");
            self.metrics.logins_total.add(1, &[KeyValue::new("status", "failure")]);
            return Err(AppError::AuthError);
        };
        drop(conn);

        tracing::Span::current().record("user_id", tracing::field::display(user.id));

        if !self.auth_service.verify_password(&password, &user.password_hash).await? {
            tracing::warn!("Login failed: invalid password");
            self.metrics.logins_total.add(1, &[KeyValue::new("status", "failure")]);
            return Err(AppError::AuthError);
        }

        let session = self.auth_service.create_session(user.id)?;
        tracing::info!("User logged in successfully");
        self.metrics.logins_total.add(1, &[KeyValue::new("status", "success")]);

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account_validation() {
        assert!(NewAccount::new("ab".into(), "alice@example.com".into(), "secret1".into()).is_err());
        assert!(NewAccount::new("alice".into(), "not-an-email".into(), "secret1".into()).is_err());
        assert!(NewAccount::new("alice".into(), "a@b.c".into(), "secret1".into()).is_err());
        assert!(NewAccount::new("alice".into(), "alice@example.com".into(), "short".into()).is_err());
        assert!(NewAccount::new("alice".into(), "alice@example.com".into(), "secret1".into()).is_ok());
    }

    #[test]
    fn test_email_shapes() {
        assert!(validate_email("user@example.org").is_ok());
        assert!(validate_email("@example.org").is_err());
        assert!(validate_email("user@.example").is_err());
        assert!(validate_email("user@localhost").is_err());
    }
}
