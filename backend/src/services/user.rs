//! Account service for registration, login and profile management

use bcrypt::{hash, verify, DEFAULT_COST};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::create_token;
use shared::models::{
    normalize_email, LoginInput, RegisterInput, UpdateProfileInput, User, UserProfile,
    UserWithToken,
};
use shared::validation::non_blank;

const USER_COLUMNS: &str =
    "id, name, email, password_hash, is_admin, avatar, created_at, updated_at";

/// Account service
#[derive(Clone)]
pub struct UserService {
    db: PgPool,
    jwt_secret: String,
    token_expiry: i64,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            token_expiry: config.jwt.token_expiry,
        }
    }

    /// Sign a bearer token for a user
    pub fn issue_token(&self, user: &User) -> AppResult<String> {
        create_token(user.id, user.is_admin, &self.jwt_secret, self.token_expiry)
    }

    fn with_token(&self, user: &User) -> AppResult<UserWithToken> {
        Ok(UserWithToken {
            profile: UserProfile::from(user),
            token: self.issue_token(user)?,
        })
    }

    /// Register a new customer account
    pub async fn register(&self, input: RegisterInput) -> AppResult<UserWithToken> {
        let email = normalize_email(&input.email);
        let name = input.name.trim().to_string();

        let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(&email)
            .fetch_one(&self.db)
            .await?;

        if existing > 0 {
            return Err(AppError::DuplicateEntry("email".to_string()));
        }

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&name)
        .bind(&email)
        .bind(&password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "email"))?;

        tracing::info!(user_id = %user.id, "User registered");

        self.with_token(&user)
    }

    /// Authenticate with email and password
    pub async fn login(&self, input: LoginInput) -> AppResult<UserWithToken> {
        let email = normalize_email(&input.email);

        let user = self
            .find_by_email(&email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        // Social accounts have no password to check against
        let stored = user
            .password_hash
            .as_deref()
            .ok_or(AppError::InvalidCredentials)?;

        let valid = verify(&input.password, stored)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        self.with_token(&user)
    }

    /// Fetch a user by id
    pub async fn get_user(&self, user_id: Uuid) -> AppResult<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    /// Fetch a user by normalized email
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    /// Public profile of a user
    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<UserProfile> {
        let user = self.get_user(user_id).await?;
        Ok(UserProfile::from(&user))
    }

    /// Apply a partial profile update and return a fresh token
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        input: UpdateProfileInput,
    ) -> AppResult<UserWithToken> {
        let current = self.get_user(user_id).await?;

        let name = non_blank(input.name).map(|n| n.trim().to_string());

        let email = match non_blank(input.email) {
            Some(raw) => {
                let email = normalize_email(&raw);
                if !validator::validate_email(&email) {
                    return Err(AppError::Validation {
                        field: "email".to_string(),
                        message: "Invalid email format".to_string(),
                    });
                }
                Some(email)
            }
            None => None,
        };

        let password_hash = match non_blank(input.password) {
            Some(password) => {
                if password.chars().count() < 6 {
                    return Err(AppError::Validation {
                        field: "password".to_string(),
                        message: "Password must be at least 6 characters".to_string(),
                    });
                }
                Some(
                    hash(&password, DEFAULT_COST).map_err(|e| {
                        AppError::Internal(format!("Password hashing failed: {}", e))
                    })?,
                )
            }
            None => None,
        };

        let avatar = non_blank(input.avatar);

        if let Some(email) = email.as_deref().filter(|e| *e != current.email) {
            let taken = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM users WHERE email = $1 AND id <> $2",
            )
            .bind(email)
            .bind(user_id)
            .fetch_one(&self.db)
            .await?;

            if taken > 0 {
                return Err(AppError::DuplicateEntry("email".to_string()));
            }
        }

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                avatar = COALESCE($5, avatar),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user_id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(avatar)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "email"))?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        self.with_token(&user)
    }

    /// Find the account for a social sign-in, creating it on first login
    pub async fn find_or_create_social(
        &self,
        name: &str,
        email: &str,
        avatar: &str,
    ) -> AppResult<User> {
        let email = normalize_email(email);

        if let Some(user) = self.find_by_email(&email).await? {
            return Ok(user);
        }

        // A concurrent first login may insert the same email; fall back to reading it
        let inserted = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, is_admin, avatar)
            VALUES ($1, $2, NULL, FALSE, $3)
            ON CONFLICT (email) DO NOTHING
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(name)
        .bind(&email)
        .bind(avatar)
        .fetch_optional(&self.db)
        .await?;

        match inserted {
            Some(user) => {
                tracing::info!(user_id = %user.id, "User created from social sign-in");
                Ok(user)
            }
            None => self
                .find_by_email(&email)
                .await?
                .ok_or_else(|| AppError::Internal("Social account vanished".to_string())),
        }
    }
}
