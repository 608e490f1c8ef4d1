use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::{
    dto::auth::{Claims, LoginRequest, ProfileResponse, SignupRequest, TokenResponse},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::ApiResponse,
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 8;

/// Issues and validates bearer tokens. Built once from configuration.
#[derive(Clone)]
pub struct AuthGateway {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl AuthGateway {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue_token(&self, user_id: Uuid) -> AppResult<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp().max(0) as usize,
            exp: expiration.timestamp().max(0) as usize,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
    }

    /// Resolve a token to the user id in its `sub` claim.
    pub fn authenticate(&self, token: &str) -> AppResult<Uuid> {
        let decoded = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

        Uuid::parse_str(&decoded.claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))
    }
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn validate_signup(payload: &SignupRequest) -> AppResult<()> {
    let email = payload.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::BadRequest("email is invalid".into()));
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub async fn signup(
    state: &AppState,
    payload: SignupRequest,
) -> AppResult<ApiResponse<TokenResponse>> {
    validate_signup(&payload)?;
    let email = payload.email.trim();

    if state.users.find_by_email(email).await?.is_some() {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = state.users.create(email, &password_hash).await?;
    let token = state.auth.issue_token(user.id)?;

    tracing::info!(user_id = %user.id, "user signed up");
    Ok(ApiResponse::success(
        "user successfully signed up",
        TokenResponse { token },
    ))
}

/// Check credentials and return the matching user id.
pub async fn verify_credentials(state: &AppState, email: &str, password: &str) -> AppResult<Uuid> {
    let invalid = || AppError::Unauthorized("invalid credentials".into());

    let user = state
        .users
        .find_by_email(email.trim())
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(password, &user.password_hash)? {
        return Err(invalid());
    }
    Ok(user.id)
}

pub async fn login(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<TokenResponse>> {
    let LoginRequest { email, password } = payload;
    let user_id = verify_credentials(state, &email, &password).await?;
    let token = state.auth.issue_token(user_id)?;

    tracing::info!(user_id = %user_id, "user logged in");
    Ok(ApiResponse::success(
        "user successfully logged in",
        TokenResponse { token },
    ))
}

pub async fn profile(state: &AppState, user: &AuthUser) -> AppResult<ProfileResponse> {
    let found = state
        .users
        .find_by_id(user.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("user no longer exists".into()))?;

    Ok(ProfileResponse { email: found.email })
}
