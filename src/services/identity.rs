use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Credentials, User};
use crate::services::passwords;
use crate::services::tokens::{TokenError, TokenPair};
use crate::state::AppState;
use crate::validation::FieldErrors;

pub const BAD_CREDENTIALS: &str = "No active account found with the given credentials";
pub const MISSING_CREDENTIALS: &str = "Authentication credentials were not provided.";
pub const INVALID_ACCESS_TOKEN: &str = "Given token not valid for any token type";
pub const INVALID_REFRESH_TOKEN: &str = "Token is invalid or expired";

pub fn register(state: &AppState, creds: Credentials) -> Result<User, AppError> {
    let hash = passwords::hash_password(&creds.password)?;

    let db = state.db()?;
    if queries::get_user_by_username(&db, &creds.username)?.is_some() {
        return Err(FieldErrors::single(
            "username",
            "A user with that username already exists.",
        )
        .into());
    }
    let user = queries::create_user(&db, &creds.username, &hash)?;

    tracing::info!(user_id = user.id, username = %user.username, "user registered");
    Ok(user)
}

pub fn obtain_tokens(state: &AppState, creds: &Credentials) -> Result<TokenPair, AppError> {
    let user = {
        let db = state.db()?;
        queries::get_user_by_username(&db, &creds.username)?
    };

    let user = match user {
        Some(u) if passwords::verify_password(&creds.password, &u.password_hash) => u,
        _ => {
            tracing::info!(username = %creds.username, "login failed");
            return Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()));
        }
    };

    state.tokens.issue_pair(user.id).map_err(token_failure)
}

pub fn refresh_access(state: &AppState, refresh_token: &str) -> Result<String, AppError> {
    state.tokens.refresh(refresh_token).map_err(|e| match e {
        TokenError::Invalid | TokenError::WrongType => {
            AppError::Unauthorized(INVALID_REFRESH_TOKEN.to_string())
        }
        other => token_failure(other),
    })
}

/// Resolves a bearer access token to a live user.
pub fn resolve_caller(state: &AppState, access_token: &str) -> Result<User, AppError> {
    let user_id = state.tokens.verify_access(access_token).map_err(|e| match e {
        TokenError::Invalid | TokenError::WrongType => {
            AppError::Unauthorized(INVALID_ACCESS_TOKEN.to_string())
        }
        other => token_failure(other),
    })?;

    let db = state.db()?;
    queries::get_user(&db, user_id)?
        .ok_or_else(|| AppError::Unauthorized(INVALID_ACCESS_TOKEN.to_string()))
}

fn token_failure(e: TokenError) -> AppError {
    AppError::Internal(anyhow::Error::new(e))
}
