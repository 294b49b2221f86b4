//! Caller identity: password hashing, access tokens and the bearer middleware.

pub mod jwt;
pub mod password;

use axum::{
    extract::{RawPathParams, Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use chrono::{DateTime, Duration, Utc};
use common::AuthResponse;
use ledger::{gate, profiles::profile_dto, sessions, Account, LedgerError};
use sea_orm::DatabaseConnection;
use tracing::{debug, warn};

pub use jwt::{Claims, TokenService};
use password::Argon2Hasher;

use crate::error::{error_response, ledger_error};
use crate::schemas::{AppState, ErrorResponse};

pub struct AuthService {
    pub hasher: Argon2Hasher,
    pub tokens: TokenService,
    pub refresh_ttl: Duration,
}

impl AuthService {
    /// Issues an access token plus a stored refresh token for `account`.
    pub async fn issue_session(
        &self,
        db: &DatabaseConnection,
        account: Account,
        now: DateTime<Utc>,
    ) -> Result<AuthResponse, LedgerError> {
        let refresh_token = sessions::issue(db, account.user.id, self.refresh_ttl, now).await?;
        self.session_response(account, refresh_token, now)
    }

    /// Builds the response around an already stored refresh token.
    pub fn session_response(
        &self,
        account: Account,
        refresh_token: String,
        now: DateTime<Utc>,
    ) -> Result<AuthResponse, LedgerError> {
        let access_token = self.tokens.issue(account.user.id, &account.user.email, now)?;
        let user = account.user_dto();

        Ok(AuthResponse {
            access_token,
            refresh_token,
            expires_in: self.tokens.expires_in(),
            user,
            profiles: account.profiles.into_iter().map(profile_dto).collect(),
        })
    }
}

/// Identity of the caller, inserted by [`require_auth`].
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: i32,
    pub email: String,
}

/// Rejects requests without a valid `Authorization: Bearer <token>` header.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            debug!("Request without authorization header");
            error_response(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "missing authorization header")
        })?;

    let mut parts = header.splitn(2, ' ');
    let (Some(scheme), Some(token)) = (parts.next(), parts.next()) else {
        return Err(error_response(
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            "invalid authorization header",
        ));
    };

    if !scheme.eq_ignore_ascii_case("Bearer") || token.trim().is_empty() {
        return Err(error_response(
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            "invalid authorization header",
        ));
    }

    let claims = state.auth.tokens.verify(token.trim()).map_err(ledger_error)?;
    let Some(user_id) = claims.user_id() else {
        warn!("Access token with non-numeric subject '{}'", claims.sub);
        return Err(ledger_error(LedgerError::Unauthorized("invalid token".to_string())));
    };

    request.extensions_mut().insert(AuthUser {
        id: user_id,
        email: claims.email,
    });
    Ok(next.run(request).await)
}

/// Checks that the caller owns the `:profile_id` of the matched route.
///
/// Runs after [`require_auth`] and before any body is read, so a foreign
/// profile is refused regardless of what the request carries.
pub async fn require_profile_access(
    State(state): State<AppState>,
    params: RawPathParams,
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let Some((_, raw)) = params.iter().find(|(name, _)| *name == "profile_id") else {
        return Ok(next.run(request).await);
    };

    let profile_id: i32 = raw.parse().map_err(|_| {
        debug!("Non-numeric profile id '{}'", raw);
        error_response(StatusCode::BAD_REQUEST, "INVALID_INPUT", "invalid profile id")
    })?;

    let Some(user) = request.extensions().get::<AuthUser>() else {
        warn!("Profile check ran without an authenticated caller");
        return Err(error_response(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "missing authorization header"));
    };

    gate::authorize_profile(&state.db, user.id, profile_id)
        .await
        .map_err(ledger_error)?;

    Ok(next.run(request).await)
}
