use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{SigninRequest, SigninResponse, SignupRequest, SignupResponse},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::{CreateUserError, User},
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), (StatusCode, String)> {
    let username = payload.username.as_deref().unwrap_or("");
    let password = payload.password.as_deref().unwrap_or("");

    if username.is_empty() || password.is_empty() {
        warn!("signup missing username or password");
        return Err((
            StatusCode::BAD_REQUEST,
            "Please include both username and password to signup.".into(),
        ));
    }

    let hash = match hash_password(password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "hash_password failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    match User::create(&state.db, payload.name.as_deref(), username, &hash).await {
        Ok(()) => {
            info!(%username, "user signed up");
            Ok((
                StatusCode::OK,
                Json(SignupResponse {
                    success: true,
                    message: "Successfully created new user.".into(),
                }),
            ))
        }
        Err(CreateUserError::DuplicateUsername) => {
            warn!(%username, "signup duplicate username");
            Ok((
                StatusCode::CONFLICT,
                Json(SignupResponse {
                    success: false,
                    message: "A user with that username already exists.".into(),
                }),
            ))
        }
        Err(CreateUserError::Database(e)) => {
            error!(error = %e, "create user failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn signin(
    State(state): State<AppState>,
    Json(payload): Json<SigninRequest>,
) -> Result<Json<SigninResponse>, (StatusCode, String)> {
    let username = payload.username.as_deref().unwrap_or("");
    let password = payload.password.as_deref().unwrap_or("");

    if username.is_empty() || password.is_empty() {
        warn!("signin missing username or password");
        return Err((
            StatusCode::BAD_REQUEST,
            "Please include both username and password to signin.".into(),
        ));
    }

    let user = match User::find_by_username(&state.db, username).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            // Unknown usernames get the same response as a bad password.
            warn!(%username, "signin unknown username");
            return Err((StatusCode::UNAUTHORIZED, "Authentication failed.".into()));
        }
        Err(e) => {
            error!(error = %e, "find_by_username failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    let ok = match verify_password(password, &user.password) {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, "verify_password failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    if !ok {
        warn!(%username, "signin invalid password");
        return Err((StatusCode::UNAUTHORIZED, "Authentication failed.".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&user.id, &user.username).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    info!(user_id = %user.id, %username, "user signed in");
    Ok(Json(SigninResponse {
        success: true,
        token: format!("JWT {token}"),
    }))
}
