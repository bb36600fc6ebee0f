use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use mongodb::bson::oid::ObjectId;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{jwt::AuthUser, repo::User},
    movies::repo::{Movie, RatedMovie},
    state::AppState,
};

use super::dto::AddToWatchlistRequest;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/watchlist", get(get_watchlist).post(add_to_watchlist))
        .route("/watchlist/:movie_id", delete(remove_from_watchlist))
}

#[instrument(skip(state))]
pub async fn get_watchlist(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<RatedMovie>>, (StatusCode, String)> {
    let record = match User::find_by_id(&state.db, user.id).await.map_err(internal)? {
        Some(record) => record,
        None => return Err((StatusCode::NOT_FOUND, "User not found.".into())),
    };

    let movies = Movie::find_rated_by_ids(&state.db, record.watchlist)
        .await
        .map_err(internal)?;
    Ok(Json(movies))
}

#[instrument(skip(state, payload))]
pub async fn add_to_watchlist(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddToWatchlistRequest>,
) -> Result<Json<Vec<RatedMovie>>, (StatusCode, String)> {
    let movie_id = payload.movie_id.as_deref().unwrap_or("");
    if movie_id.is_empty() {
        warn!("watchlist add missing movieId");
        return Err((
            StatusCode::BAD_REQUEST,
            "Missing required field: movieId.".into(),
        ));
    }

    let movie_id = ObjectId::parse_str(movie_id).map_err(|_| {
        warn!(movie_id, "malformed movie id");
        (
            StatusCode::BAD_REQUEST,
            "Invalid movie ID format.".to_string(),
        )
    })?;

    if Movie::find_by_id(&state.db, movie_id)
        .await
        .map_err(internal)?
        .is_none()
    {
        return Err((StatusCode::NOT_FOUND, "Movie not found".into()));
    }

    let record = match User::add_to_watchlist(&state.db, user.id, movie_id)
        .await
        .map_err(internal)?
    {
        Some(record) => record,
        None => return Err((StatusCode::NOT_FOUND, "User not found.".into())),
    };
    info!(user_id = %user.id, %movie_id, "movie added to watchlist");

    let movies = Movie::find_rated_by_ids(&state.db, record.watchlist)
        .await
        .map_err(internal)?;
    Ok(Json(movies))
}

#[instrument(skip(state))]
pub async fn remove_from_watchlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(movie_id): Path<String>,
) -> Result<Json<Vec<RatedMovie>>, (StatusCode, String)> {
    let movie_id = ObjectId::parse_str(&movie_id).map_err(|_| {
        warn!(%movie_id, "malformed movie id");
        (
            StatusCode::BAD_REQUEST,
            "Invalid movie ID format.".to_string(),
        )
    })?;

    // Removing a movie that is not on the list is a no-op.
    let record = match User::remove_from_watchlist(&state.db, user.id, movie_id)
        .await
        .map_err(internal)?
    {
        Some(record) => record,
        None => return Err((StatusCode::NOT_FOUND, "User not found.".into())),
    };
    info!(user_id = %user.id, %movie_id, "movie removed from watchlist");

    let movies = Movie::find_rated_by_ids(&state.db, record.watchlist)
        .await
        .map_err(internal)?;
    Ok(Json(movies))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "watchlist store operation failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
