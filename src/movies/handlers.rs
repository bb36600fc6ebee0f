use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use mongodb::bson::{oid::ObjectId, Document};
use tracing::{error, instrument, warn};

use crate::{auth::jwt::AuthUser, state::AppState};

use super::dto::{ReviewsQuery, SearchRequest};
use super::repo::Movie;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/movies", get(list_movies).post(create_movie))
        .route("/movies/search", post(search_movies))
        .route("/movies/:id", get(get_movie))
}

#[instrument(skip(state))]
pub async fn list_movies(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ReviewsQuery>,
) -> Result<Response, (StatusCode, String)> {
    if query.reviews {
        let movies = Movie::list_with_ratings(&state.db).await.map_err(internal)?;
        Ok(Json(movies).into_response())
    } else {
        let movies = Movie::list(&state.db).await.map_err(internal)?;
        Ok(Json(movies).into_response())
    }
}

#[instrument(skip(state))]
pub async fn get_movie(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
    Query(query): Query<ReviewsQuery>,
) -> Result<Response, (StatusCode, String)> {
    let movie_id = ObjectId::parse_str(&id).map_err(|_| {
        warn!(%id, "malformed movie id");
        (
            StatusCode::BAD_REQUEST,
            "Invalid movie ID format.".to_string(),
        )
    })?;

    if query.reviews {
        match Movie::find_with_reviews(&state.db, movie_id)
            .await
            .map_err(internal)?
        {
            Some(movie) => Ok(Json(movie).into_response()),
            None => Err((StatusCode::NOT_FOUND, "Movie not found.".into())),
        }
    } else {
        match Movie::find_by_id(&state.db, movie_id)
            .await
            .map_err(internal)?
        {
            Some(movie) => Ok(Json(movie).into_response()),
            None => Err((StatusCode::NOT_FOUND, "Movie not found.".into())),
        }
    }
}

/// Creation answers with the full collection, not just the new movie;
/// existing clients rely on that shape.
#[instrument(skip(state, payload))]
pub async fn create_movie(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(payload): Json<Document>,
) -> Result<Json<Vec<Movie>>, (StatusCode, String)> {
    Movie::create(&state.db, payload).await.map_err(internal)?;
    let movies = Movie::list(&state.db).await.map_err(internal)?;
    Ok(Json(movies))
}

#[instrument(skip(state, payload))]
pub async fn search_movies(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(payload): Json<SearchRequest>,
) -> Result<Json<Vec<Movie>>, (StatusCode, String)> {
    let query = payload.query.as_deref().unwrap_or("");
    if query.is_empty() {
        warn!("search missing query");
        return Err((
            StatusCode::BAD_REQUEST,
            "Missing required field: query.".into(),
        ));
    }

    let movies = Movie::search(&state.db, query).await.map_err(internal)?;
    Ok(Json(movies))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "movie store operation failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
