use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use mongodb::bson::oid::ObjectId;
use tracing::{error, info, instrument, warn};

use crate::{
    analytics::Event,
    auth::jwt::AuthUser,
    movies::repo::Movie,
    state::AppState,
};

use super::dto::{CreateReviewRequest, MessageResponse};
use super::repo::Review;

pub fn routes() -> Router<AppState> {
    Router::new().route("/reviews", post(create_review))
}

#[instrument(skip(state, payload))]
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    let (movie_id, review, rating) = match (&payload.movie_id, &payload.review, payload.rating) {
        (Some(movie_id), Some(review), Some(rating))
            if !movie_id.is_empty() && !review.is_empty() =>
        {
            (movie_id.as_str(), review.as_str(), rating)
        }
        _ => {
            warn!("review missing required fields");
            return Err((
                StatusCode::BAD_REQUEST,
                "Missing required fields: movieId, review, and rating.".into(),
            ));
        }
    };

    let movie_id = ObjectId::parse_str(movie_id).map_err(|_| {
        warn!(movie_id, "malformed movie id");
        (
            StatusCode::BAD_REQUEST,
            "Invalid movie ID format.".to_string(),
        )
    })?;

    let movie = match Movie::find_by_id(&state.db, movie_id)
        .await
        .map_err(internal)?
    {
        Some(movie) => movie,
        None => return Err((StatusCode::NOT_FOUND, "Movie not found".into())),
    };

    let username = payload
        .username
        .clone()
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| user.username.clone());

    Review::create(&state.db, movie_id, &username, review, rating)
        .await
        .map_err(internal)?;
    info!(%movie_id, %username, rating, "review created");

    // Telemetry is best effort; the response never waits on it.
    let analytics = state.analytics.clone();
    let event = review_event(&movie, rating);
    tokio::spawn(async move {
        if let Err(error) = analytics.track_event(event).await {
            warn!(%error, "analytics event dropped");
        }
    });

    Ok(Json(MessageResponse {
        message: "Review created!".into(),
    }))
}

fn review_event(movie: &Movie, rating: f64) -> Event {
    Event {
        category: movie.genre.clone().unwrap_or_else(|| "Unknown".into()),
        action: "POST /reviews".into(),
        label: "API Request for Movie Review".into(),
        value: rating,
        dimension: movie.title.clone().unwrap_or_else(|| "Unknown".into()),
        metric: 1,
    }
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "review store operation failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::Document;

    fn movie(genre: Option<&str>, title: Option<&str>) -> Movie {
        Movie {
            id: ObjectId::new(),
            title: title.map(Into::into),
            genre: genre.map(Into::into),
            actors: Vec::new(),
            extra: Document::new(),
        }
    }

    #[test]
    fn review_event_copies_genre_title_and_rating() {
        let event = review_event(&movie(Some("Drama"), Some("Heat")), 5.0);
        assert_eq!(event.category, "Drama");
        assert_eq!(event.action, "POST /reviews");
        assert_eq!(event.label, "API Request for Movie Review");
        assert_eq!(event.value, 5.0);
        assert_eq!(event.dimension, "Heat");
        assert_eq!(event.metric, 1);
    }

    #[test]
    fn review_event_defaults_missing_movie_fields() {
        let event = review_event(&movie(None, None), 3.0);
        assert_eq!(event.category, "Unknown");
        assert_eq!(event.dimension, "Unknown");
    }
}
