use serde::{Deserialize, Serialize};

/// Request body for review submission; `username` falls back to the
/// authenticated caller's.
#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    #[serde(rename = "movieId")]
    pub movie_id: Option<String>,
    pub review: Option<String>,
    pub rating: Option<f64>,
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_accepts_camel_case_movie_id() {
        let payload: CreateReviewRequest =
            serde_json::from_str(r#"{"movieId":"abc","review":"good","rating":4}"#).unwrap();
        assert_eq!(payload.movie_id.as_deref(), Some("abc"));
        assert_eq!(payload.rating, Some(4.0));
        assert!(payload.username.is_none());
    }
}
