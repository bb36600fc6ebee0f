use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AddToWatchlistRequest {
    #[serde(rename = "movieId")]
    pub movie_id: Option<String>,
}
