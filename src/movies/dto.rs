use serde::Deserialize;

/// `?reviews=true` switches list and detail responses to the aggregated
/// shape with `avgRating`.
#[derive(Debug, Deserialize)]
pub struct ReviewsQuery {
    #[serde(default)]
    pub reviews: bool,
}

/// Request body for free-text search.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: Option<String>,
}
