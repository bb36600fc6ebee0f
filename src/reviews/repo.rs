use mongodb::bson::serde_helpers::serialize_object_id_as_hex_string;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::Database;
use serde::{Deserialize, Serialize};

use crate::db;

/// Review document; immutable once written. Duplicates per user/movie are
/// allowed, each submission is its own document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    pub id: ObjectId,
    #[serde(rename = "movieId", serialize_with = "serialize_object_id_as_hex_string")]
    pub movie_id: ObjectId,
    pub username: String,
    pub review: String,
    pub rating: f64,
}

impl Review {
    /// The caller has already checked that the movie exists; the reference
    /// itself is not enforced by the store.
    pub async fn create(
        db: &Database,
        movie_id: ObjectId,
        username: &str,
        review: &str,
        rating: f64,
    ) -> anyhow::Result<()> {
        let review = doc! {
            "movieId": movie_id,
            "username": username,
            "review": review,
            "rating": rating,
        };
        db.collection::<Document>(db::REVIEWS)
            .insert_one(review, None)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson;

    #[test]
    fn review_serializes_ids_as_hex() {
        let id = ObjectId::new();
        let movie_id = ObjectId::new();
        let review: Review = bson::from_document(doc! {
            "_id": id,
            "movieId": movie_id,
            "username": "alice",
            "review": "great",
            "rating": 5.0,
        })
        .expect("deserialize");

        let json = serde_json::to_value(&review).expect("serialize");
        assert_eq!(json["_id"], serde_json::json!(id.to_hex()));
        assert_eq!(json["movieId"], serde_json::json!(movie_id.to_hex()));
        assert_eq!(json["rating"], serde_json::json!(5.0));
    }
}
