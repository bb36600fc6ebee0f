use futures::TryStreamExt;
use mongodb::bson::serde_helpers::serialize_object_id_as_hex_string;
use mongodb::bson::{self, doc, oid::ObjectId, Document};
use mongodb::{Collection, Cursor, Database};
use serde::{Deserialize, Serialize};

use crate::db;
use crate::reviews::repo::Review;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    #[serde(rename = "actorName", skip_serializing_if = "Option::is_none")]
    pub actor_name: Option<String>,
    #[serde(flatten)]
    pub extra: Document,
}

/// Movie document. Creation persists whatever the client sent, so typed
/// reads keep every field optional and catch the remainder in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    pub id: ObjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actors: Vec<Actor>,
    #[serde(flatten)]
    pub extra: Document,
}

/// Movie joined with its reviews; `avg_rating` is null when the movie has
/// none, and `reviews` is embedded only in the detail shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatedMovie {
    #[serde(flatten)]
    pub movie: Movie,
    #[serde(rename = "avgRating")]
    pub avg_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<Vec<Review>>,
}

fn movies(db: &Database) -> Collection<Movie> {
    db.collection(db::MOVIES)
}

fn rating_lookup_stages() -> Vec<Document> {
    vec![
        doc! { "$lookup": {
            "from": db::REVIEWS,
            "localField": "_id",
            "foreignField": "movieId",
            "as": "reviews",
        } },
        doc! { "$addFields": { "avgRating": { "$avg": "$reviews.rating" } } },
    ]
}

fn list_with_ratings_pipeline() -> Vec<Document> {
    let mut pipeline = rating_lookup_stages();
    // Null averages are the BSON minimum, so reviewless movies sort last.
    pipeline.push(doc! { "$sort": { "avgRating": -1 } });
    pipeline.push(doc! { "$project": { "reviews": 0 } });
    pipeline
}

fn movie_with_reviews_pipeline(movie_id: ObjectId) -> Vec<Document> {
    let mut pipeline = vec![doc! { "$match": { "_id": movie_id } }];
    pipeline.extend(rating_lookup_stages());
    pipeline
}

fn rated_by_ids_pipeline(ids: Vec<ObjectId>) -> Vec<Document> {
    let mut pipeline = vec![doc! { "$match": { "_id": { "$in": ids } } }];
    pipeline.extend(rating_lookup_stages());
    pipeline.push(doc! { "$project": { "reviews": 0 } });
    pipeline
}

pub(crate) fn search_filter(query: &str) -> Document {
    doc! {
        "$or": [
            { "title": { "$regex": query, "$options": "i" } },
            { "actors.actorName": { "$regex": query, "$options": "i" } },
        ]
    }
}

async fn collect_rated(mut cursor: Cursor<Document>) -> anyhow::Result<Vec<RatedMovie>> {
    let mut out = Vec::new();
    while let Some(document) = cursor.try_next().await? {
        out.push(bson::from_document(document)?);
    }
    Ok(out)
}

impl Movie {
    pub async fn list(db: &Database) -> anyhow::Result<Vec<Movie>> {
        let cursor = movies(db).find(doc! {}, None).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn list_with_ratings(db: &Database) -> anyhow::Result<Vec<RatedMovie>> {
        let cursor = movies(db)
            .aggregate(list_with_ratings_pipeline(), None)
            .await?;
        collect_rated(cursor).await
    }

    pub async fn find_by_id(db: &Database, id: ObjectId) -> anyhow::Result<Option<Movie>> {
        let movie = movies(db).find_one(doc! { "_id": id }, None).await?;
        Ok(movie)
    }

    pub async fn find_with_reviews(
        db: &Database,
        id: ObjectId,
    ) -> anyhow::Result<Option<RatedMovie>> {
        let cursor = movies(db)
            .aggregate(movie_with_reviews_pipeline(id), None)
            .await?;
        let mut rated = collect_rated(cursor).await?;
        Ok(rated.pop())
    }

    /// Persist the client document unmodified; the store assigns the id.
    pub async fn create(db: &Database, payload: Document) -> anyhow::Result<()> {
        db.collection::<Document>(db::MOVIES)
            .insert_one(payload, None)
            .await?;
        Ok(())
    }

    /// Case-insensitive pattern match on title or any actor name, in
    /// store-native order.
    pub async fn search(db: &Database, query: &str) -> anyhow::Result<Vec<Movie>> {
        let cursor = movies(db).find(search_filter(query), None).await?;
        Ok(cursor.try_collect().await?)
    }

    /// Expand watchlist references into rated movies.
    pub async fn find_rated_by_ids(
        db: &Database,
        ids: Vec<ObjectId>,
    ) -> anyhow::Result<Vec<RatedMovie>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = movies(db).aggregate(rated_by_ids_pipeline(ids), None).await?;
        collect_rated(cursor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::Bson;

    #[test]
    fn list_pipeline_joins_reviews_and_sorts_descending() {
        let pipeline = list_with_ratings_pipeline();

        let lookup = pipeline[0].get_document("$lookup").expect("lookup stage");
        assert_eq!(lookup.get_str("from").unwrap(), "reviews");
        assert_eq!(lookup.get_str("localField").unwrap(), "_id");
        assert_eq!(lookup.get_str("foreignField").unwrap(), "movieId");

        let fields = pipeline[1]
            .get_document("$addFields")
            .expect("addFields stage");
        let avg = fields.get_document("avgRating").unwrap();
        assert_eq!(avg.get_str("$avg").unwrap(), "$reviews.rating");

        let sort = pipeline[2].get_document("$sort").expect("sort stage");
        assert_eq!(sort.get_i32("avgRating").unwrap(), -1);

        // The list shape drops the embedded join.
        let project = pipeline[3].get_document("$project").expect("project stage");
        assert_eq!(project.get_i32("reviews").unwrap(), 0);
    }

    #[test]
    fn detail_pipeline_matches_the_movie_and_keeps_reviews() {
        let id = ObjectId::new();
        let pipeline = movie_with_reviews_pipeline(id);

        let matched = pipeline[0].get_document("$match").expect("match stage");
        assert_eq!(matched.get_object_id("_id").unwrap(), id);
        assert!(pipeline.iter().any(|stage| stage.contains_key("$lookup")));
        assert!(!pipeline.iter().any(|stage| stage.contains_key("$project")));
    }

    #[test]
    fn watchlist_pipeline_filters_by_membership() {
        let ids = vec![ObjectId::new(), ObjectId::new()];
        let pipeline = rated_by_ids_pipeline(ids.clone());

        let matched = pipeline[0].get_document("$match").expect("match stage");
        let members = matched
            .get_document("_id")
            .unwrap()
            .get_array("$in")
            .unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0], Bson::ObjectId(ids[0]));
    }

    #[test]
    fn search_filter_is_case_insensitive_over_title_and_actors() {
        let filter = search_filter("star");
        let or = filter.get_array("$or").expect("$or clauses");

        let title = or[0].as_document().unwrap().get_document("title").unwrap();
        assert_eq!(title.get_str("$regex").unwrap(), "star");
        assert_eq!(title.get_str("$options").unwrap(), "i");

        let actors = or[1]
            .as_document()
            .unwrap()
            .get_document("actors.actorName")
            .unwrap();
        assert_eq!(actors.get_str("$regex").unwrap(), "star");
        assert_eq!(actors.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn movie_serializes_id_as_hex_and_keeps_extra_fields() {
        let id = ObjectId::new();
        let movie: Movie = bson::from_document(doc! {
            "_id": id,
            "title": "Arrival",
            "genre": "Science Fiction",
            "actors": [{ "actorName": "Amy Adams", "characterName": "Louise Banks" }],
            "releaseYear": 2016,
        })
        .expect("deserialize");

        assert_eq!(movie.title.as_deref(), Some("Arrival"));
        assert_eq!(movie.actors[0].actor_name.as_deref(), Some("Amy Adams"));

        let json = serde_json::to_value(&movie).expect("serialize");
        assert_eq!(json["_id"], serde_json::json!(id.to_hex()));
        assert_eq!(json["releaseYear"], serde_json::json!(2016));
        assert_eq!(
            json["actors"][0]["characterName"],
            serde_json::json!("Louise Banks")
        );
    }

    #[test]
    fn rated_movie_serializes_null_average_when_unreviewed() {
        let rated: RatedMovie = bson::from_document(doc! {
            "_id": ObjectId::new(),
            "title": "Solaris",
            "avgRating": Bson::Null,
        })
        .expect("deserialize");

        assert!(rated.avg_rating.is_none());
        let json = serde_json::to_value(&rated).expect("serialize");
        assert!(json["avgRating"].is_null());
        assert!(json.get("reviews").is_none());
    }

    #[test]
    fn rated_movie_carries_embedded_reviews() {
        let movie_id = ObjectId::new();
        let rated: RatedMovie = bson::from_document(doc! {
            "_id": movie_id,
            "title": "Heat",
            "avgRating": 4.5,
            "reviews": [{
                "_id": ObjectId::new(),
                "movieId": movie_id,
                "username": "alice",
                "review": "great",
                "rating": 4.5,
            }],
        })
        .expect("deserialize");

        assert_eq!(rated.avg_rating, Some(4.5));
        let reviews = rated.reviews.as_deref().expect("reviews present");
        assert_eq!(reviews[0].username, "alice");
        assert_eq!(reviews[0].rating, 4.5);
    }
}
