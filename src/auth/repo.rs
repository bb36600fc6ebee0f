use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::{Collection, Database};
use serde::Deserialize;
use thiserror::Error;

use crate::db;

/// User record; this type is never serialized to clients, so the hash never
/// leaves the process.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: Option<String>,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub watchlist: Vec<ObjectId>,
}

#[derive(Debug, Error)]
pub enum CreateUserError {
    #[error("a user with that username already exists")]
    DuplicateUsername,
    #[error(transparent)]
    Database(#[from] mongodb::error::Error),
}

fn users(db: &Database) -> Collection<User> {
    db.collection(db::USERS)
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        *err.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref write_error)) if write_error.code == 11000
    )
}

impl User {
    /// Insert a new user; `password_hash` must already be hashed. A unique
    /// index on `username` turns duplicates into `DuplicateUsername`.
    pub async fn create(
        db: &Database,
        name: Option<&str>,
        username: &str,
        password_hash: &str,
    ) -> Result<(), CreateUserError> {
        let mut user = doc! {
            "username": username,
            "password": password_hash,
            "watchlist": [],
        };
        if let Some(name) = name {
            user.insert("name", name);
        }

        db.collection::<Document>(db::USERS)
            .insert_one(user, None)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    CreateUserError::DuplicateUsername
                } else {
                    CreateUserError::Database(e)
                }
            })?;
        Ok(())
    }

    pub async fn find_by_username(db: &Database, username: &str) -> anyhow::Result<Option<User>> {
        let user = users(db)
            .find_one(doc! { "username": username }, None)
            .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &Database, id: ObjectId) -> anyhow::Result<Option<User>> {
        let user = users(db).find_one(doc! { "_id": id }, None).await?;
        Ok(user)
    }

    /// `$addToSet` keeps the watchlist a set; re-adding a member is a no-op.
    /// Returns the updated record.
    pub async fn add_to_watchlist(
        db: &Database,
        user_id: ObjectId,
        movie_id: ObjectId,
    ) -> anyhow::Result<Option<User>> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let user = users(db)
            .find_one_and_update(
                doc! { "_id": user_id },
                doc! { "$addToSet": { "watchlist": movie_id } },
                options,
            )
            .await?;
        Ok(user)
    }

    /// Unconditional `$pull`; removing a non-member is a no-op. Returns the
    /// updated record.
    pub async fn remove_from_watchlist(
        db: &Database,
        user_id: ObjectId,
        movie_id: ObjectId,
    ) -> anyhow::Result<Option<User>> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let user = users(db)
            .find_one_and_update(
                doc! { "_id": user_id },
                doc! { "$pull": { "watchlist": movie_id } },
                options,
            )
            .await?;
        Ok(user)
    }
}
