use anyhow::Context;
use mongodb::bson::{doc, Document};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Database, IndexModel};
use tracing::info;

use crate::config::AppConfig;

pub const USERS: &str = "users";
pub const MOVIES: &str = "movies";
pub const REVIEWS: &str = "reviews";

pub async fn connect(config: &AppConfig) -> anyhow::Result<Database> {
    let options = ClientOptions::parse(&config.database_url)
        .await
        .context("parse DATABASE_URL")?;
    let client = Client::with_options(options).context("build mongodb client")?;
    let db = client.database(&config.database_name);
    info!(database = %config.database_name, "connected to mongodb");
    Ok(db)
}

/// Usernames are the login key; the store enforces their uniqueness and
/// signup relies on the duplicate-key error it raises.
pub async fn ensure_indexes(db: &Database) -> anyhow::Result<()> {
    let index = IndexModel::builder()
        .keys(doc! { "username": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();
    db.collection::<Document>(USERS)
        .create_index(index, None)
        .await
        .context("create unique username index")?;
    Ok(())
}
