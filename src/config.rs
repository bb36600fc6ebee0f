use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub database_name: String,
    pub jwt_secret: String,
    /// Google Analytics tracking id; analytics is disabled when unset.
    pub analytics_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let database_name =
            std::env::var("DATABASE_NAME").unwrap_or_else(|_| "cinelog".into());
        let jwt_secret = std::env::var("JWT_SECRET")?;
        let analytics_key = std::env::var("GA_KEY").ok();
        Ok(Self {
            database_url,
            database_name,
            jwt_secret,
            analytics_key,
        })
    }
}
