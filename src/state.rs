use std::sync::Arc;

use mongodb::Database;
use tracing::warn;

use crate::analytics::{AnalyticsClient, GoogleAnalytics, NoopAnalytics};
use crate::config::AppConfig;
use crate::db;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
    pub analytics: Arc<dyn AnalyticsClient>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = db::connect(&config).await?;

        let analytics: Arc<dyn AnalyticsClient> = match &config.analytics_key {
            Some(key) => Arc::new(GoogleAnalytics::new(key.clone())?),
            None => {
                warn!("GA_KEY not set; analytics events will be dropped");
                Arc::new(NoopAnalytics)
            }
        };

        Ok(Self {
            db,
            config,
            analytics,
        })
    }

    pub fn from_parts(
        db: Database,
        config: Arc<AppConfig>,
        analytics: Arc<dyn AnalyticsClient>,
    ) -> Self {
        Self {
            db,
            config,
            analytics,
        }
    }

    /// State backed by a lazily connecting client; unit tests never touch a
    /// real database.
    pub fn fake() -> Self {
        use mongodb::options::{ClientOptions, ServerAddress};

        let options = ClientOptions::builder()
            .hosts(vec![ServerAddress::Tcp {
                host: "localhost".into(),
                port: Some(27017),
            }])
            .build();
        let client = mongodb::Client::with_options(options).expect("lazy client ok");
        let db = client.database("cinelog-test");

        let config = Arc::new(AppConfig {
            database_url: "mongodb://localhost:27017".into(),
            database_name: "cinelog-test".into(),
            jwt_secret: "test-secret".into(),
            analytics_key: None,
        });

        Self::from_parts(db, config, Arc::new(NoopAnalytics))
    }
}
