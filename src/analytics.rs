use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

const COLLECT_URL: &str = "https://www.google-analytics.com/collect";

/// A review event as the Measurement Protocol wants it: an event with one
/// custom dimension and one custom metric.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub category: String,
    pub action: String,
    pub label: String,
    pub value: f64,
    pub dimension: String,
    pub metric: u32,
}

#[async_trait]
pub trait AnalyticsClient: Send + Sync {
    async fn track_event(&self, event: Event) -> anyhow::Result<()>;
}

pub struct GoogleAnalytics {
    http: reqwest::Client,
    tracking_id: String,
}

impl GoogleAnalytics {
    pub fn new(tracking_id: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            tracking_id: tracking_id.into(),
        })
    }
}

#[async_trait]
impl AnalyticsClient for GoogleAnalytics {
    async fn track_event(&self, event: Event) -> anyhow::Result<()> {
        let client_id = Uuid::new_v4().to_string();
        let value = event.value.to_string();
        let metric = event.metric.to_string();
        let params = [
            ("v", "1"),
            ("tid", self.tracking_id.as_str()),
            ("cid", client_id.as_str()),
            ("t", "event"),
            ("ec", event.category.as_str()),
            ("ea", event.action.as_str()),
            ("el", event.label.as_str()),
            ("ev", value.as_str()),
            ("cd1", event.dimension.as_str()),
            ("cm1", metric.as_str()),
        ];

        let response = self.http.post(COLLECT_URL).query(&params).send().await?;
        response.error_for_status()?;
        debug!(category = %event.category, action = %event.action, "analytics event sent");
        Ok(())
    }
}

/// Stands in when no tracking id is configured, and in tests.
pub struct NoopAnalytics;

#[async_trait]
impl AnalyticsClient for NoopAnalytics {
    async fn track_event(&self, event: Event) -> anyhow::Result<()> {
        debug!(category = %event.category, action = %event.action, "analytics disabled, event dropped");
        Ok(())
    }
}
