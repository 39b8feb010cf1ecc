//! The remote quote provider seam.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::{Frame, RemoteSourceName};
use crate::config::TimeRange;
use crate::errors::MarketflowError;

/// A provider of daily quote history.
///
/// Loaders receive the source as an injected trait object, so tests can
/// substitute canned data for the network.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// The provider's display name.
    fn name(&self) -> &'static str;

    /// Fetches the daily history of one symbol over a closed time range.
    async fn daily_history(
        &self,
        symbol: &str,
        range: &TimeRange,
    ) -> Result<Frame, MarketflowError>;
}

/// The timestamp column of remote CSV payloads.
const REMOTE_DATE_COLUMN: &str = "Date";

/// A [`QuoteSource`] over an HTTP endpoint serving CSV history downloads.
#[derive(Debug, Clone)]
pub struct HttpQuoteSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpQuoteSource {
    /// Creates a source for the given download endpoint.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
        }
    }

    /// The source for the one supported provider.
    #[must_use]
    pub fn yahoo_finance() -> Self {
        Self::new("https://query1.finance.yahoo.com/v7/finance/download")
    }
}

#[async_trait]
impl QuoteSource for HttpQuoteSource {
    fn name(&self) -> &'static str {
        RemoteSourceName::YahooFinance.as_str()
    }

    async fn daily_history(
        &self,
        symbol: &str,
        range: &TimeRange,
    ) -> Result<Frame, MarketflowError> {
        let url = format!("{}/{symbol}", self.base_url);
        debug!(symbol, url = %url, "requesting daily history");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", range.begin_time.timestamp().to_string()),
                ("period2", range.end_time.timestamp().to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        Frame::from_csv_reader(body.as_bytes(), REMOTE_DATE_COLUMN)
    }
}
