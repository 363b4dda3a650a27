use std::time::Duration;

use futures_util::{stream, StreamExt};
use reqwest::header::USER_AGENT;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::{Config, FETCH_CONCURRENCY, MARKET_WATCH_FIELD, MARKET_WATCH_PATH};
use crate::error::Result;
use crate::types::{Market, RawOptionRecord};
use crate::user_agent::UserAgentSource;

/// Outcome of a concurrent fetch across all markets.
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Markets that answered, with the number of records each contributed.
    pub fetched: Vec<(Market, usize)>,
    /// Markets whose fetch failed, with the error message.
    pub failed: Vec<(Market, String)>,
}

impl FetchReport {
    pub fn total_records(&self) -> usize {
        self.fetched.iter().map(|(_, n)| n).sum()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

pub struct OptionFetcher {
    client: reqwest::Client,
    api_url: String,
    user_agent: UserAgentSource,
}

impl OptionFetcher {
    pub fn new(cfg: &Config, user_agent: UserAgentSource) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: cfg.api_url.trim_end_matches('/').to_string(),
            user_agent,
        })
    }

    pub fn market_url(&self, market: Market) -> String {
        format!("{}{}/{}", self.api_url, MARKET_WATCH_PATH, market.number())
    }

    /// Fetch option records for a market given by name (`bourse` or
    /// `fara_bourse`). Unknown names fail before any request is sent.
    pub async fn fetch(&self, market: &str) -> Result<Vec<RawOptionRecord>> {
        info!("Fetching option data for market: {market}");
        let market = market.parse::<Market>().inspect_err(|e| error!("{e}"))?;
        self.fetch_market(market).await
    }

    /// Single GET against the market watch endpoint. A non-2xx status, timeout
    /// or undecodable body is an error; a missing data field is an empty result.
    pub async fn fetch_market(&self, market: Market) -> Result<Vec<RawOptionRecord>> {
        let url = self.market_url(market);
        debug!(market = %market, url = %url, "GET market watch");

        match self.request(&url).await {
            Ok(records) => {
                info!(
                    market = %market,
                    records = records.len(),
                    "Fetched {} records for market: {market}",
                    records.len(),
                );
                Ok(records)
            }
            Err(e) => {
                error!(market = %market, "An error occurred while fetching option data for market {market}: {e}");
                Err(e)
            }
        }
    }

    async fn request(&self, url: &str) -> Result<Vec<RawOptionRecord>> {
        let body: Value = self
            .client
            .get(url)
            .header(USER_AGENT, (self.user_agent)())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(extract_records(body))
    }

    /// Fetch every known market concurrently. Failed markets are logged and
    /// left out of the result; this never fails.
    pub async fn fetch_all(&self) -> Vec<RawOptionRecord> {
        self.fetch_all_with_report().await.0
    }

    pub async fn fetch_all_with_report(&self) -> (Vec<RawOptionRecord>, FetchReport) {
        info!("Starting to fetch entire market data concurrently.");

        let outcomes: Vec<(Market, Result<Vec<RawOptionRecord>>)> = stream::iter(Market::ALL)
            .map(|market| async move { (market, self.fetch_market(market).await) })
            .buffer_unordered(FETCH_CONCURRENCY)
            .collect()
            .await;

        let mut records = Vec::new();
        let mut report = FetchReport::default();
        for (market, outcome) in outcomes {
            match outcome {
                Ok(data) => {
                    report.fetched.push((market, data.len()));
                    records.extend(data);
                }
                Err(e) => {
                    error!(market = %market, "Failed to fetch data for market {market}: {e}");
                    report.failed.push((market, e.to_string()));
                }
            }
        }

        info!("Total records fetched: {}", records.len());
        (records, report)
    }
}

/// Pull the record array out of the response envelope. Anything other than an
/// array of objects under the data field yields no records.
fn extract_records(body: Value) -> Vec<RawOptionRecord> {
    let items = match body {
        Value::Object(mut envelope) => match envelope.remove(MARKET_WATCH_FIELD) {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => {
                warn!("Response has no {MARKET_WATCH_FIELD} field");
                return Vec::new();
            }
            Some(other) => {
                warn!("{MARKET_WATCH_FIELD} is not an array: {other}");
                return Vec::new();
            }
        },
        _ => {
            warn!("Response body is not a JSON object");
            return Vec::new();
        }
    };

    let total = items.len();
    let records: Vec<RawOptionRecord> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(record) => Some(record),
            _ => None,
        })
        .collect();
    if records.len() < total {
        warn!("Skipped {} non-object entries in {MARKET_WATCH_FIELD}", total - records.len());
    }
    records
}
