use anyhow::Result;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, info, warn};
use url::Url;

use super::signer::{PageParams, SignedRequest};
use super::SponsorSource;
use crate::error::{FetchError, PageRejection};
use crate::models::{ApiConfig, Credentials};
use crate::utils::unix_now;

const SUCCESS_CODE: i64 = 200;

/// The useful part of one accepted page: `{"ec":200,"data":{"list":[...],"total_page":N}}`
#[derive(Debug, Clone, PartialEq)]
pub struct PageEnvelope {
    pub items: Vec<Value>,
    /// `None` when absent, zero or not a number
    pub total_page: Option<u32>,
}

impl PageEnvelope {
    /// Validate a decoded payload. A missing `data` or `data.list` is an empty
    /// page; a `data.list` that is present but not an array is a rejection.
    pub fn from_value(payload: Value) -> Result<Self, PageRejection> {
        let Value::Object(mut payload) = payload else {
            return Err(PageRejection::NotAnObject);
        };

        let ec = payload.get("ec").and_then(Value::as_i64);
        if ec != Some(SUCCESS_CODE) {
            return Err(PageRejection::ErrorCode {
                ec,
                em: payload.get("em").and_then(Value::as_str).map(str::to_string),
            });
        }

        let Some(Value::Object(mut data)) = payload.remove("data") else {
            return Ok(Self {
                items: Vec::new(),
                total_page: None,
            });
        };

        let items = match data.remove("list") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items,
            Some(_) => return Err(PageRejection::ListNotArray),
        };

        let total_page = data
            .get("total_page")
            .and_then(Value::as_u64)
            .filter(|n| *n > 0)
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX));

        Ok(Self { items, total_page })
    }
}

/// Why pagination ended
#[derive(Debug, Clone, PartialEq)]
pub enum StopReason {
    /// The page number reached the server's `total_page`
    LastPage,
    /// A page came back with no items
    EmptyPage,
    /// The configured page cap was hit
    PageCap,
    /// A delivered page was refused; its items were discarded
    Rejected { page: u32, reason: PageRejection },
    /// A page still failed after every retry
    RequestFailed { page: u32, message: String },
}

impl StopReason {
    /// Whether the listing was read to its natural end
    pub fn is_complete(&self) -> bool {
        matches!(self, StopReason::LastPage | StopReason::EmptyPage)
    }
}

/// Everything collected by one paginated fetch
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub items: Vec<Value>,
    pub pages_fetched: u32,
    pub stop: StopReason,
}

/// Failure of a single page, after retries
#[derive(Debug)]
pub enum PageFailure {
    Request(FetchError),
    Rejected(PageRejection),
}

/// Afdian open API client
pub struct AfdianClient {
    client: Client,
    credentials: Credentials,
    config: ApiConfig,
}

impl AfdianClient {
    /// Create a new Afdian client
    pub fn new(credentials: Credentials, config: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent("sponsor-sync/1.0")
            .build()?;

        Ok(Self {
            client,
            credentials,
            config,
        })
    }

    /// One signed POST. The timestamp is taken now, so every attempt carries
    /// a fresh signature.
    async fn post_once(&self, endpoint: &Url, params: &PageParams) -> Result<Value, FetchError> {
        let request = SignedRequest::new(params, unix_now(), &self.credentials)?;

        debug!("Making request to: {} (page {})", endpoint, params.page);

        let response = self
            .client
            .post(endpoint.as_str())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        Ok(response.json::<Value>().await?)
    }

    /// POST with exponential backoff. Returns the last error once
    /// `max_attempts` attempts have all failed.
    pub async fn post_with_retry(&self, endpoint: &Url, params: &PageParams) -> Result<Value, FetchError> {
        let max_attempts = self.config.retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.post_once(endpoint, params).await {
                Ok(payload) => return Ok(payload),
                Err(e) if attempt >= max_attempts => return Err(e),
                Err(e) => {
                    let wait = self.config.retry.delay_for(attempt);
                    warn!(
                        "Request for page {} failed (attempt {}/{}): {}, retrying in {:.2}s",
                        params.page,
                        attempt,
                        max_attempts,
                        e,
                        wait.as_secs_f64()
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Fetch and validate a single page
    pub async fn fetch_page(&self, endpoint: &Url, page: u32) -> Result<PageEnvelope, PageFailure> {
        let params = PageParams {
            page,
            per_page: self.config.page_size,
        };

        let payload = self
            .post_with_retry(endpoint, &params)
            .await
            .map_err(PageFailure::Request)?;

        PageEnvelope::from_value(payload).map_err(PageFailure::Rejected)
    }

    /// Walk every page of `endpoint`, sequentially, until the listing ends or
    /// something goes wrong. Never fails: whatever was collected before a bad
    /// page is returned along with the reason pagination stopped.
    pub async fn fetch_all(&self, endpoint: &Url) -> FetchOutcome {
        let mut items = Vec::new();
        let mut pages_fetched = 0;
        let mut page = 1;

        let stop = loop {
            if page > self.config.max_pages {
                break StopReason::PageCap;
            }

            let envelope = match self.fetch_page(endpoint, page).await {
                Ok(envelope) => envelope,
                Err(PageFailure::Request(e)) => {
                    error!("❌ Page {} request failed: {}", page, e);
                    break StopReason::RequestFailed {
                        page,
                        message: e.to_string(),
                    };
                }
                Err(PageFailure::Rejected(reason)) => {
                    error!("❌ Page {} rejected: {}", page, reason);
                    break StopReason::Rejected { page, reason };
                }
            };

            let count = envelope.items.len();
            info!("📄 Page {} fetched {} records", page, count);
            items.extend(envelope.items);
            pages_fetched += 1;

            if envelope.total_page.is_some_and(|total| page >= total) {
                break StopReason::LastPage;
            }
            if count == 0 {
                break StopReason::EmptyPage;
            }

            page += 1;
        };

        if !stop.is_complete() {
            warn!(
                "⚠️ Pagination of {} stopped early ({:?}), keeping {} records from {} pages",
                endpoint, stop, items.len(), pages_fetched
            );
        }

        FetchOutcome {
            items,
            pages_fetched,
            stop,
        }
    }
}

#[async_trait::async_trait]
impl SponsorSource for AfdianClient {
    async fn fetch_profiles(&self) -> Result<Vec<Value>> {
        info!("📥 Fetching sponsor list");
        let outcome = self.fetch_all(&self.config.sponsor_endpoint).await;
        Ok(outcome.items)
    }

    async fn fetch_transactions(&self) -> Result<Vec<Value>> {
        info!("📥 Fetching order list");
        let outcome = self.fetch_all(&self.config.order_endpoint).await;
        Ok(outcome.items)
    }
}
