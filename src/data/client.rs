//! HTTP client for the forecast service.
//!
//! Two endpoints:
//! - `GET {base}/predict/{keyword}`  -> interest payload
//! - `GET {base}/price-track?url=..` -> price payload
//!
//! A single request per call: no retry, no artificial delay. Coordination of
//! repeated submissions lives in `app::request`.

use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::domain::{Domain, InterestPayload, Payload, PricePayload};
use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_BASE_URL: &str = "PLOT_PULSE_API_URL";
const ENV_TIMEOUT: &str = "PLOT_PULSE_TIMEOUT_SECS";

/// Advisory shown when the interest lookup fails without an upstream detail.
pub const INTEREST_ADVISORY: &str = "Topic not found. Try a specific Wikipedia title (e.g. \"Bitcoin\")";
/// Advisory shown when the price lookup fails without an upstream detail.
pub const PRICE_ADVISORY: &str = "Unable to fetch live pricing. Please try again.";

#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: Client,
    base_url: Url,
}

impl ForecastClient {
    /// Build a client from `PLOT_PULSE_API_URL` / `PLOT_PULSE_TIMEOUT_SECS` (.env supported).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let base = std::env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout = match std::env::var(ENV_TIMEOUT) {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| AppError::usage(format!("Invalid {ENV_TIMEOUT} '{raw}': {e}")))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        Self::new(&base, Duration::from_secs(timeout))
    }

    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::usage(format!("Invalid forecast service URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::usage(format!(
                "Forecast service URL cannot be used as a base: {base_url}"
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::runtime(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch pageview history + projection for a topic.
    pub fn fetch_interest(&self, keyword: &str) -> Result<InterestPayload, AppError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(AppError::usage("Enter a topic to search."));
        }
        let url = self.interest_url(keyword);
        tracing::info!(%url, "requesting interest forecast");

        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| advisory_error("interest", INTEREST_ADVISORY, &e.to_string()))?;
        let mut payload: InterestPayload = parse_response(resp, INTEREST_ADVISORY)?;
        if payload.keyword.is_empty() {
            payload.keyword = keyword.to_string();
        }
        tracing::info!(rows = payload.graph_data.len(), "interest forecast received");
        Ok(payload)
    }

    /// Fetch price history + projection for a product page.
    pub fn fetch_price(&self, product_url: &str) -> Result<PricePayload, AppError> {
        let product_url = product_url.trim();
        if product_url.is_empty() {
            return Err(AppError::usage("Paste a product link to track."));
        }
        let url = self.price_url(product_url);
        tracing::info!(%url, "requesting price forecast");

        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| advisory_error("price", PRICE_ADVISORY, &e.to_string()))?;
        let payload: PricePayload = parse_response(resp, PRICE_ADVISORY)?;
        tracing::info!(
            history = payload.history.len(),
            forecast = payload.forecast.len(),
            "price forecast received"
        );
        Ok(payload)
    }

    /// Fetch whichever payload matches `query`.
    pub fn fetch(&self, query: &Query) -> Result<Payload, AppError> {
        match query {
            Query::Interest(keyword) => self.fetch_interest(keyword).map(Payload::Interest),
            Query::Price(url) => self.fetch_price(url).map(Payload::Price),
        }
    }

    fn interest_url(&self, keyword: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("predict").push(keyword);
        }
        url
    }

    fn price_url(&self, product_url: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("price-track");
        }
        url.query_pairs_mut().append_pair("url", product_url);
        url
    }
}

/// A request for one of the two endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Interest(String),
    Price(String),
}

impl Query {
    pub fn new(domain: Domain, text: impl Into<String>) -> Self {
        match domain {
            Domain::Interest => Query::Interest(text.into()),
            Domain::Price => Query::Price(text.into()),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Query::Interest(s) | Query::Price(s) => s,
        }
    }

    pub fn domain(&self) -> Domain {
        match self {
            Query::Interest(_) => Domain::Interest,
            Query::Price(_) => Domain::Price,
        }
    }
}

/// FastAPI-style error body: `{"detail": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

fn parse_response<T: DeserializeOwned>(resp: Response, advisory: &str) -> Result<T, AppError> {
    let status = resp.status();
    if !status.is_success() {
        let detail = resp
            .json::<ErrorBody>()
            .ok()
            .and_then(|b| b.detail)
            .and_then(|d| match d {
                serde_json::Value::String(s) => Some(s),
                serde_json::Value::Null => None,
                other => Some(other.to_string()),
            });
        tracing::warn!(%status, ?detail, "forecast service returned an error");
        return Err(AppError::runtime(detail.unwrap_or_else(|| advisory.to_string())));
    }

    resp.json::<T>()
        .map_err(|e| advisory_error("parse", advisory, &e.to_string()))
}

fn advisory_error(stage: &str, advisory: &str, cause: &str) -> AppError {
    tracing::warn!(stage, cause, "forecast request failed");
    AppError::runtime(advisory)
}
