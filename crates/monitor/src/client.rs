//! HTTP client for the public TestFlight join pages.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;

use betawatch_common::error::FetchError;
use betawatch_common::ports::PageSource;
use betawatch_engine::cycle::join_url;

/// Desktop browser profile the join page renders fully for.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0.0.0 Safari/537.36";

const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
const CACHE_CONTROL: &str = "max-age=0";

/// Region cookie the join page expects.
const REGION_COOKIE: &str = "geo=ID";

/// Fetches join pages with a bounded per-request timeout. No retries; the
/// scheduler's next cycle is the retry mechanism.
pub struct TestFlightClient {
    base_url: String,
    client: reqwest::Client,
}

impl TestFlightClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    pub fn join_url(&self, code: &str) -> String {
        join_url(&self.base_url, code)
    }
}

#[async_trait]
impl PageSource for TestFlightClient {
    async fn fetch(&self, code: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(self.join_url(code))
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
            .header(header::CACHE_CONTROL, CACHE_CONTROL)
            .header(header::COOKIE, REGION_COOKIE)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        response.text().await.map_err(classify)
    }
}

fn classify(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(e.to_string())
    }
}
