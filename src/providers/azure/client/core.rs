use log::warn;
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

use crate::auth::Token;
use crate::error::{AdoLensError, Result};

const MAX_RETRIES: u32 = 5;
const RETRY_DELAY_SECONDS: u64 = 5;
const MAX_CONCURRENT_REQUESTS: usize = 50;
const API_VERSION: &str = "7.1";

pub struct AdoClient {
    pub client: Client,
    api_url: Url,
    token: Option<Token>,
    semaphore: Arc<Semaphore>,
}

impl AdoClient {
    pub fn new(organization_url: &str, project: &str, token: Option<Token>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("AdoLens/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AdoLensError::Config(format!("Failed to create HTTP client: {e}")))?;

        let mut base = Url::parse(organization_url)
            .map_err(|e| AdoLensError::Config(format!("Invalid organization URL: {e}")))?;

        // Url::join treats the last path segment as a file unless it ends in '/'
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }

        let api_url = base
            .join(&format!("{project}/_apis/build/"))
            .map_err(|e| AdoLensError::Config(format!("Invalid API base URL: {e}")))?;

        Ok(Self {
            client,
            api_url,
            token,
            semaphore: Arc::new(Semaphore::new(MAX_CONCURRENT_REQUESTS)),
        })
    }

    /// Builds a full endpoint URL under `{organization}/{project}/_apis/build/`
    /// with the pinned `api-version` attached.
    pub(super) fn endpoint(&self, path: &str) -> Result<Url> {
        let mut url = self
            .api_url
            .join(path)
            .map_err(|e| AdoLensError::Config(format!("Invalid endpoint path {path}: {e}")))?;
        url.query_pairs_mut().append_pair("api-version", API_VERSION);
        Ok(url)
    }

    pub fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = &self.token {
            // The platform expects a PAT as a basic-auth password, username empty
            request.basic_auth("", Some(token.as_str()))
        } else {
            request
        }
    }

    /// Execute a GET request with automatic retry on network errors and rate limits.
    /// Deserializes the JSON response body on success.
    pub(super) async fn get_json<T>(&self, url: Url) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        // Acquire semaphore permit to limit concurrent requests (one permit per logical request)
        let _permit = self.semaphore.acquire().await.unwrap();

        let mut retry_count = 0;
        loop {
            let request = self.auth_request(
                self.client
                    .get(url.clone())
                    .header(ACCEPT, "application/json"),
            );

            let response = match request.send().await {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() || e.is_request() => {
                    if retry_count >= MAX_RETRIES {
                        return Err(e.into());
                    }
                    warn!(
                        "Network error ({}), retrying in {}s ({}/{})...",
                        e,
                        RETRY_DELAY_SECONDS,
                        retry_count + 1,
                        MAX_RETRIES
                    );
                    tokio::time::sleep(Duration::from_secs(RETRY_DELAY_SECONDS)).await;
                    retry_count += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            // Check for rate limiting or other HTTP errors before parsing JSON
            let status = response.status();

            if status == 429 || status.is_server_error() {
                if retry_count >= MAX_RETRIES {
                    return Err(AdoLensError::ApiAfterRetries {
                        status: status.as_u16(),
                        retries: MAX_RETRIES,
                    });
                }

                warn!(
                    "Build API error (status {status}). Waiting {RETRY_DELAY_SECONDS} seconds before retry {}/{}...",
                    retry_count + 1,
                    MAX_RETRIES
                );

                tokio::time::sleep(Duration::from_secs(RETRY_DELAY_SECONDS)).await;
                retry_count += 1;
                continue;
            }

            if !status.is_success() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unable to read error response".to_string());
                return Err(AdoLensError::Api {
                    status: status.as_u16(),
                    message: error_text,
                });
            }

            return Ok(response.json().await?);
        }
    }
}
