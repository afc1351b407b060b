use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, cookie::Jar};
use tracing::{debug, warn};

use crate::types::{FetchError, ReserveAmericaConfig};

/// A stateful HTTP context whose cookies carry the site filter between requests
#[async_trait]
pub trait SessionTransport: Send + Sync {
    /// GET `url` with query `params` and return the response body
    async fn get_text(&self, url: &str, params: &[(&str, String)]) -> Result<String, FetchError>;
}

/// Hands out a fresh session for every park
pub trait SessionProvider: Send + Sync {
    /// Open a session with an empty cookie jar
    fn open_session(&self) -> Result<Box<dyn SessionTransport>, FetchError>;
}

/// Session backed by a `reqwest` client owning its own cookie jar
pub struct CookieSession {
    client: Client,
}

impl CookieSession {
    /// Create a new session with an empty cookie jar
    pub fn new(config: &ReserveAmericaConfig) -> Result<Self, FetchError> {
        let jar = Arc::new(Jar::default());

        let client = Client::builder()
            .cookie_provider(jar)
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl SessionTransport for CookieSession {
    async fn get_text(&self, url: &str, params: &[(&str, String)]) -> Result<String, FetchError> {
        debug!("GET {} {:?}", url, params);

        let response = self
            .client
            .get(url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.5")
            .query(params)
            .send()
            .await
            .map_err(|e| FetchError::Network(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("Request to {} failed with status {}", url, status);

            return match status.as_u16() {
                429 => Err(FetchError::RateLimited),
                code => Err(FetchError::Http {
                    status: code,
                    url: url.to_string(),
                }),
            };
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Network(format!("Failed to read response: {}", e)))
    }
}

/// Opens a `CookieSession` per park from shared settings
pub struct CookieSessionProvider {
    config: ReserveAmericaConfig,
}

impl CookieSessionProvider {
    /// Create a provider for the given site
    pub fn new(config: ReserveAmericaConfig) -> Self {
        Self { config }
    }
}

impl SessionProvider for CookieSessionProvider {
    fn open_session(&self) -> Result<Box<dyn SessionTransport>, FetchError> {
        Ok(Box::new(CookieSession::new(&self.config)?))
    }
}
