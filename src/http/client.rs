use std::time::Duration;

use reqwest::{Response, StatusCode};
use thiserror::Error;
use url::Url;

use crate::{
    domain::{
        models::{Credential, DeleteShortenedUrl, NewShortenedUrl, ShortenedUrl},
        repository::ShortenedURLRepository,
    },
    http::config::Config,
};

const LIST_PATH: &str = "api/urls";
const URL_PATH: &str = "api/url";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}{}", detail(.body))]
    Status { status: StatusCode, body: String },
}

fn detail(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!(": {body}")
    }
}

/// JSON-over-HTTP client for the link shortener admin API.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(config.api_url.trim())?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Client { base_url, http })
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    async fn ensure_success(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status { status, body })
    }
}

impl ShortenedURLRepository for Client {
    type Error = ApiError;

    async fn list(&self, credential: &Credential) -> Result<Vec<ShortenedUrl>, ApiError> {
        let response = self
            .http
            .get(self.endpoint(LIST_PATH)?)
            .bearer_auth(credential.expose())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;
        let urls = Self::ensure_success(response)
            .await?
            .json::<Vec<ShortenedUrl>>()
            .await?;

        tracing::debug!(count = urls.len(), "Listed short URLs");
        Ok(urls)
    }

    async fn create(&self, credential: &Credential, url: &NewShortenedUrl) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.endpoint(URL_PATH)?)
            .bearer_auth(credential.expose())
            .json(url)
            .send()
            .await?;
        Self::ensure_success(response).await?;

        tracing::info!(
            event = "short_url_created",
            short_url = url.short_url.as_str(),
            target_url = url.target_url.as_str()
        );
        Ok(())
    }

    async fn delete(&self, credential: &Credential, short_url: &str) -> Result<(), ApiError> {
        let body = DeleteShortenedUrl {
            short_url: short_url.to_string(),
        };
        let response = self
            .http
            .delete(self.endpoint(URL_PATH)?)
            .bearer_auth(credential.expose())
            .json(&body)
            .send()
            .await?;
        Self::ensure_success(response).await?;

        tracing::info!(event = "short_url_deleted", short_url = short_url);
        Ok(())
    }
}
