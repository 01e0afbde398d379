use std::marker::PhantomData;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use shared::{error::ApiError, protocol::Page};
use tracing::debug;
use url::Url;

use crate::{abort::AbortSignal, error::FetchError, fetcher::ListFetcher};

#[derive(Serialize)]
struct PageQuery {
    page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    per_page: Option<u32>,
}

/// Lists a REST collection: `GET {base}/{resource}?{filters}&page=N`.
pub struct HttpListFetcher<F, T> {
    http: Client,
    endpoint: Url,
    per_page: Option<u32>,
    _marker: PhantomData<fn(F) -> T>,
}

impl<F, T> HttpListFetcher<F, T> {
    pub fn new(base_url: &str, resource: &str) -> Result<Self> {
        Self::with_client(Client::new(), base_url, resource)
    }

    pub fn with_client(http: Client, base_url: &str, resource: &str) -> Result<Self> {
        let endpoint = resource_url(base_url, resource)?;
        Ok(Self {
            http,
            endpoint,
            per_page: None,
            _marker: PhantomData,
        })
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn resource_url(base_url: &str, resource: &str) -> Result<Url> {
    let base = format!("{}/", base_url.trim().trim_end_matches('/'));
    let base = Url::parse(&base).with_context(|| format!("invalid server url: {base_url}"))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(anyhow!("server_url must start with http:// or https://"));
    }
    let resource = resource.trim().trim_matches('/');
    if resource.is_empty() {
        return Err(anyhow!("resource path must not be empty"));
    }
    base.join(resource)
        .with_context(|| format!("invalid resource path: {resource}"))
}

impl<F, T> HttpListFetcher<F, T>
where
    F: Serialize + Send + Sync,
    T: DeserializeOwned + Send,
{
    async fn request_page(&self, filters: &F, page: u32) -> Result<Page<T>, FetchError> {
        let response = self
            .http
            .get(self.endpoint.clone())
            .query(filters)
            .query(&PageQuery {
                page,
                per_page: self.per_page,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(err) => {
                    debug!(
                        "http: failed to read error body url={} status={status}: {err}",
                        self.endpoint
                    );
                    String::new()
                }
            };
            let message = serde_json::from_str::<ApiError>(&body)
                .ok()
                .and_then(|body| body.display_message());
            return Err(FetchError::api(status.as_u16(), message));
        }

        let body = response.bytes().await?;
        serde_json::from_slice::<Page<T>>(&body).map_err(|err| FetchError::Decode(err.to_string()))
    }
}

#[async_trait]
impl<F, T> ListFetcher<F, T> for HttpListFetcher<F, T>
where
    F: Serialize + Send + Sync,
    T: DeserializeOwned + Send,
{
    async fn fetch(
        &self,
        filters: &F,
        page: u32,
        signal: AbortSignal,
    ) -> Result<Page<T>, FetchError> {
        if signal.is_aborted() {
            return Err(FetchError::Aborted);
        }

        tokio::select! {
            _ = signal.aborted() => {
                debug!("http: request aborted url={} page={page}", self.endpoint);
                Err(FetchError::Aborted)
            }
            result = self.request_page(filters, page) => result,
        }
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
