//! Prismic REST API v2 client

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::{
    resolve_link, ApiInfo, ContentRef, ContentSource, Document, Predicate, Query, SearchResponse,
};
use crate::config::CmsConfig;
use crate::error::{BlogError, Result};

/// HTTP client for a Prismic repository
#[derive(Debug, Clone)]
pub struct PrismicClient {
    client: Client,
    endpoint: String,
    access_token: Option<String>,
}

impl PrismicClient {
    /// Create a client for the configured endpoint
    pub fn new(config: &CmsConfig) -> Result<Self> {
        if config.endpoint.is_empty() {
            return Err(BlogError::config(
                "cms.endpoint is not set (or set PRISMIC_API_ENDPOINT)",
            ));
        }

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone().filter(|t| !t.is_empty()),
        })
    }

    fn search_url(&self) -> String {
        format!("{}/documents/search", self.endpoint)
    }

    fn token_param(&self) -> Option<(&'static str, String)> {
        self.access_token
            .as_ref()
            .map(|t| ("access_token", t.clone()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&'static str, String)],
    ) -> Result<T> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            // Keep the access token out of error messages
            let mut failed = response.url().clone();
            failed.set_query(None);
            return Err(BlogError::Status {
                status: status.as_u16(),
                url: failed.to_string(),
            });
        }

        Ok(response.json::<T>().await?)
    }

    async fn api_info(&self) -> Result<ApiInfo> {
        let params: Vec<_> = self.token_param().into_iter().collect();
        self.get_json(&self.endpoint, &params).await
    }

    /// Turn a content reference into the concrete `ref` parameter
    async fn ref_value(&self, reference: &ContentRef) -> Result<String> {
        match reference {
            ContentRef::Preview(token) => Ok(token.clone()),
            ContentRef::Master => {
                let info = self.api_info().await?;
                info.master_ref()
                    .map(str::to_string)
                    .ok_or_else(|| BlogError::config("CMS API exposes no master ref"))
            }
        }
    }

    async fn search(&self, query: &Query) -> Result<SearchResponse> {
        let mut params = query.params();
        params.push(("ref", self.ref_value(&query.reference).await?));
        params.extend(self.token_param());
        self.get_json(&self.search_url(), &params).await
    }
}

#[async_trait]
impl ContentSource for PrismicClient {
    async fn query(&self, query: &Query) -> Result<SearchResponse> {
        self.search(query).await
    }

    async fn fetch_page(&self, url: &str) -> Result<SearchResponse> {
        self.get_json(url, &[]).await
    }

    async fn get_by_uid(
        &self,
        doc_type: &str,
        uid: &str,
        reference: &ContentRef,
    ) -> Result<Option<Document>> {
        let query = Query::new()
            .predicate(Predicate::at(format!("my.{}.uid", doc_type), uid))
            .page_size(1)
            .reference(reference.clone());
        let response = self.search(&query).await?;
        Ok(response.results.into_iter().next())
    }

    async fn resolve_preview(&self, token: &str, document_id: &str) -> Result<String> {
        if token.is_empty() {
            return Err(BlogError::InvalidPreviewToken);
        }

        let query = Query::new()
            .predicate(Predicate::at("document.id", document_id))
            .page_size(1)
            .reference(ContentRef::Preview(token.to_string()));

        match self.search(&query).await {
            Ok(response) => Ok(response
                .results
                .first()
                .map(resolve_link)
                .unwrap_or_else(|| "/".to_string())),
            Err(BlogError::Status { status, .. }) if (400..500).contains(&status) => {
                Err(BlogError::InvalidPreviewToken)
            }
            Err(e) => Err(e),
        }
    }
}
