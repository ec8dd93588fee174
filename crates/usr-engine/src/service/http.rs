//! HTTP client for the USR service
//!
//! | operation | request |
//! |---|---|
//! | load | `GET /annotator/usr/{id}` |
//! | update | `PUT /annotator/usr/{id}` |
//! | submit | `POST /annotator/submit_usr/{id}` |
//! | create | `POST /admin/usr/{segment}` |
//! | segments | `GET /admin/chapter/{chapter}/segments` |
//! | search | `GET /annotator/search_concepts?term=&lang=&exact=false` |

use super::{ConceptCandidate, Result, Segment, UsrAssignment, UsrService};
use crate::config::ServiceConfig;
use crate::error::ServiceError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use usr_codec::UsrUpload;
use usr_model::UsrRecord;

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<ConceptCandidate>,
}

/// Client for the service's REST API
#[derive(Debug, Clone)]
pub struct HttpUsrService {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpUsrService {
    /// Create new client
    ///
    /// # Errors
    /// [`ServiceError::Http`] if the HTTP client cannot be built
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ServiceError::status(status.as_u16(), body))
        }
    }
}

#[async_trait]
impl UsrService for HttpUsrService {
    async fn load_usr(&self, usr_id: &str) -> Result<UsrAssignment> {
        let url = self.url(&format!("/annotator/usr/{usr_id}"));
        debug!(%url, "loading usr");
        let response = self.send(self.client.get(url)).await?;
        Ok(response.json().await?)
    }

    async fn update_usr(&self, usr_id: &str, record: &UsrRecord) -> Result<()> {
        let url = self.url(&format!("/annotator/usr/{usr_id}"));
        self.send(self.client.put(url).json(record)).await?;
        Ok(())
    }

    async fn submit_usr(&self, usr_id: &str) -> Result<()> {
        let url = self.url(&format!("/annotator/submit_usr/{usr_id}"));
        self.send(self.client.post(url).json(&serde_json::json!({})))
            .await?;
        Ok(())
    }

    async fn create_usr(&self, segment_id: &str, upload: &UsrUpload) -> Result<()> {
        let url = self.url(&format!("/admin/usr/{segment_id}"));
        self.send(self.client.post(url).json(upload)).await?;
        Ok(())
    }

    async fn list_segments(&self, chapter_id: &str) -> Result<Vec<Segment>> {
        let url = self.url(&format!("/admin/chapter/{chapter_id}/segments"));
        debug!(%url, "listing segments");
        let response = self.send(self.client.get(url)).await?;
        Ok(response.json().await?)
    }

    async fn search_concepts(&self, term: &str, language: &str) -> Result<Vec<ConceptCandidate>> {
        let request = self
            .client
            .get(self.url("/annotator/search_concepts"))
            .query(&[("term", term), ("lang", language), ("exact", "false")]);
        let response: SearchResponse = self.send(request).await?.json().await?;
        Ok(response.results)
    }
}
