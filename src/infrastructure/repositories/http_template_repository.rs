use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::domain::errors::{TemplateError, TemplateResult};
use crate::domain::repositories::TemplateRepository;
use crate::domain::template::{NewTemplate, Template, VariableValues};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Body of the usage report
#[derive(Debug, Serialize)]
struct RecordUseRequest<'a> {
    variables: &'a VariableValues,
}

/// The service answers either with the bare value or wrapped in an envelope
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ServiceResponse<T> {
    Envelope {
        success: Option<bool>,
        message: Option<String>,
        data: T,
    },
    Bare(T),
}

impl<T> ServiceResponse<T> {
    fn into_data(self) -> TemplateResult<T> {
        match self {
            ServiceResponse::Envelope {
                success: Some(false),
                message,
                ..
            } => Err(TemplateError::Remote(
                message.unwrap_or_else(|| "request was not successful".to_string()),
            )),
            ServiceResponse::Envelope { data, .. } => Ok(data),
            ServiceResponse::Bare(data) => Ok(data),
        }
    }
}

/// REST implementation of TemplateRepository
///
/// Talks to the template service under `base_url`:
/// `GET /templates`, `GET /templates/{id}`, `POST /templates/{id}/use`,
/// `POST /templates`, `PUT /templates/{id}`, `DELETE /templates/{id}`.
pub struct HttpTemplateRepository {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpTemplateRepository {
    /// Creates a new HttpTemplateRepository
    ///
    /// # Arguments
    /// * `base_url` - Root of the template service API, without `/templates`
    /// * `token` - Optional bearer token sent with every request
    pub fn new(base_url: impl AsRef<str>, token: Option<String>) -> TemplateResult<Self> {
        let raw = base_url.as_ref();
        let base_url = Url::parse(raw)
            .map_err(|e| TemplateError::Config(format!("Invalid template service URL {}: {}", raw, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(TemplateError::Config(format!(
                "Template service URL is not hierarchical: {}",
                raw
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TemplateError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// URL of a resource below the API root; each segment is percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.endpoint(segments);
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> TemplateResult<Response> {
        builder
            .send()
            .await
            .map_err(|e| TemplateError::Remote(e.to_string()))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> TemplateResult<T> {
        let response = Self::check_status(response).await?;
        let payload: ServiceResponse<T> = response
            .json()
            .await
            .map_err(|e| TemplateError::Decode(e.to_string()))?;
        payload.into_data()
    }

    async fn check_status(response: Response) -> TemplateResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(TemplateError::RemoteStatus {
            status: status.as_u16(),
            message: error_message(&body, status),
        })
    }
}

/// Extracts `message` or `error` from a JSON error body, else the raw text
fn error_message(body: &str, status: StatusCode) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .or_else(|| value.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        });

    match from_json {
        Some(message) => message,
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    }
}

#[async_trait]
impl TemplateRepository for HttpTemplateRepository {
    async fn list(&self) -> TemplateResult<Vec<Template>> {
        let response = self.send(self.request(Method::GET, &["templates"])).await?;
        let templates: Vec<Template> = Self::decode(response).await?;
        debug!(count = templates.len(), "Fetched templates");
        Ok(templates)
    }

    async fn get(&self, id: &str) -> TemplateResult<Option<Template>> {
        let response = self.send(self.request(Method::GET, &["templates", id])).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::decode(response).await.map(Some)
    }

    async fn record_use(&self, id: &str, variables: &VariableValues) -> TemplateResult<()> {
        let builder = self
            .request(Method::POST, &["templates", id, "use"])
            .json(&RecordUseRequest { variables });
        let response = self.send(builder).await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn create(&self, template: &NewTemplate) -> TemplateResult<Template> {
        let builder = self.request(Method::POST, &["templates"]).json(template);
        let response = self.send(builder).await?;
        Self::decode(response).await
    }

    async fn update(&self, id: &str, template: &NewTemplate) -> TemplateResult<Template> {
        let builder = self.request(Method::PUT, &["templates", id]).json(template);
        let response = self.send(builder).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(TemplateError::TemplateNotFound(id.to_string()));
        }
        Self::decode(response).await
    }

    async fn delete(&self, id: &str) -> TemplateResult<()> {
        let response = self.send(self.request(Method::DELETE, &["templates", id])).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(TemplateError::TemplateNotFound(id.to_string()));
        }
        Self::check_status(response).await?;
        Ok(())
    }
}
