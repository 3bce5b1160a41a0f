//! facelink-client — HTTP implementation of `FaceApi`.
//!
//! JSON for the auth endpoints, multipart form-data for anything carrying an
//! image, query parameters for delete/rename. Stateless: no retries, no
//! caching, no timeouts.

use facelink_core::api::{
    detail_from_body, ApiError, AuthResponse, ComparisonResponse, EmbeddingListResponse,
    EmbeddingResponse, FaceApi, UserLogin, UserRegister,
};
use facelink_core::ImageFile;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("invalid base URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Client for the face-recognition backend.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base: Url,
}

impl HttpClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        // A trailing slash makes `join` append rather than replace the last segment.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base = Url::parse(&normalized).map_err(|e| ClientError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("facelink/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::Request(format!("bad endpoint {path}: {e}")))
    }

    fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, ApiError> {
        let url = self.endpoint(path)?;
        tracing::debug!(%method, %url, "backend request");
        Ok(self.http.request(method, url))
    }

    async fn send<T: DeserializeOwned>(builder: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport)?;
        tracing::debug!(status, len = body.len(), "backend response");
        decode_body(status, &body)
    }
}

fn transport(e: reqwest::Error) -> ApiError {
    tracing::warn!(error = %e, "backend unreachable");
    ApiError::Transport(e.to_string())
}

/// Turn a status and body into the typed reply or an `ApiError`.
pub fn decode_body<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    if !(200..300).contains(&status) {
        return Err(ApiError::Server {
            status,
            detail: detail_from_body(body),
        });
    }
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

fn image_part(file: &ImageFile) -> Result<Part, ApiError> {
    Part::bytes(file.bytes.clone())
        .file_name(file.name.clone())
        .mime_str(&file.mime)
        .map_err(|e| ApiError::Request(format!("bad MIME type {}: {e}", file.mime)))
}

impl FaceApi for HttpClient {
    async fn register(&self, user: &UserRegister) -> Result<AuthResponse, ApiError> {
        Self::send(self.request(Method::POST, "/auth/register")?.json(user)).await
    }

    async fn login(&self, user: &UserLogin) -> Result<AuthResponse, ApiError> {
        Self::send(self.request(Method::POST, "/auth/login")?.json(user)).await
    }

    async fn create_embedding(
        &self,
        file: &ImageFile,
        name: &str,
    ) -> Result<EmbeddingResponse, ApiError> {
        let form = Form::new()
            .part("file", image_part(file)?)
            .text("name", name.to_string());
        Self::send(self.request(Method::POST, "/create-embedding")?.multipart(form)).await
    }

    async fn delete_embedding(&self, person_name: &str) -> Result<EmbeddingResponse, ApiError> {
        let builder = self
            .request(Method::DELETE, "/delete-embedding")?
            .query(&[("person_name", person_name)]);
        Self::send(builder).await
    }

    async fn rename_embedding(
        &self,
        person_name: &str,
        new_person_name: &str,
    ) -> Result<EmbeddingResponse, ApiError> {
        let builder = self
            .request(Method::PUT, "/update-embedding")?
            .query(&[("person_name", person_name), ("new_person_name", new_person_name)]);
        Self::send(builder).await
    }

    async fn compare_faces(
        &self,
        first: &ImageFile,
        second: &ImageFile,
    ) -> Result<ComparisonResponse, ApiError> {
        let form = Form::new()
            .part("file1", image_part(first)?)
            .part("file2", image_part(second)?);
        Self::send(self.request(Method::POST, "/compare-faces")?.multipart(form)).await
    }

    async fn list_embeddings(&self) -> Result<EmbeddingListResponse, ApiError> {
        Self::send(self.request(Method::GET, "/embeddings")?).await
    }
}
