//! Backend API contract: request/response shapes and the `FaceApi` trait.

use crate::types::ImageFile;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("server returned {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Server { status: u16, detail: Option<String> },
    #[error("transport failed: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("invalid request: {0}")]
    Request(String),
}

impl ApiError {
    /// The server-provided error detail, if the backend sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Server { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// User-facing text: the server detail, or `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_string()
    }
}

/// Extract the `detail` field from an error body.
///
/// String details are used verbatim; structured ones (validation error lists)
/// are rendered as compact JSON.
pub fn detail_from_body(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRegister {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserLogin {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: String,
    pub user: Option<serde_json::Value>,
}

/// Response of create/delete/rename embedding calls.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmbeddingResponse {
    pub success: bool,
    pub embedding: Option<Vec<f32>>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl EmbeddingResponse {
    /// First of message, error, `fallback`.
    pub fn text_or(&self, fallback: &str) -> String {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .unwrap_or(fallback)
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmbeddingEntry {
    pub id: i64,
    pub person_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmbeddingListResponse {
    pub success: bool,
    pub embeddings: Option<Vec<EmbeddingEntry>>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComparisonResponse {
    #[serde(rename = "match")]
    pub is_match: bool,
    /// Cosine similarity in [0, 1] as reported by the backend.
    pub similarity: Option<f64>,
    pub message: Option<String>,
}

impl ComparisonResponse {
    pub fn no_match(message: impl Into<String>) -> Self {
        Self {
            is_match: false,
            similarity: None,
            message: Some(message.into()),
        }
    }

    /// Headline, optional similarity percentage, optional message.
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = vec![if self.is_match {
            "Match Found!".to_string()
        } else {
            "No Match".to_string()
        }];
        if let Some(similarity) = self.similarity {
            lines.push(format!("Similarity: {:.1}%", similarity * 100.0));
        }
        if let Some(message) = &self.message {
            lines.push(message.clone());
        }
        lines
    }
}

/// The backend's endpoints. Implementations are stateless: no retry,
/// no caching, no batching.
#[allow(async_fn_in_trait)]
pub trait FaceApi {
    async fn register(&self, user: &UserRegister) -> Result<AuthResponse, ApiError>;

    async fn login(&self, user: &UserLogin) -> Result<AuthResponse, ApiError>;

    async fn create_embedding(
        &self,
        file: &ImageFile,
        name: &str,
    ) -> Result<EmbeddingResponse, ApiError>;

    async fn delete_embedding(&self, person_name: &str) -> Result<EmbeddingResponse, ApiError>;

    async fn rename_embedding(
        &self,
        person_name: &str,
        new_person_name: &str,
    ) -> Result<EmbeddingResponse, ApiError>;

    async fn compare_faces(
        &self,
        first: &ImageFile,
        second: &ImageFile,
    ) -> Result<ComparisonResponse, ApiError>;

    async fn list_embeddings(&self) -> Result<EmbeddingListResponse, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_from_body_string() {
        let body = r#"{"detail": "Email already registered"}"#;
        assert_eq!(
            detail_from_body(body).as_deref(),
            Some("Email already registered")
        );
    }

    #[test]
    fn test_detail_from_body_structured() {
        let body = r#"{"detail": [{"loc": ["query", "person_name"]}]}"#;
        let detail = detail_from_body(body).unwrap();
        assert!(detail.contains("person_name"));
    }

    #[test]
    fn test_detail_from_body_missing() {
        assert_eq!(detail_from_body(r#"{"error": "x"}"#), None);
        assert_eq!(detail_from_body("<html>bad gateway</html>"), None);
    }

    #[test]
    fn test_user_message_fallback() {
        let err = ApiError::Transport("connection refused".into());
        assert_eq!(err.user_message("Failed."), "Failed.");

        let err = ApiError::Server {
            status: 400,
            detail: Some("bad".into()),
        };
        assert_eq!(err.user_message("Failed."), "bad");
    }

    #[test]
    fn test_comparison_render_match() {
        let result: ComparisonResponse =
            serde_json::from_str(r#"{"match": true, "similarity": 0.92}"#).unwrap();
        assert_eq!(
            result.render_lines(),
            vec!["Match Found!".to_string(), "Similarity: 92.0%".to_string()]
        );
    }

    #[test]
    fn test_comparison_render_message_only() {
        let result: ComparisonResponse =
            serde_json::from_str(r#"{"match": false, "message": "Face not detected"}"#).unwrap();
        assert_eq!(
            result.render_lines(),
            vec!["No Match".to_string(), "Face not detected".to_string()]
        );
    }

    #[test]
    fn test_embedding_response_text_order() {
        let resp: EmbeddingResponse =
            serde_json::from_str(r#"{"success": false, "error": "db locked"}"#).unwrap();
        assert_eq!(resp.text_or("fallback"), "db locked");

        let resp: EmbeddingResponse = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert_eq!(resp.text_or("fallback"), "fallback");
    }

    #[test]
    fn test_list_response_preserves_order() {
        let resp: EmbeddingListResponse = serde_json::from_str(
            r#"{"success": true, "embeddings": [{"id": 7, "person_name": "Zed"}, {"id": 2, "person_name": "Amy"}]}"#,
        )
        .unwrap();
        let names: Vec<_> = resp
            .embeddings
            .unwrap()
            .into_iter()
            .map(|e| e.person_name)
            .collect();
        assert_eq!(names, vec!["Zed", "Amy"]);
    }
}
