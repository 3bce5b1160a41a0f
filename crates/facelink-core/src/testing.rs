//! In-memory `FaceApi` used by the unit tests.

use crate::api::{
    ApiError, AuthResponse, ComparisonResponse, EmbeddingListResponse, EmbeddingResponse,
    FaceApi, UserLogin, UserRegister,
};
use crate::types::ImageFile;
use chrono::{TimeZone, Utc};
use std::sync::Mutex;

type Reply<T> = Mutex<Option<Result<T, ApiError>>>;

#[derive(Default)]
pub struct MockApi {
    calls: Mutex<Vec<String>>,
    auth: Reply<AuthResponse>,
    create: Reply<EmbeddingResponse>,
    delete: Reply<EmbeddingResponse>,
    rename: Reply<EmbeddingResponse>,
    compare: Reply<ComparisonResponse>,
    list: Reply<EmbeddingListResponse>,
}

fn reply<T: Clone>(slot: &Reply<T>) -> Result<T, ApiError> {
    slot.lock()
        .unwrap()
        .clone()
        .unwrap_or_else(|| Err(ApiError::Transport("no reply configured".into())))
}

impl MockApi {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn set_auth(&self, r: Result<AuthResponse, ApiError>) {
        *self.auth.lock().unwrap() = Some(r);
    }

    pub fn set_create(&self, r: Result<EmbeddingResponse, ApiError>) {
        *self.create.lock().unwrap() = Some(r);
    }

    pub fn set_delete(&self, r: Result<EmbeddingResponse, ApiError>) {
        *self.delete.lock().unwrap() = Some(r);
    }

    pub fn set_compare(&self, r: Result<ComparisonResponse, ApiError>) {
        *self.compare.lock().unwrap() = Some(r);
    }

    pub fn set_list(&self, r: Result<EmbeddingListResponse, ApiError>) {
        *self.list.lock().unwrap() = Some(r);
    }
}

impl FaceApi for MockApi {
    async fn register(&self, user: &UserRegister) -> Result<AuthResponse, ApiError> {
        self.record(format!("register:{}", user.email));
        reply(&self.auth)
    }

    async fn login(&self, user: &UserLogin) -> Result<AuthResponse, ApiError> {
        self.record(format!("login:{}", user.email));
        reply(&self.auth)
    }

    async fn create_embedding(
        &self,
        _file: &ImageFile,
        name: &str,
    ) -> Result<EmbeddingResponse, ApiError> {
        self.record(format!("create:{name}"));
        reply(&self.create)
    }

    async fn delete_embedding(&self, person_name: &str) -> Result<EmbeddingResponse, ApiError> {
        self.record(format!("delete:{person_name}"));
        reply(&self.delete)
    }

    async fn rename_embedding(
        &self,
        person_name: &str,
        new_person_name: &str,
    ) -> Result<EmbeddingResponse, ApiError> {
        self.record(format!("rename:{person_name}->{new_person_name}"));
        let configured = self.rename.lock().unwrap().clone();
        configured.unwrap_or_else(|| {
            Ok(EmbeddingResponse {
                success: true,
                embedding: None,
                message: Some(format!("Embedding updated for {person_name}")),
                error: None,
            })
        })
    }

    async fn compare_faces(
        &self,
        first: &ImageFile,
        second: &ImageFile,
    ) -> Result<ComparisonResponse, ApiError> {
        self.record(format!("compare:{}:{}", first.name, second.name));
        reply(&self.compare)
    }

    async fn list_embeddings(&self) -> Result<EmbeddingListResponse, ApiError> {
        self.record("list".to_string());
        reply(&self.list)
    }
}

pub fn jpeg_file(name: &str) -> ImageFile {
    ImageFile::new(
        name,
        "image/jpeg",
        vec![0xFF, 0xD8, 0xFF, 0xD9],
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    )
}
