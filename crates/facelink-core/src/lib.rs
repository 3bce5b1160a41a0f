//! facelink-core — Shared types and client-side state for the face
//! recognition dashboard.
//!
//! Holds the backend API contract (`FaceApi`), the dashboard tab state
//! machines and the register/login forms. Nothing here performs I/O on its
//! own; requests go through a `FaceApi` implementation.

pub mod api;
pub mod auth;
pub mod dashboard;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiError, FaceApi};
pub use dashboard::{Dashboard, Feedback, Status, Tab};
pub use types::{AcceptPattern, ImageFile};
