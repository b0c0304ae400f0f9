// src/docstore/mod.rs

pub mod http;
pub mod memory;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::user::ProfileDocument;

pub use http::HttpProfileStore;
pub use memory::MemProfileStore;

/// Seam over the external profile document store. The store itself is an
/// opaque JSON-document service; we only rely on get/put by key and a full
/// collection scan (the leaderboard reads every profile).
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, user_id: &str) -> Result<Option<ProfileDocument>, AppError>;
    async fn put_profile(&self, user_id: &str, profile: &ProfileDocument)
    -> Result<(), AppError>;
    async fn list_profiles(&self) -> Result<Vec<(String, ProfileDocument)>, AppError>;
}
