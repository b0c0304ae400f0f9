// src/docstore/memory.rs

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::docstore::ProfileStore;
use crate::error::AppError;
use crate::models::user::ProfileDocument;

/// In-memory stand-in for the external profile document store.
#[derive(Default)]
pub struct MemProfileStore {
    documents: Mutex<HashMap<String, ProfileDocument>>,
}

impl MemProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for MemProfileStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<ProfileDocument>, AppError> {
        let documents = self.documents.lock().expect("profile mutex poisoned");
        Ok(documents.get(user_id).cloned())
    }

    async fn put_profile(
        &self,
        user_id: &str,
        profile: &ProfileDocument,
    ) -> Result<(), AppError> {
        let mut documents = self.documents.lock().expect("profile mutex poisoned");
        documents.insert(user_id.to_string(), profile.clone());
        Ok(())
    }

    async fn list_profiles(&self) -> Result<Vec<(String, ProfileDocument)>, AppError> {
        let documents = self.documents.lock().expect("profile mutex poisoned");
        let mut profiles: Vec<(String, ProfileDocument)> = documents
            .iter()
            .map(|(id, doc)| (id.clone(), doc.clone()))
            .collect();
        // Stable scan order so ties on the leaderboard stay deterministic.
        profiles.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(profiles)
    }
}
