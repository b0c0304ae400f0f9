// src/docstore/http.rs

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::docstore::ProfileStore;
use crate::error::AppError;
use crate::models::user::ProfileDocument;

/// One document in a collection listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: String,
    #[serde(flatten)]
    pub profile: ProfileDocument,
}

/// HTTP client for the external profile document store.
///
/// Collection layout: `GET /users` lists every document, `GET /users/{id}`
/// fetches one, `PUT /users/{id}` creates or replaces one.
#[derive(Clone)]
pub struct HttpProfileStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProfileStore {
    pub fn new(base_url: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { client, base_url })
    }

    fn document_url(&self, user_id: &str) -> String {
        format!("{}/users/{}", self.base_url, user_id)
    }
}

#[async_trait]
impl ProfileStore for HttpProfileStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<ProfileDocument>, AppError> {
        let res = self.client.get(self.document_url(user_id)).send().await?;

        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !res.status().is_success() {
            return Err(AppError::InternalServerError(format!(
                "Profile store returned HTTP {} for user {}",
                res.status(),
                user_id
            )));
        }

        let profile = res.json::<ProfileDocument>().await?;
        Ok(Some(profile))
    }

    async fn put_profile(
        &self,
        user_id: &str,
        profile: &ProfileDocument,
    ) -> Result<(), AppError> {
        let res = self
            .client
            .put(self.document_url(user_id))
            .json(profile)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(AppError::InternalServerError(format!(
                "Profile store returned HTTP {} writing user {}",
                res.status(),
                user_id
            )));
        }

        Ok(())
    }

    async fn list_profiles(&self) -> Result<Vec<(String, ProfileDocument)>, AppError> {
        let res = self
            .client
            .get(format!("{}/users", self.base_url))
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(AppError::InternalServerError(format!(
                "Profile store returned HTTP {} listing users",
                res.status()
            )));
        }

        let records = res.json::<Vec<ProfileRecord>>().await?;
        Ok(records.into_iter().map(|r| (r.id, r.profile)).collect())
    }
}
