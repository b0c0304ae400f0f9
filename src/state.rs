use std::sync::Arc;

use axum::extract::FromRef;

use crate::config::Config;
use crate::docstore::ProfileStore;
use crate::services::openrouter::OpenRouter;
use crate::storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub profiles: Arc<dyn ProfileStore>,
    pub tutor: OpenRouter,
    pub config: Config,
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
