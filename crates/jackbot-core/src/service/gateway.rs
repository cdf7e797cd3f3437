use std::sync::Arc;

use tracing::info;

use crate::backend::memory::MemoryBackend;
use crate::catalog::HttpCatalogClient;
use crate::channel::messenger::MessengerClient;
use crate::config::Config;
use crate::router::{Collaborators, Router};
use crate::service::http::{self, AppState};
use crate::session::memory_store::MemorySessionStore;

/// Start the full jackbot gateway.
pub async fn run_gateway(config: Config) -> anyhow::Result<()> {
    if config.messenger.app_secret.is_empty()
        || config.messenger.validation_token.is_empty()
        || config.messenger.page_access_token.is_empty()
    {
        return Err(anyhow::anyhow!(
            "Messenger credentials not configured. Set them in ~/.jackbot/config.json"
        ));
    }

    let config = Arc::new(config);

    let collab = Collaborators {
        send: Arc::new(MessengerClient::new(config.messenger.clone())),
        backend: Arc::new(MemoryBackend::new()),
        sessions: Arc::new(MemorySessionStore::new()),
        catalog: Arc::new(HttpCatalogClient::new(config.catalog.clone())),
    };
    let router = Arc::new(Router::new(config.clone(), collab));

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    info!(regions = config.catalog.regions.len(), "starting gateway");

    let state = Arc::new(AppState { config, router });
    http::serve(&addr, state).await
}
