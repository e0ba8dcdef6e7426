pub mod api;
pub mod error;
pub mod state;

use infrastructure::ServerConfig;
use state::AppState;
use std::sync::Arc;

pub async fn setup_app_state(config: ServerConfig) -> anyhow::Result<Arc<AppState>> {
    Ok(Arc::new(AppState::new(config).await?))
}
