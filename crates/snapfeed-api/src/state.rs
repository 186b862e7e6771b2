//! Application state

use metrics_exporter_prometheus::PrometheusHandle;
use snapfeed_auth::{Authenticator, TokenCodec};
use snapfeed_db::Database;
use snapfeed_storage::ImageStore;
use std::sync::Arc;

/// Prometheus render handle
pub type MetricsHandle = PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub tokens: Arc<TokenCodec>,
    pub auth: Arc<Authenticator>,
    pub images: Arc<dyn ImageStore>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        db: Database,
        tokens: Arc<TokenCodec>,
        images: Arc<dyn ImageStore>,
        max_upload_bytes: usize,
    ) -> Self {
        let auth = Arc::new(Authenticator::new(db.clone(), tokens.clone()));
        Self {
            db,
            tokens,
            auth,
            images,
            max_upload_bytes,
        }
    }
}
