use metrics_exporter_prometheus::PrometheusHandle;
use premium_estimator::auth::Authenticator;
use premium_estimator::storage::{Backend, StorageHandle};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Storage shared by prediction history and account lookups.
pub(crate) type SharedStore = StorageHandle<Backend>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) auth: Arc<Authenticator<SharedStore>>,
}
