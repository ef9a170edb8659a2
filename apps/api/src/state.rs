use crate::config::Config;
use crate::templates::service::TemplateCatalog;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub catalog: TemplateCatalog,
    pub config: Config,
}
