//! Shared application state

use crate::config::Config;

/// State injected into all route handlers via Axum extractors.
///
/// There is deliberately nothing mutable here: every request runs its own
/// parse/compose/assemble pipeline on request-scoped buffers.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
}
