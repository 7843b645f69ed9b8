use std::sync::Arc;

use sqlx::PgPool;

use crate::assessment::feedback::FeedbackGenerator;
use crate::classification::TaskClassifier;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Turns free-text task descriptions into process involvement.
    /// Default: `LlmTaskClassifier`; the keyword classifier is the fallback.
    pub task_classifier: Arc<dyn TaskClassifier>,
    pub feedback_generator: Arc<dyn FeedbackGenerator>,
}
