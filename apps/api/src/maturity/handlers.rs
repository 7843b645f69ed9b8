use axum::Json;
use tracing::info;

use crate::errors::AppError;
use crate::maturity::scorer::{calculate, MaturityAnswers, MaturityScore};

/// POST /api/v1/maturity/score
///
/// Stateless; nothing is persisted.
pub async fn handle_score_maturity(
    Json(answers): Json<MaturityAnswers>,
) -> Result<Json<MaturityScore>, AppError> {
    let score = calculate(&answers)?;
    info!(
        "Maturity score {} (level {}, {:?})",
        score.final_score, score.level_number, score.profile_type
    );
    Ok(Json(score))
}
