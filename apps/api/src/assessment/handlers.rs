//! Axum route handlers for assessments, gap reports and feedback.

use std::collections::HashSet;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::assessment::feedback::{generate_area_feedback, AreaFeedback};
use crate::assessment::gap::{
    evaluate_gaps, indicator_misses, AreaGaps, GapSummary, IndicatorLookup,
};
use crate::assessment::store::{
    create_assessment, get_assessment, load_feedback, load_indicators, load_results,
    replace_feedback,
};
use crate::catalog::{self, CompetencyLevel};
use crate::errors::AppError;
use crate::matrix::store::{dense_levels, load_role_requirements};
use crate::models::assessment::{AssessmentFeedbackRow, AssessmentRow, CompetencyIndicatorRow};
use crate::profiles::store::load_profile_requirements;
use crate::profiles::ProfileRef;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// One answer. Exactly one of `survey_index` (0–4, questionnaire position)
/// or `score` (0/1/2/4/6) must be given.
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerInput {
    pub competency_id: i32,
    #[serde(default)]
    pub survey_index: Option<i64>,
    #[serde(default)]
    pub score: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAssessmentRequest {
    pub organization_id: i32,
    pub profile: ProfileRef,
    /// Role the gaps are measured against. Without it, the profile's own
    /// derived requirements are used.
    #[serde(default)]
    pub role_id: Option<i32>,
    pub answers: Vec<AnswerInput>,
}

#[derive(Debug, Serialize)]
pub struct CreateAssessmentResponse {
    pub assessment: AssessmentRow,
    pub result_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementSource {
    Role,
    Profile,
    /// Nothing stored; every requirement is treated as unaware.
    None,
}

#[derive(Debug, Serialize)]
pub struct GapReport {
    pub assessment_id: Uuid,
    pub organization_id: i32,
    pub role_id: Option<i32>,
    pub role_name: Option<&'static str>,
    pub requirement_source: RequirementSource,
    pub summary: GapSummary,
    pub areas: Vec<AreaGaps>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub assessment_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub areas: Vec<AreaFeedback>,
}

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

fn answer_level(answer: &AnswerInput) -> Result<CompetencyLevel, AppError> {
    match (answer.survey_index, answer.score) {
        (Some(index), None) => u8::try_from(index)
            .ok()
            .and_then(CompetencyLevel::from_survey_index)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "survey_index {index} for competency {} is out of range (expected 0-4)",
                    answer.competency_id
                ))
            }),
        (None, Some(score)) => i16::try_from(score)
            .ok()
            .and_then(CompetencyLevel::from_value)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "score {score} for competency {} is not a valid level (expected 0, 1, 2, 4 or 6)",
                    answer.competency_id
                ))
            }),
        _ => Err(AppError::Validation(format!(
            "Answer for competency {} needs exactly one of survey_index or score",
            answer.competency_id
        ))),
    }
}

/// Validates a complete answer set: every competency exactly once, every
/// value on its scale.
pub fn scores_from_answers(answers: &[AnswerInput]) -> Result<Vec<(i32, CompetencyLevel)>, AppError> {
    let mut seen = HashSet::new();
    let mut scores = Vec::with_capacity(answers.len());

    for answer in answers {
        if catalog::competency(answer.competency_id).is_none() {
            return Err(AppError::Validation(format!(
                "Unknown competency id {}",
                answer.competency_id
            )));
        }
        if !seen.insert(answer.competency_id) {
            return Err(AppError::Validation(format!(
                "Duplicate answer for competency {}",
                answer.competency_id
            )));
        }
        scores.push((answer.competency_id, answer_level(answer)?));
    }

    let missing: Vec<String> = catalog::competencies()
        .iter()
        .filter(|c| !seen.contains(&c.id))
        .map(|c| c.id.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing answers for competencies {}",
            missing.join(", ")
        )));
    }

    scores.sort_by_key(|(id, _)| *id);
    Ok(scores)
}

fn profile_of(assessment: &AssessmentRow) -> Option<ProfileRef> {
    match (&assessment.user_id, &assessment.user_name) {
        (Some(user_id), _) => Some(ProfileRef::Registered { user_id: *user_id }),
        (None, Some(user_name)) => Some(ProfileRef::Ephemeral {
            user_name: user_name.clone(),
        }),
        (None, None) => None,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Gap report
// ────────────────────────────────────────────────────────────────────────────

async fn required_levels(
    pool: &PgPool,
    assessment: &AssessmentRow,
) -> Result<(RequirementSource, Vec<CompetencyLevel>), AppError> {
    let organization_id = assessment.organization_id;

    if let Some(role_id) = assessment.role_id {
        return match load_role_requirements(pool, organization_id, role_id).await? {
            Some(levels) => Ok((RequirementSource::Role, levels)),
            None => {
                warn!("Organization {organization_id} has no requirements for role {role_id}; using zeros");
                Ok((RequirementSource::None, Vec::new()))
            }
        };
    }

    let stored = match profile_of(assessment) {
        Some(profile) => load_profile_requirements(pool, organization_id, &profile).await?,
        None => None,
    };
    match stored {
        Some(levels) => Ok((RequirementSource::Profile, levels)),
        None => {
            warn!("Assessment {} has no stored profile requirements; using zeros", assessment.id);
            Ok((RequirementSource::None, Vec::new()))
        }
    }
}

/// Stored indicators, or the in-code catalog when the table is empty.
fn indicator_lookup(rows: Vec<CompetencyIndicatorRow>) -> IndicatorLookup {
    if rows.is_empty() {
        warn!("No competency indicators stored; using catalog indicator texts");
        return IndicatorLookup::from_catalog();
    }
    IndicatorLookup::from_rows(rows)
}

async fn build_gap_report(pool: &PgPool, assessment: &AssessmentRow) -> Result<GapReport, AppError> {
    let results = load_results(pool, assessment.id).await?;
    let user_levels = dense_levels(results.into_iter().map(|r| {
        (
            r.competency_id,
            CompetencyLevel::from_value(r.score).unwrap_or_default(),
        )
    }));

    let (requirement_source, required) = required_levels(pool, assessment).await?;
    let indicators = indicator_lookup(load_indicators(pool).await?);

    let areas = evaluate_gaps(&user_levels, &required, &indicators);
    let misses = indicator_misses(&areas);
    if misses > 0 {
        warn!(
            "Assessment {}: {misses} indicator lookups fell back to the placeholder",
            assessment.id
        );
    }

    Ok(GapReport {
        assessment_id: assessment.id,
        organization_id: assessment.organization_id,
        role_id: assessment.role_id,
        role_name: assessment.role_id.and_then(catalog::role).map(|r| r.name),
        requirement_source,
        summary: GapSummary::of(&areas),
        areas,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/assessments
pub async fn handle_create_assessment(
    State(state): State<AppState>,
    Json(request): Json<CreateAssessmentRequest>,
) -> Result<(StatusCode, Json<CreateAssessmentResponse>), AppError> {
    let profile = request.profile.normalized()?;
    if let Some(role_id) = request.role_id {
        if catalog::role(role_id).is_none() {
            return Err(AppError::Validation(format!("Unknown role id {role_id}")));
        }
    }
    let scores = scores_from_answers(&request.answers)?;

    let assessment = create_assessment(
        &state.db,
        request.organization_id,
        &profile,
        request.role_id,
        &scores,
    )
    .await?;

    info!(
        "Assessment {} recorded for {profile} in organization {}",
        assessment.id, assessment.organization_id
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateAssessmentResponse {
            assessment,
            result_count: scores.len(),
        }),
    ))
}

/// GET /api/v1/assessments/:id/gaps
pub async fn handle_get_gaps(
    State(state): State<AppState>,
    Path(assessment_id): Path<Uuid>,
) -> Result<Json<GapReport>, AppError> {
    let assessment = get_assessment(&state.db, assessment_id).await?;
    Ok(Json(build_gap_report(&state.db, &assessment).await?))
}

/// POST /api/v1/assessments/:id/feedback
///
/// Generates feedback per competency area and replaces any stored feedback.
/// Assessment results are never modified.
pub async fn handle_generate_feedback(
    State(state): State<AppState>,
    Path(assessment_id): Path<Uuid>,
) -> Result<Json<FeedbackResponse>, AppError> {
    let assessment = get_assessment(&state.db, assessment_id).await?;
    let report = build_gap_report(&state.db, &assessment).await?;

    let mut areas = Vec::with_capacity(report.areas.len());
    for area in &report.areas {
        let feedback = generate_area_feedback(
            state.feedback_generator.as_ref(),
            area,
            state.config.llm_timeout,
        )
        .await?;
        areas.push(feedback);
    }

    let documents = areas
        .iter()
        .map(|area| {
            serde_json::to_value(area)
                .map(|doc| (area.area.as_str().to_string(), doc))
                .map_err(|e| AppError::Internal(e.into()))
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    let stored = replace_feedback(&state.db, assessment_id, documents).await?;
    let generated_at = stored
        .first()
        .map(|row| row.generated_at)
        .unwrap_or_else(Utc::now);

    info!("Generated feedback for assessment {assessment_id} ({} areas)", areas.len());

    Ok(Json(FeedbackResponse {
        assessment_id,
        generated_at,
        areas,
    }))
}

/// GET /api/v1/assessments/:id/feedback
pub async fn handle_get_feedback(
    State(state): State<AppState>,
    Path(assessment_id): Path<Uuid>,
) -> Result<Json<Vec<AssessmentFeedbackRow>>, AppError> {
    get_assessment(&state.db, assessment_id).await?;
    Ok(Json(load_feedback(&state.db, assessment_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::gap::MISSING_INDICATOR;

    fn full_answers(level: impl Fn(i32) -> AnswerInput) -> Vec<AnswerInput> {
        catalog::competencies().iter().map(|c| level(c.id)).collect()
    }

    fn survey(competency_id: i32, index: i64) -> AnswerInput {
        AnswerInput {
            competency_id,
            survey_index: Some(index),
            score: None,
        }
    }

    fn score(competency_id: i32, value: i64) -> AnswerInput {
        AnswerInput {
            competency_id,
            survey_index: None,
            score: Some(value),
        }
    }

    #[test]
    fn test_survey_indices_map_to_levels() {
        let scores = scores_from_answers(&full_answers(|id| survey(id, 3))).unwrap();
        assert_eq!(scores.len(), 16);
        assert!(scores.iter().all(|(_, l)| *l == CompetencyLevel::Apply));

        let scores = scores_from_answers(&full_answers(|id| survey(id, 4))).unwrap();
        assert!(scores.iter().all(|(_, l)| l.value() == 6));
    }

    #[test]
    fn test_direct_scores_accepted() {
        let scores = scores_from_answers(&full_answers(|id| score(id, 2))).unwrap();
        assert!(scores.iter().all(|(_, l)| *l == CompetencyLevel::Understand));
    }

    #[test]
    fn test_off_scale_values_rejected() {
        for bad in [score(1, 3), score(1, 5), score(1, 7), survey(1, 5), survey(1, -1)] {
            let mut answers = full_answers(|id| survey(id, 0));
            answers[0] = bad;
            assert!(matches!(
                scores_from_answers(&answers),
                Err(AppError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_answer_needs_exactly_one_value() {
        let mut answers = full_answers(|id| survey(id, 0));
        answers[0].score = Some(2);
        assert!(scores_from_answers(&answers).is_err());

        answers[0].score = None;
        answers[0].survey_index = None;
        assert!(scores_from_answers(&answers).is_err());
    }

    #[test]
    fn test_incomplete_or_duplicate_answers_rejected() {
        let mut answers = full_answers(|id| survey(id, 1));
        answers.pop();
        assert!(scores_from_answers(&answers).is_err());

        let mut answers = full_answers(|id| survey(id, 1));
        answers.push(survey(1, 2));
        assert!(scores_from_answers(&answers).is_err());

        let mut answers = full_answers(|id| survey(id, 1));
        answers.push(survey(99, 2));
        assert!(scores_from_answers(&answers).is_err());
    }

    #[test]
    fn test_empty_indicator_table_falls_back_to_catalog() {
        let lookup = indicator_lookup(vec![]);
        assert_ne!(lookup.text(1, CompetencyLevel::Apply), MISSING_INDICATOR);

        let lookup = indicator_lookup(vec![CompetencyIndicatorRow {
            competency_id: 1,
            level: 4,
            indicator: "custom".to_string(),
        }]);
        assert_eq!(lookup.text(1, CompetencyLevel::Apply), "custom");
        assert_eq!(lookup.text(2, CompetencyLevel::Apply), MISSING_INDICATOR);
    }

    #[test]
    fn test_profile_of_assessment() {
        let mut row = AssessmentRow {
            id: Uuid::nil(),
            organization_id: 1,
            user_id: None,
            user_name: Some("frank".to_string()),
            role_id: None,
            created_at: Utc::now(),
        };
        assert_eq!(
            profile_of(&row),
            Some(ProfileRef::Ephemeral {
                user_name: "frank".to_string()
            })
        );
        row.user_name = None;
        assert_eq!(profile_of(&row), None);
    }
}
