//! Axum route handlers for individual profiles.

use axum::{
    extract::{Path, State},
    Json,
};
use std::future::Future;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::warn;

use crate::catalog::{self, CompetencyLevel, Involvement};
use crate::classification::{
    classify_with_deadline, ClassifiedTasks, KeywordTaskClassifier, SuggestedRole, TaskClassifier,
    TaskDescriptions,
};
use crate::errors::AppError;
use crate::matrix::store::require_organization;
use crate::profiles::resolver::{
    involvement_from_input, resolve_and_store, ProcessInvolvementInput, ResolvedProfile,
};
use crate::profiles::ProfileRef;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ProcessInvolvementRequest {
    pub profile: ProfileRef,
    pub involvement: Vec<ProcessInvolvementInput>,
}

#[derive(Debug, Deserialize)]
pub struct ClassifyTasksRequest {
    pub profile: ProfileRef,
    pub tasks: TaskDescriptions,
    /// Use the keyword classifier when the LLM classifier fails.
    #[serde(default)]
    pub fallback_to_keywords: bool,
}

#[derive(Debug, Serialize)]
pub struct ProcessInvolvementView {
    pub process_id: i32,
    pub process_name: &'static str,
    pub involvement: Involvement,
}

#[derive(Debug, Serialize)]
pub struct CompetencyRequirementView {
    pub competency_id: i32,
    pub competency_name: &'static str,
    pub required_level: CompetencyLevel,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub organization_id: i32,
    pub profile: ProfileRef,
    /// Performed processes only; everything else is not performed.
    pub involvement: Vec<ProcessInvolvementView>,
    pub requirements: Vec<CompetencyRequirementView>,
}

#[derive(Debug, Serialize)]
pub struct ClassifyTasksResponse {
    #[serde(flatten)]
    pub stored: ProfileResponse,
    pub classifier_backend: String,
    pub fell_back_to_keywords: bool,
    pub suggested_role: Option<SuggestedRole>,
}

fn profile_response(
    organization_id: i32,
    profile: ProfileRef,
    resolved: &ResolvedProfile,
) -> ProfileResponse {
    let involvement = catalog::process_areas()
        .iter()
        .zip(resolved.involvement.iter())
        .filter(|(_, inv)| inv.is_performing())
        .map(|(process, &involvement)| ProcessInvolvementView {
            process_id: process.id,
            process_name: process.name,
            involvement,
        })
        .collect();

    let requirements = catalog::competencies()
        .iter()
        .zip(resolved.requirements.iter())
        .map(|(competency, &required_level)| CompetencyRequirementView {
            competency_id: competency.id,
            competency_name: competency.name,
            required_level,
        })
        .collect();

    ProfileResponse {
        organization_id,
        profile,
        involvement,
        requirements,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// PUT /api/v1/organizations/:org_id/profiles/process-involvement
///
/// Stores an individual's process involvement and its derived competency
/// requirements. Resubmission replaces both.
pub async fn handle_put_process_involvement(
    State(state): State<AppState>,
    Path(organization_id): Path<i32>,
    Json(request): Json<ProcessInvolvementRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = request.profile.normalized()?;
    let involvement = involvement_from_input(&request.involvement)?;

    let resolved = resolve_and_store(&state.db, organization_id, &profile, involvement).await?;
    Ok(Json(profile_response(organization_id, profile, &resolved)))
}

/// POST /api/v1/organizations/:org_id/profiles/classify-tasks
///
/// Classifies task descriptions into process involvement, then stores the
/// profile exactly like the process-involvement route.
pub async fn handle_classify_tasks(
    State(state): State<AppState>,
    Path(organization_id): Path<i32>,
    Json(request): Json<ClassifyTasksRequest>,
) -> Result<Json<ClassifyTasksResponse>, AppError> {
    let profile = request.profile.normalized()?;
    let tasks = request.tasks.cleaned()?;

    let (classified, fell_back_to_keywords) = classify_for_organization(
        check_organization(&state.db, organization_id),
        state.task_classifier.as_ref(),
        &tasks,
        state.config.llm_timeout,
        request.fallback_to_keywords,
    )
    .await?;

    let resolved =
        resolve_and_store(&state.db, organization_id, &profile, classified.involvement).await?;

    Ok(Json(ClassifyTasksResponse {
        stored: profile_response(organization_id, profile, &resolved),
        classifier_backend: classified.classifier_backend,
        fell_back_to_keywords,
        suggested_role: classified.suggested_role,
    }))
}

async fn check_organization(pool: &PgPool, organization_id: i32) -> Result<(), AppError> {
    let mut conn = pool.acquire().await?;
    require_organization(&mut conn, organization_id).await?;
    Ok(())
}

/// Unknown organizations fail before any classifier call is made.
async fn classify_for_organization(
    organization_check: impl Future<Output = Result<(), AppError>>,
    classifier: &dyn TaskClassifier,
    tasks: &TaskDescriptions,
    deadline: std::time::Duration,
    fallback_to_keywords: bool,
) -> Result<(ClassifiedTasks, bool), AppError> {
    organization_check.await?;
    classify(classifier, tasks, deadline, fallback_to_keywords).await
}

/// Runs the configured classifier; on failure, uses the keyword classifier
/// only when the caller asked for it.
async fn classify(
    classifier: &dyn TaskClassifier,
    tasks: &TaskDescriptions,
    deadline: std::time::Duration,
    fallback_to_keywords: bool,
) -> Result<(ClassifiedTasks, bool), AppError> {
    match classify_with_deadline(classifier, tasks, deadline).await {
        Ok(classified) => Ok((classified, false)),
        Err(e) if fallback_to_keywords => {
            warn!("Task classifier failed, falling back to keywords: {e}");
            Ok((KeywordTaskClassifier.classify(tasks).await?, true))
        }
        Err(e) => Err(e),
    }
}
