//! Axum route handler for role matching.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;

use crate::catalog::{self, CompetencyLevel, Involvement};
use crate::errors::AppError;
use crate::matching::matcher::{
    involvement_vector, level_vector, match_roles, MatchOutcome, MatchSpace, RoleVector,
};
use crate::matrix::projection::project;
use crate::matrix::store::{
    load_process_competency_matrix, load_role_involvement_profiles,
    load_role_requirement_profiles, require_organization,
};
use crate::profiles::resolver::{involvement_from_input, ProcessInvolvementInput};
use crate::profiles::store::{load_profile_involvement, load_profile_requirements};
use crate::profiles::ProfileRef;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    #[default]
    Process,
    Competency,
    Compare,
}

/// Either a stored profile or an inline involvement vector.
#[derive(Debug, Deserialize)]
pub struct RoleMatchRequest {
    #[serde(default)]
    pub profile: Option<ProfileRef>,
    #[serde(default)]
    pub involvement: Option<Vec<ProcessInvolvementInput>>,
    #[serde(default)]
    pub mode: MatchMode,
    /// Role proposed by the task classifier, reported next to the distance
    /// matches in compare mode.
    #[serde(default)]
    pub suggested_role_id: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct SuggestedRoleComparison {
    pub role_id: i32,
    pub role_name: &'static str,
    pub agrees_with_process_match: bool,
}

#[derive(Debug, Serialize)]
pub struct RoleMatchResponse {
    pub organization_id: i32,
    pub mode: MatchMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_match: Option<MatchOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competency_match: Option<MatchOutcome>,
    /// Compare mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_and_competency_agree: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_role: Option<SuggestedRoleComparison>,
}

enum UserSource {
    Stored(ProfileRef),
    Inline(Vec<Involvement>),
}

fn user_source(request: &RoleMatchRequest) -> Result<UserSource, AppError> {
    match (&request.profile, &request.involvement) {
        (Some(profile), None) => Ok(UserSource::Stored(profile.clone().normalized()?)),
        (None, Some(entries)) => Ok(UserSource::Inline(involvement_from_input(entries)?)),
        _ => Err(AppError::Validation(
            "Provide exactly one of 'profile' or 'involvement'".to_string(),
        )),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Vector loading
// ────────────────────────────────────────────────────────────────────────────

async fn user_involvement(pool: &PgPool, organization_id: i32, source: &UserSource) -> Result<Vec<Involvement>, AppError> {
    match source {
        UserSource::Inline(involvement) => Ok(involvement.clone()),
        UserSource::Stored(profile) => load_profile_involvement(pool, organization_id, profile)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No process involvement stored for {profile}"))),
    }
}

async fn user_requirements(
    pool: &PgPool,
    organization_id: i32,
    source: &UserSource,
) -> Result<Vec<CompetencyLevel>, AppError> {
    match source {
        UserSource::Inline(involvement) => {
            let mut conn = pool.acquire().await?;
            let matrix = load_process_competency_matrix(&mut conn).await?;
            Ok(project(involvement, &matrix))
        }
        UserSource::Stored(profile) => load_profile_requirements(pool, organization_id, profile)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No competency profile stored for {profile}"))),
    }
}

async fn match_in_process_space(
    pool: &PgPool,
    organization_id: i32,
    source: &UserSource,
) -> Result<MatchOutcome, AppError> {
    let user = involvement_vector(&user_involvement(pool, organization_id, source).await?);
    let roles: Vec<RoleVector> = load_role_involvement_profiles(pool, organization_id)
        .await?
        .iter()
        .map(|(role_id, involvement)| RoleVector::from_involvement(*role_id, involvement))
        .collect();
    Ok(match_roles(&user, &roles, MatchSpace::Process))
}

async fn match_in_competency_space(
    pool: &PgPool,
    organization_id: i32,
    source: &UserSource,
) -> Result<MatchOutcome, AppError> {
    let user = level_vector(&user_requirements(pool, organization_id, source).await?);
    let roles: Vec<RoleVector> = load_role_requirement_profiles(pool, organization_id)
        .await?
        .iter()
        .map(|(role_id, levels)| RoleVector::from_levels(*role_id, levels))
        .collect();
    Ok(match_roles(&user, &roles, MatchSpace::Competency))
}

fn log_outcome(organization_id: i32, outcome: &MatchOutcome) {
    match outcome {
        MatchOutcome::Matched(m) => info!(
            "Role match in organization {organization_id} ({:?} space): {} (confidence {:.2}, {} metrics agree)",
            m.space, m.selected.role_name, m.confidence, m.metric_agreement
        ),
        MatchOutcome::NoRolesAvailable => {
            info!("Role match in organization {organization_id}: no roles available")
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handler
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/organizations/:org_id/role-match
///
/// `process` (default) compares raw involvement; `competency` compares
/// derived requirements; `compare` runs both and reports whether they agree,
/// together with a classifier-suggested role if one is given.
pub async fn handle_role_match(
    State(state): State<AppState>,
    Path(organization_id): Path<i32>,
    Json(request): Json<RoleMatchRequest>,
) -> Result<Json<RoleMatchResponse>, AppError> {
    let source = user_source(&request)?;
    let suggested = match request.suggested_role_id {
        Some(role_id) => Some(catalog::role(role_id).ok_or_else(|| {
            AppError::Validation(format!("Unknown suggested role id {role_id}"))
        })?),
        None => None,
    };

    {
        let mut conn = state.db.acquire().await?;
        require_organization(&mut conn, organization_id).await?;
    }

    let process_match = match request.mode {
        MatchMode::Process | MatchMode::Compare => {
            Some(match_in_process_space(&state.db, organization_id, &source).await?)
        }
        MatchMode::Competency => None,
    };
    let competency_match = match request.mode {
        MatchMode::Competency | MatchMode::Compare => {
            Some(match_in_competency_space(&state.db, organization_id, &source).await?)
        }
        MatchMode::Process => None,
    };

    for outcome in process_match.iter().chain(competency_match.iter()) {
        log_outcome(organization_id, outcome);
    }

    let compare = request.mode == MatchMode::Compare;
    let process_role = process_match.as_ref().and_then(MatchOutcome::selected_role_id);

    let process_and_competency_agree = if compare {
        let competency_role = competency_match
            .as_ref()
            .and_then(MatchOutcome::selected_role_id);
        Some(process_role.is_some() && process_role == competency_role)
    } else {
        None
    };

    let suggested_role = suggested.filter(|_| compare).map(|role| SuggestedRoleComparison {
        role_id: role.id,
        role_name: role.name,
        agrees_with_process_match: process_role == Some(role.id),
    });

    Ok(Json(RoleMatchResponse {
        organization_id,
        mode: request.mode,
        process_match,
        competency_match,
        process_and_competency_agree,
        suggested_role,
    }))
}
