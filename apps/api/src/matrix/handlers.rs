//! Axum route handlers for organizations and their role matrices.

use std::collections::HashSet;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::catalog::{self, data::POLICY_MANAGER_ROLE_ID, Involvement};
use crate::errors::AppError;
use crate::matrix::projection::RoleProcessEntry;
use crate::matrix::store::{
    create_organization, get_role_competency_matrix, get_role_process_matrix,
    recompute_organization, require_organization, update_role_process_entries,
};
use crate::models::matrix::{RoleCompetencyRow, RoleProcessRow};
use crate::models::organization::OrganizationRow;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateOrganizationRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CreateOrganizationResponse {
    pub organization: OrganizationRow,
    pub template_organization_id: i32,
    pub copied_role_process_rows: u64,
    pub role_competency_rows: usize,
}

/// One edited cell of the role × process matrix. `involvement` is the stored
/// code (0–4).
#[derive(Debug, Clone, Deserialize)]
pub struct RoleProcessEdit {
    pub role_id: i32,
    pub process_id: i32,
    pub involvement: i16,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleProcessRequest {
    pub entries: Vec<RoleProcessEdit>,
}

#[derive(Debug, Serialize)]
pub struct RecomputeResponse {
    pub organization_id: i32,
    pub role_competency_rows: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

/// Validates edits against the catalog. Rejects unknown ids, invalid codes,
/// duplicated cells and the policy-designing code on any role other than the
/// Process & Policy Manager.
pub fn validate_edits(edits: &[RoleProcessEdit]) -> Result<Vec<RoleProcessEntry>, AppError> {
    if edits.is_empty() {
        return Err(AppError::Validation("entries cannot be empty".to_string()));
    }

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(edits.len());

    for edit in edits {
        if catalog::role(edit.role_id).is_none() {
            return Err(AppError::Validation(format!("Unknown role id {}", edit.role_id)));
        }
        if catalog::process_index(edit.process_id).is_none() {
            return Err(AppError::Validation(format!(
                "Unknown process id {}",
                edit.process_id
            )));
        }
        let involvement = Involvement::from_code(edit.involvement).ok_or_else(|| {
            AppError::Validation(format!(
                "Involvement {} is out of range (expected 0-4)",
                edit.involvement
            ))
        })?;
        if involvement == Involvement::PolicyDesigning && edit.role_id != POLICY_MANAGER_ROLE_ID {
            return Err(AppError::Validation(format!(
                "Involvement 3 is reserved for the Process and Policy Manager role (got role {})",
                edit.role_id
            )));
        }
        if !seen.insert((edit.role_id, edit.process_id)) {
            return Err(AppError::Validation(format!(
                "Duplicate entry for role {} / process {}",
                edit.role_id, edit.process_id
            )));
        }
        entries.push(RoleProcessEntry {
            role_id: edit.role_id,
            process_id: edit.process_id,
            involvement,
        });
    }

    Ok(entries)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/organizations
///
/// Creates an organization seeded from the configured template organization.
pub async fn handle_create_organization(
    State(state): State<AppState>,
    Json(request): Json<CreateOrganizationRequest>,
) -> Result<(StatusCode, Json<CreateOrganizationResponse>), AppError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }

    let template_organization_id = state.config.template_organization_id;
    let created = create_organization(&state.db, name, template_organization_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateOrganizationResponse {
            organization: created.organization,
            template_organization_id,
            copied_role_process_rows: created.copied_role_process_rows,
            role_competency_rows: created.role_competency_rows,
        }),
    ))
}

/// GET /api/v1/organizations/:org_id/role-process-matrix
pub async fn handle_get_role_process_matrix(
    State(state): State<AppState>,
    Path(organization_id): Path<i32>,
) -> Result<Json<Vec<RoleProcessRow>>, AppError> {
    let mut conn = state.db.acquire().await?;
    require_organization(&mut conn, organization_id).await?;
    Ok(Json(get_role_process_matrix(&state.db, organization_id).await?))
}

/// PUT /api/v1/organizations/:org_id/role-process-matrix
///
/// Applies edits and recomputes the whole derived matrix in one transaction.
pub async fn handle_update_role_process_matrix(
    State(state): State<AppState>,
    Path(organization_id): Path<i32>,
    Json(request): Json<UpdateRoleProcessRequest>,
) -> Result<Json<RecomputeResponse>, AppError> {
    let entries = validate_edits(&request.entries)?;
    let role_competency_rows =
        update_role_process_entries(&state.db, organization_id, &entries).await?;

    Ok(Json(RecomputeResponse {
        organization_id,
        role_competency_rows,
    }))
}

/// GET /api/v1/organizations/:org_id/role-competency-matrix
pub async fn handle_get_role_competency_matrix(
    State(state): State<AppState>,
    Path(organization_id): Path<i32>,
) -> Result<Json<Vec<RoleCompetencyRow>>, AppError> {
    let mut conn = state.db.acquire().await?;
    require_organization(&mut conn, organization_id).await?;
    Ok(Json(
        get_role_competency_matrix(&state.db, organization_id).await?,
    ))
}

/// POST /api/v1/organizations/:org_id/role-competency-matrix/recompute
pub async fn handle_recompute(
    State(state): State<AppState>,
    Path(organization_id): Path<i32>,
) -> Result<Json<RecomputeResponse>, AppError> {
    let role_competency_rows = recompute_organization(&state.db, organization_id).await?;
    Ok(Json(RecomputeResponse {
        organization_id,
        role_competency_rows,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(role_id: i32, process_id: i32, involvement: i16) -> RoleProcessEdit {
        RoleProcessEdit {
            role_id,
            process_id,
            involvement,
        }
    }

    #[test]
    fn test_valid_edits_convert_to_entries() {
        let entries = validate_edits(&[edit(5, 23, 2), edit(4, 20, 4)]).unwrap();
        assert_eq!(entries[0].involvement, Involvement::Responsible);
        assert_eq!(entries[1].involvement, Involvement::Designing);
    }

    #[test]
    fn test_out_of_range_involvement_rejected() {
        assert!(matches!(
            validate_edits(&[edit(5, 23, 5)]),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_edits(&[edit(5, 23, -1)]),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_policy_designing_reserved() {
        assert!(validate_edits(&[edit(POLICY_MANAGER_ROLE_ID, 1, 3)]).is_ok());
        assert!(matches!(
            validate_edits(&[edit(4, 1, 3)]),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_ids_rejected() {
        assert!(validate_edits(&[edit(99, 1, 1)]).is_err());
        assert!(validate_edits(&[edit(1, 99, 1)]).is_err());
    }

    #[test]
    fn test_duplicate_cells_rejected() {
        assert!(validate_edits(&[edit(1, 1, 1), edit(1, 1, 2)]).is_err());
    }

    #[test]
    fn test_empty_edits_rejected() {
        assert!(validate_edits(&[]).is_err());
    }
}
