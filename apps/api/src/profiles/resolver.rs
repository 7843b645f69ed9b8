//! Unknown-profile resolver: turns an individual's process involvement into
//! competency requirements with the same projection the role matrix uses.

use std::collections::HashSet;

use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use crate::catalog::{self, CompetencyLevel, Involvement};
use crate::errors::AppError;
use crate::matrix::projection::{dense_involvement, project, ProcessCompetencyMatrix};
use crate::matrix::store::{load_process_competency_matrix, require_organization};
use crate::profiles::store::replace_profile;
use crate::profiles::ProfileRef;

/// One submitted `(process, involvement code)` pair.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessInvolvementInput {
    pub process_id: i32,
    pub involvement: i16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProfile {
    pub involvement: Vec<Involvement>,
    pub requirements: Vec<CompetencyLevel>,
}

/// Validates submitted involvement and densifies it in catalog order.
///
/// Processes that are not mentioned count as not performed. The
/// policy-designing code belongs to the Process & Policy Manager archetype
/// and is rejected for individuals.
pub fn involvement_from_input(entries: &[ProcessInvolvementInput]) -> Result<Vec<Involvement>, AppError> {
    let mut seen = HashSet::new();
    let mut sparse = Vec::with_capacity(entries.len());

    for entry in entries {
        if catalog::process_index(entry.process_id).is_none() {
            return Err(AppError::Validation(format!(
                "Unknown process id {}",
                entry.process_id
            )));
        }
        let involvement = match Involvement::from_code(entry.involvement) {
            Some(Involvement::PolicyDesigning) => {
                return Err(AppError::Validation(
                    "Involvement 3 is reserved for the Process and Policy Manager role; use 4 for designing"
                        .to_string(),
                ))
            }
            Some(involvement) => involvement,
            None => {
                return Err(AppError::Validation(format!(
                    "Involvement {} is out of range (expected 0, 1, 2 or 4)",
                    entry.involvement
                )))
            }
        };
        if !seen.insert(entry.process_id) {
            return Err(AppError::Validation(format!(
                "Duplicate entry for process {}",
                entry.process_id
            )));
        }
        sparse.push((entry.process_id, involvement));
    }

    Ok(dense_involvement(sparse))
}

pub fn resolve(involvement: Vec<Involvement>, matrix: &ProcessCompetencyMatrix) -> ResolvedProfile {
    let requirements = project(&involvement, matrix);
    ResolvedProfile {
        involvement,
        requirements,
    }
}

/// Projects and stores a profile in one transaction. Resubmitting replaces the
/// previous vectors for the same profile.
pub async fn resolve_and_store(
    pool: &PgPool,
    organization_id: i32,
    profile: &ProfileRef,
    involvement: Vec<Involvement>,
) -> Result<ResolvedProfile, AppError> {
    let mut tx = pool.begin().await?;

    require_organization(&mut tx, organization_id).await?;
    let matrix = load_process_competency_matrix(&mut tx).await?;
    let resolved = resolve(involvement, &matrix);
    replace_profile(
        &mut tx,
        organization_id,
        profile,
        &resolved.involvement,
        &resolved.requirements,
    )
    .await?;

    tx.commit().await?;

    let performing = resolved
        .involvement
        .iter()
        .filter(|i| i.is_performing())
        .count();
    info!("Stored profile for {profile} in organization {organization_id} ({performing} processes performed)");

    Ok(resolved)
}
