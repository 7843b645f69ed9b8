//! Per-organization role profile storage.
//!
//! The role × competency matrix is derived: every write path ends in a full
//! delete-and-reinsert for the organization inside the caller's transaction,
//! so readers see either the old matrix or the new one. Writers take the
//! organization row lock first, so concurrent edits queue instead of
//! colliding on the reinsert.

use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};

use crate::catalog::{self, CompetencyLevel, Involvement, ProcessWeight};
use crate::errors::AppError;
use crate::matrix::projection::{
    dense_involvement, materialize_role_competencies, ProcessCompetencyMatrix, RoleProcessEntry,
};
use crate::models::matrix::{ProcessCompetencyRow, RoleCompetencyRow, RoleProcessRow};
use crate::models::organization::OrganizationRow;

/// Loads the global process × competency weights.
pub async fn load_process_competency_matrix(
    conn: &mut PgConnection,
) -> Result<ProcessCompetencyMatrix, AppError> {
    let rows = sqlx::query_as::<_, ProcessCompetencyRow>(
        "SELECT process_id, competency_id, weight FROM process_competency_matrix",
    )
    .fetch_all(&mut *conn)
    .await?;

    if rows.is_empty() {
        warn!("process_competency_matrix is empty; every projection will be zero");
    }

    let entries: Vec<(i32, i32, ProcessWeight)> = rows
        .into_iter()
        .map(|r| {
            (
                r.process_id,
                r.competency_id,
                ProcessWeight::from_code(r.weight).unwrap_or_default(),
            )
        })
        .collect();

    Ok(ProcessCompetencyMatrix::from_entries(&entries))
}

async fn load_role_process_entries(
    conn: &mut PgConnection,
    organization_id: i32,
) -> Result<Vec<RoleProcessEntry>, AppError> {
    let rows = sqlx::query_as::<_, RoleProcessRow>(
        r#"
        SELECT organization_id, role_id, process_id, involvement
        FROM role_process_matrix
        WHERE organization_id = $1
        ORDER BY role_id, process_id
        "#,
    )
    .bind(organization_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| RoleProcessEntry {
            role_id: r.role_id,
            process_id: r.process_id,
            involvement: Involvement::from_code(r.involvement).unwrap_or_default(),
        })
        .collect())
}

/// Recomputes the whole role × competency matrix for one organization.
/// Must run inside a transaction holding `lock_organization` (or on an
/// organization not yet committed); returns the number of rows written.
pub async fn recompute_role_competency_matrix(
    conn: &mut PgConnection,
    organization_id: i32,
) -> Result<usize, AppError> {
    let matrix = load_process_competency_matrix(conn).await?;
    let entries = load_role_process_entries(conn, organization_id).await?;
    let derived = materialize_role_competencies(&entries, &matrix);

    sqlx::query("DELETE FROM role_competency_matrix WHERE organization_id = $1")
        .bind(organization_id)
        .execute(&mut *conn)
        .await?;

    let role_ids: Vec<i32> = derived.iter().map(|e| e.role_id).collect();
    let competency_ids: Vec<i32> = derived.iter().map(|e| e.competency_id).collect();
    let levels: Vec<i16> = derived.iter().map(|e| e.required_level.value()).collect();

    sqlx::query(
        r#"
        INSERT INTO role_competency_matrix
            (organization_id, role_id, competency_id, required_level)
        SELECT $1::int4, role_id, competency_id, required_level
        FROM UNNEST($2::int4[], $3::int4[], $4::int2[])
            AS t (role_id, competency_id, required_level)
        "#,
    )
    .bind(organization_id)
    .bind(&role_ids)
    .bind(&competency_ids)
    .bind(&levels)
    .execute(&mut *conn)
    .await?;

    info!(
        "Recomputed role competency matrix for organization {organization_id}: {} rows",
        derived.len()
    );
    Ok(derived.len())
}

/// Recomputes one organization's derived matrix in its own transaction.
pub async fn recompute_organization(pool: &PgPool, organization_id: i32) -> Result<usize, AppError> {
    let mut tx = pool.begin().await?;
    lock_organization(&mut tx, organization_id).await?;
    let written = recompute_role_competency_matrix(&mut tx, organization_id).await?;
    tx.commit().await?;
    Ok(written)
}

pub async fn require_organization(
    conn: &mut PgConnection,
    organization_id: i32,
) -> Result<OrganizationRow, AppError> {
    sqlx::query_as::<_, OrganizationRow>("SELECT * FROM organizations WHERE id = $1")
        .bind(organization_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Organization {organization_id} not found")))
}

const LOCK_ORGANIZATION_SQL: &str = "SELECT * FROM organizations WHERE id = $1 FOR UPDATE";

/// Like `require_organization`, but holds the row lock until the transaction
/// ends. Taken before any rewrite of the organization's matrices.
pub async fn lock_organization(
    conn: &mut PgConnection,
    organization_id: i32,
) -> Result<OrganizationRow, AppError> {
    sqlx::query_as::<_, OrganizationRow>(LOCK_ORGANIZATION_SQL)
        .bind(organization_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Organization {organization_id} not found")))
}

/// Result of creating an organization from the template.
pub struct CreatedOrganization {
    pub organization: OrganizationRow,
    pub copied_role_process_rows: u64,
    pub role_competency_rows: usize,
}

/// Creates an organization, copies the template organization's role × process
/// matrix and materializes the derived matrix, all in one transaction.
pub async fn create_organization(
    pool: &PgPool,
    name: &str,
    template_organization_id: i32,
) -> Result<CreatedOrganization, AppError> {
    let mut tx = pool.begin().await?;

    require_organization(&mut tx, template_organization_id).await?;

    let organization = sqlx::query_as::<_, OrganizationRow>(
        "INSERT INTO organizations (name) VALUES ($1) RETURNING *",
    )
    .bind(name)
    .fetch_one(&mut *tx)
    .await?;

    let copied = sqlx::query(
        r#"
        INSERT INTO role_process_matrix (organization_id, role_id, process_id, involvement)
        SELECT $1::int4, role_id, process_id, involvement
        FROM role_process_matrix
        WHERE organization_id = $2
        "#,
    )
    .bind(organization.id)
    .bind(template_organization_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if copied == 0 {
        warn!(
            "Template organization {template_organization_id} has no role rows; organization {} starts empty",
            organization.id
        );
    }

    let role_competency_rows = recompute_role_competency_matrix(&mut tx, organization.id).await?;
    tx.commit().await?;

    info!(
        "Created organization {} ('{}') from template {template_organization_id}: {copied} role-process rows",
        organization.id, organization.name
    );

    Ok(CreatedOrganization {
        organization,
        copied_role_process_rows: copied,
        role_competency_rows,
    })
}

/// Upserts edited role × process rows and recomputes the organization's
/// derived matrix in the same transaction.
pub async fn update_role_process_entries(
    pool: &PgPool,
    organization_id: i32,
    entries: &[RoleProcessEntry],
) -> Result<usize, AppError> {
    let mut tx = pool.begin().await?;
    lock_organization(&mut tx, organization_id).await?;
    upsert_role_process_entries(&mut tx, organization_id, entries).await?;
    let written = recompute_role_competency_matrix(&mut tx, organization_id).await?;
    tx.commit().await?;

    info!(
        "Updated {} role-process rows for organization {organization_id}",
        entries.len()
    );
    Ok(written)
}

/// Writes role × process rows, replacing existing values. Does not recompute.
pub async fn upsert_role_process_entries(
    conn: &mut PgConnection,
    organization_id: i32,
    entries: &[RoleProcessEntry],
) -> Result<u64, AppError> {
    let role_ids: Vec<i32> = entries.iter().map(|e| e.role_id).collect();
    let process_ids: Vec<i32> = entries.iter().map(|e| e.process_id).collect();
    let codes: Vec<i16> = entries.iter().map(|e| e.involvement.code()).collect();

    let result = sqlx::query(
        r#"
        INSERT INTO role_process_matrix (organization_id, role_id, process_id, involvement)
        SELECT $1::int4, role_id, process_id, involvement
        FROM UNNEST($2::int4[], $3::int4[], $4::int2[])
            AS t (role_id, process_id, involvement)
        ON CONFLICT (organization_id, role_id, process_id)
        DO UPDATE SET involvement = EXCLUDED.involvement
        "#,
    )
    .bind(organization_id)
    .bind(&role_ids)
    .bind(&process_ids)
    .bind(&codes)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

pub async fn get_role_process_matrix(
    pool: &PgPool,
    organization_id: i32,
) -> Result<Vec<RoleProcessRow>, AppError> {
    Ok(sqlx::query_as::<_, RoleProcessRow>(
        r#"
        SELECT organization_id, role_id, process_id, involvement
        FROM role_process_matrix
        WHERE organization_id = $1
        ORDER BY role_id, process_id
        "#,
    )
    .bind(organization_id)
    .fetch_all(pool)
    .await?)
}

pub async fn get_role_competency_matrix(
    pool: &PgPool,
    organization_id: i32,
) -> Result<Vec<RoleCompetencyRow>, AppError> {
    Ok(sqlx::query_as::<_, RoleCompetencyRow>(
        r#"
        SELECT organization_id, role_id, competency_id, required_level
        FROM role_competency_matrix
        WHERE organization_id = $1
        ORDER BY role_id, competency_id
        "#,
    )
    .bind(organization_id)
    .fetch_all(pool)
    .await?)
}

/// Each role's involvement vector (catalog order) for one organization.
pub async fn load_role_involvement_profiles(
    pool: &PgPool,
    organization_id: i32,
) -> Result<Vec<(i32, Vec<Involvement>)>, AppError> {
    let mut conn = pool.acquire().await?;
    let entries = load_role_process_entries(&mut conn, organization_id).await?;

    let mut profiles: Vec<(i32, Vec<(i32, Involvement)>)> = Vec::new();
    for entry in entries {
        match profiles.last_mut() {
            Some((role_id, sparse)) if *role_id == entry.role_id => {
                sparse.push((entry.process_id, entry.involvement))
            }
            _ => profiles.push((entry.role_id, vec![(entry.process_id, entry.involvement)])),
        }
    }

    Ok(profiles
        .into_iter()
        .map(|(role_id, sparse)| (role_id, dense_involvement(sparse)))
        .collect())
}

/// Each role's derived requirement vector (catalog order) for one organization.
pub async fn load_role_requirement_profiles(
    pool: &PgPool,
    organization_id: i32,
) -> Result<Vec<(i32, Vec<CompetencyLevel>)>, AppError> {
    let rows = get_role_competency_matrix(pool, organization_id).await?;

    let mut profiles: Vec<(i32, Vec<(i32, CompetencyLevel)>)> = Vec::new();
    for row in rows {
        let level = CompetencyLevel::from_value(row.required_level).unwrap_or_default();
        match profiles.last_mut() {
            Some((role_id, sparse)) if *role_id == row.role_id => {
                sparse.push((row.competency_id, level))
            }
            _ => profiles.push((row.role_id, vec![(row.competency_id, level)])),
        }
    }

    Ok(profiles
        .into_iter()
        .map(|(role_id, sparse)| (role_id, dense_levels(sparse)))
        .collect())
}

/// Requirement vector of a single role, or `None` when the organization has
/// no derived rows for it.
pub async fn load_role_requirements(
    pool: &PgPool,
    organization_id: i32,
    role_id: i32,
) -> Result<Option<Vec<CompetencyLevel>>, AppError> {
    let rows = sqlx::query_as::<_, RoleCompetencyRow>(
        r#"
        SELECT organization_id, role_id, competency_id, required_level
        FROM role_competency_matrix
        WHERE organization_id = $1 AND role_id = $2
        "#,
    )
    .bind(organization_id)
    .bind(role_id)
    .fetch_all(pool)
    .await?;

    if rows.is_empty() {
        return Ok(None);
    }

    Ok(Some(dense_levels(rows.into_iter().map(|r| {
        (
            r.competency_id,
            CompetencyLevel::from_value(r.required_level).unwrap_or_default(),
        )
    }))))
}

/// Dense competency vector in catalog order; absent competencies are `Unaware`.
pub fn dense_levels<I>(entries: I) -> Vec<CompetencyLevel>
where
    I: IntoIterator<Item = (i32, CompetencyLevel)>,
{
    let mut vector = vec![CompetencyLevel::Unaware; catalog::competencies().len()];
    for (competency_id, level) in entries {
        match catalog::competency_index(competency_id) {
            Some(idx) => vector[idx] = level,
            None => warn!("Ignoring level for unknown competency id {competency_id}"),
        }
    }
    vector
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_levels_pads_missing_competencies() {
        let vector = dense_levels([(2, CompetencyLevel::Apply), (16, CompetencyLevel::Master)]);
        assert_eq!(vector.len(), 16);
        assert_eq!(vector[1], CompetencyLevel::Apply);
        assert_eq!(vector[15], CompetencyLevel::Master);
        assert_eq!(vector[0], CompetencyLevel::Unaware);
    }

    #[test]
    fn test_matrix_writers_lock_the_organization_row() {
        assert!(LOCK_ORGANIZATION_SQL.ends_with("FOR UPDATE"));
        assert!(LOCK_ORGANIZATION_SQL.contains("organizations WHERE id = $1"));
    }

    #[test]
    fn test_dense_levels_ignores_unknown_ids() {
        let vector = dense_levels([(42, CompetencyLevel::Master)]);
        assert!(vector.iter().all(|&l| l == CompetencyLevel::Unaware));
    }
}
