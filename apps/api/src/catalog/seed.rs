//! Idempotent startup seeding of reference data and the template organization.
//!
//! Existing rows are never overwritten, so admin edits to the template
//! organization survive restarts.

use sqlx::{PgConnection, PgPool};
use tracing::info;

use crate::catalog::{self, data, CompetencyLevel};
use crate::errors::AppError;
use crate::matrix::projection::default_role_process_entries;
use crate::matrix::store::{lock_organization, recompute_role_competency_matrix};

const TEMPLATE_ORGANIZATION_NAME: &str = "Template Organization";

pub async fn seed_reference_data(pool: &PgPool, template_organization_id: i32) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    seed_process_areas(&mut tx).await?;
    seed_competencies(&mut tx).await?;
    seed_role_archetypes(&mut tx).await?;
    seed_indicators(&mut tx).await?;
    seed_process_competency_matrix(&mut tx).await?;
    seed_template_organization(&mut tx, template_organization_id).await?;
    lock_organization(&mut tx, template_organization_id).await?;
    recompute_role_competency_matrix(&mut tx, template_organization_id).await?;

    tx.commit().await?;
    info!("Reference data seeded (template organization {template_organization_id})");
    Ok(())
}

async fn seed_process_areas(conn: &mut PgConnection) -> Result<(), AppError> {
    let areas = catalog::process_areas();
    let ids: Vec<i32> = areas.iter().map(|p| p.id).collect();
    let names: Vec<String> = areas.iter().map(|p| p.name.to_string()).collect();
    let groups: Vec<String> = areas.iter().map(|p| p.group.as_str().to_string()).collect();

    sqlx::query(
        r#"
        INSERT INTO process_areas (id, name, lifecycle_group)
        SELECT * FROM UNNEST($1::int4[], $2::text[], $3::text[])
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(&ids)
    .bind(&names)
    .bind(&groups)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn seed_competencies(conn: &mut PgConnection) -> Result<(), AppError> {
    let competencies = catalog::competencies();
    let ids: Vec<i32> = competencies.iter().map(|c| c.id).collect();
    let names: Vec<String> = competencies.iter().map(|c| c.name.to_string()).collect();
    let areas: Vec<String> = competencies.iter().map(|c| c.area.as_str().to_string()).collect();

    sqlx::query(
        r#"
        INSERT INTO competencies (id, name, area)
        SELECT * FROM UNNEST($1::int4[], $2::text[], $3::text[])
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(&ids)
    .bind(&names)
    .bind(&areas)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn seed_role_archetypes(conn: &mut PgConnection) -> Result<(), AppError> {
    let roles = catalog::role_archetypes();
    let ids: Vec<i32> = roles.iter().map(|r| r.id).collect();
    let names: Vec<String> = roles.iter().map(|r| r.name.to_string()).collect();
    let descriptions: Vec<String> = roles.iter().map(|r| r.description.to_string()).collect();

    sqlx::query(
        r#"
        INSERT INTO role_archetypes (id, name, description)
        SELECT * FROM UNNEST($1::int4[], $2::text[], $3::text[])
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(&ids)
    .bind(&names)
    .bind(&descriptions)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn seed_indicators(conn: &mut PgConnection) -> Result<(), AppError> {
    let mut competency_ids = Vec::new();
    let mut levels = Vec::new();
    let mut texts = Vec::new();

    for competency in catalog::competencies() {
        for level in CompetencyLevel::ALL {
            if let Some(text) = data::indicator_text(competency, level) {
                competency_ids.push(competency.id);
                levels.push(level.value());
                texts.push(text);
            }
        }
    }

    sqlx::query(
        r#"
        INSERT INTO competency_indicators (competency_id, level, indicator)
        SELECT * FROM UNNEST($1::int4[], $2::int2[], $3::text[])
        ON CONFLICT (competency_id, level) DO NOTHING
        "#,
    )
    .bind(&competency_ids)
    .bind(&levels)
    .bind(&texts)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn seed_process_competency_matrix(conn: &mut PgConnection) -> Result<(), AppError> {
    let mut process_ids = Vec::new();
    let mut competency_ids = Vec::new();
    let mut weights = Vec::new();

    for (process, row) in catalog::process_areas()
        .iter()
        .zip(data::PROCESS_COMPETENCY_WEIGHTS.iter())
    {
        for (competency, &weight) in catalog::competencies().iter().zip(row.iter()) {
            process_ids.push(process.id);
            competency_ids.push(competency.id);
            weights.push(i16::from(weight));
        }
    }

    sqlx::query(
        r#"
        INSERT INTO process_competency_matrix (process_id, competency_id, weight)
        SELECT * FROM UNNEST($1::int4[], $2::int4[], $3::int2[])
        ON CONFLICT (process_id, competency_id) DO NOTHING
        "#,
    )
    .bind(&process_ids)
    .bind(&competency_ids)
    .bind(&weights)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn seed_template_organization(
    conn: &mut PgConnection,
    template_organization_id: i32,
) -> Result<(), AppError> {
    sqlx::query("INSERT INTO organizations (id, name) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING")
        .bind(template_organization_id)
        .bind(TEMPLATE_ORGANIZATION_NAME)
        .execute(&mut *conn)
        .await?;

    // Explicit ids bypass the serial; keep it ahead of them.
    sqlx::query(
        r#"
        SELECT setval(
            pg_get_serial_sequence('organizations', 'id'),
            GREATEST((SELECT MAX(id) FROM organizations), 1)
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    let entries = default_role_process_entries();
    let role_ids: Vec<i32> = entries.iter().map(|e| e.role_id).collect();
    let process_ids: Vec<i32> = entries.iter().map(|e| e.process_id).collect();
    let codes: Vec<i16> = entries.iter().map(|e| e.involvement.code()).collect();

    let inserted = sqlx::query(
        r#"
        INSERT INTO role_process_matrix (organization_id, role_id, process_id, involvement)
        SELECT $1::int4, role_id, process_id, involvement
        FROM UNNEST($2::int4[], $3::int4[], $4::int2[])
            AS t (role_id, process_id, involvement)
        ON CONFLICT (organization_id, role_id, process_id) DO NOTHING
        "#,
    )
    .bind(template_organization_id)
    .bind(&role_ids)
    .bind(&process_ids)
    .bind(&codes)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    if inserted > 0 {
        info!("Seeded {inserted} default role-process rows into template organization {template_organization_id}");
    }
    Ok(())
}
