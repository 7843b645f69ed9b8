//! Storage for individual profiles.
//!
//! Registered and ephemeral profiles live in separate tables with the same
//! shape; only the key column differs. A profile is always rewritten whole.

use sqlx::postgres::PgArguments;
use sqlx::query::{Query, QueryAs};
use sqlx::{PgConnection, PgPool, Postgres};

use crate::catalog::{self, CompetencyLevel, Involvement};
use crate::errors::AppError;
use crate::matrix::projection::dense_involvement;
use crate::matrix::store::dense_levels;
use crate::models::matrix::{ProfileCompetencyRow, ProfileProcessRow};
use crate::profiles::ProfileRef;

struct ProfileTables {
    process: &'static str,
    competency: &'static str,
    key_column: &'static str,
    key_type: &'static str,
}

fn tables(profile: &ProfileRef) -> ProfileTables {
    match profile {
        ProfileRef::Registered { .. } => ProfileTables {
            process: "user_process_matrix",
            competency: "user_competency_matrix",
            key_column: "user_id",
            key_type: "uuid",
        },
        ProfileRef::Ephemeral { .. } => ProfileTables {
            process: "unknown_role_process_matrix",
            competency: "unknown_role_competency_matrix",
            key_column: "user_name",
            key_type: "text",
        },
    }
}

fn bind_key<'q>(
    query: Query<'q, Postgres, PgArguments>,
    profile: &'q ProfileRef,
) -> Query<'q, Postgres, PgArguments> {
    match profile {
        ProfileRef::Registered { user_id } => query.bind(*user_id),
        ProfileRef::Ephemeral { user_name } => query.bind(user_name.as_str()),
    }
}

fn bind_key_as<'q, O>(
    query: QueryAs<'q, Postgres, O, PgArguments>,
    profile: &'q ProfileRef,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    match profile {
        ProfileRef::Registered { user_id } => query.bind(*user_id),
        ProfileRef::Ephemeral { user_name } => query.bind(user_name.as_str()),
    }
}

// A concurrent rewrite of the same profile cannot see our uncommitted rows
// in its DELETE; the upsert makes its insert wait and overwrite instead of
// failing on the primary key.
fn insert_process_sql(t: &ProfileTables) -> String {
    format!(
        r#"
        INSERT INTO {table} (organization_id, {key}, process_id, involvement)
        SELECT $1::int4, $2::{key_type}, process_id, involvement
        FROM UNNEST($3::int4[], $4::int2[]) AS t (process_id, involvement)
        ON CONFLICT (organization_id, {key}, process_id)
        DO UPDATE SET involvement = EXCLUDED.involvement
        "#,
        table = t.process,
        key = t.key_column,
        key_type = t.key_type
    )
}

fn insert_competency_sql(t: &ProfileTables) -> String {
    format!(
        r#"
        INSERT INTO {table} (organization_id, {key}, competency_id, required_level)
        SELECT $1::int4, $2::{key_type}, competency_id, required_level
        FROM UNNEST($3::int4[], $4::int2[]) AS t (competency_id, required_level)
        ON CONFLICT (organization_id, {key}, competency_id)
        DO UPDATE SET required_level = EXCLUDED.required_level
        "#,
        table = t.competency,
        key = t.key_column,
        key_type = t.key_type
    )
}

/// Replaces both halves of a profile. Runs on the caller's connection so the
/// rewrite can share a transaction with the projection that produced it.
pub async fn replace_profile(
    conn: &mut PgConnection,
    organization_id: i32,
    profile: &ProfileRef,
    involvement: &[Involvement],
    requirements: &[CompetencyLevel],
) -> Result<(), AppError> {
    let t = tables(profile);

    for table in [t.process, t.competency] {
        let sql = format!(
            "DELETE FROM {table} WHERE organization_id = $1 AND {} = $2",
            t.key_column
        );
        bind_key(sqlx::query(&sql).bind(organization_id), profile)
            .execute(&mut *conn)
            .await?;
    }

    let process_ids: Vec<i32> = catalog::process_areas().iter().map(|p| p.id).collect();
    let codes: Vec<i16> = (0..process_ids.len())
        .map(|idx| involvement.get(idx).copied().unwrap_or_default().code())
        .collect();

    let sql = insert_process_sql(&t);
    bind_key(sqlx::query(&sql).bind(organization_id), profile)
        .bind(&process_ids)
        .bind(&codes)
        .execute(&mut *conn)
        .await?;

    let competency_ids: Vec<i32> = catalog::competencies().iter().map(|c| c.id).collect();
    let levels: Vec<i16> = (0..competency_ids.len())
        .map(|idx| requirements.get(idx).copied().unwrap_or_default().value())
        .collect();

    let sql = insert_competency_sql(&t);
    bind_key(sqlx::query(&sql).bind(organization_id), profile)
        .bind(&competency_ids)
        .bind(&levels)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// The stored involvement vector, or `None` when the profile has never been
/// submitted.
pub async fn load_profile_involvement(
    pool: &PgPool,
    organization_id: i32,
    profile: &ProfileRef,
) -> Result<Option<Vec<Involvement>>, AppError> {
    let t = tables(profile);
    let sql = format!(
        "SELECT process_id, involvement FROM {} WHERE organization_id = $1 AND {} = $2",
        t.process, t.key_column
    );
    let rows = bind_key_as(
        sqlx::query_as::<_, ProfileProcessRow>(&sql).bind(organization_id),
        profile,
    )
    .fetch_all(pool)
    .await?;

    if rows.is_empty() {
        return Ok(None);
    }

    Ok(Some(dense_involvement(rows.into_iter().map(|r| {
        (
            r.process_id,
            Involvement::from_code(r.involvement).unwrap_or_default(),
        )
    }))))
}

/// The stored derived requirement vector, or `None` when absent.
pub async fn load_profile_requirements(
    pool: &PgPool,
    organization_id: i32,
    profile: &ProfileRef,
) -> Result<Option<Vec<CompetencyLevel>>, AppError> {
    let t = tables(profile);
    let sql = format!(
        "SELECT competency_id, required_level FROM {} WHERE organization_id = $1 AND {} = $2",
        t.competency, t.key_column
    );
    let rows = bind_key_as(
        sqlx::query_as::<_, ProfileCompetencyRow>(&sql).bind(organization_id),
        profile,
    )
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

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_variants_use_separate_tables() {
        let registered = tables(&ProfileRef::Registered {
            user_id: Uuid::nil(),
        });
        let ephemeral = tables(&ProfileRef::Ephemeral {
            user_name: "x".to_string(),
        });
        assert_eq!(registered.process, "user_process_matrix");
        assert_eq!(registered.key_type, "uuid");
        assert_eq!(ephemeral.competency, "unknown_role_competency_matrix");
        assert_eq!(ephemeral.key_column, "user_name");
    }

    #[test]
    fn test_profile_rewrites_upsert_on_primary_key() {
        let t = tables(&ProfileRef::Ephemeral {
            user_name: "x".to_string(),
        });
        let process = insert_process_sql(&t);
        assert!(process.contains("INSERT INTO unknown_role_process_matrix"));
        assert!(process.contains("ON CONFLICT (organization_id, user_name, process_id)"));
        assert!(process.contains("$2::text"));

        let t = tables(&ProfileRef::Registered {
            user_id: Uuid::nil(),
        });
        let competency = insert_competency_sql(&t);
        assert!(competency.contains("ON CONFLICT (organization_id, user_id, competency_id)"));
        assert!(competency.contains("DO UPDATE SET required_level = EXCLUDED.required_level"));
    }
}
