//! Assessment persistence. Results are append-only; feedback is replaced as
//! a whole on regeneration.

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::catalog::CompetencyLevel;
use crate::errors::AppError;
use crate::matrix::store::require_organization;
use crate::models::assessment::{
    AssessmentFeedbackRow, AssessmentResultRow, AssessmentRow, CompetencyIndicatorRow,
};
use crate::profiles::ProfileRef;

/// Inserts an assessment and its results in one transaction.
pub async fn create_assessment(
    pool: &PgPool,
    organization_id: i32,
    profile: &ProfileRef,
    role_id: Option<i32>,
    scores: &[(i32, CompetencyLevel)],
) -> Result<AssessmentRow, AppError> {
    let mut tx = pool.begin().await?;

    require_organization(&mut tx, organization_id).await?;

    let assessment = sqlx::query_as::<_, AssessmentRow>(
        r#"
        INSERT INTO assessments (id, organization_id, user_id, user_name, role_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, organization_id, user_id, user_name, role_id, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(organization_id)
    .bind(profile.user_id())
    .bind(profile.user_name())
    .bind(role_id)
    .fetch_one(&mut *tx)
    .await?;

    let competency_ids: Vec<i32> = scores.iter().map(|(id, _)| *id).collect();
    let values: Vec<i16> = scores.iter().map(|(_, level)| level.value()).collect();

    sqlx::query(
        r#"
        INSERT INTO assessment_results (assessment_id, competency_id, score)
        SELECT $1::uuid, competency_id, score
        FROM UNNEST($2::int4[], $3::int2[]) AS t (competency_id, score)
        "#,
    )
    .bind(assessment.id)
    .bind(&competency_ids)
    .bind(&values)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(assessment)
}

pub async fn get_assessment(pool: &PgPool, assessment_id: Uuid) -> Result<AssessmentRow, AppError> {
    sqlx::query_as::<_, AssessmentRow>(
        r#"
        SELECT id, organization_id, user_id, user_name, role_id, created_at
        FROM assessments
        WHERE id = $1
        "#,
    )
    .bind(assessment_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Assessment {assessment_id} not found")))
}

pub async fn load_results(
    pool: &PgPool,
    assessment_id: Uuid,
) -> Result<Vec<AssessmentResultRow>, AppError> {
    Ok(sqlx::query_as::<_, AssessmentResultRow>(
        r#"
        SELECT assessment_id, competency_id, score
        FROM assessment_results
        WHERE assessment_id = $1
        ORDER BY competency_id
        "#,
    )
    .bind(assessment_id)
    .fetch_all(pool)
    .await?)
}

pub async fn load_indicators(pool: &PgPool) -> Result<Vec<CompetencyIndicatorRow>, AppError> {
    Ok(sqlx::query_as::<_, CompetencyIndicatorRow>(
        "SELECT competency_id, level, indicator FROM competency_indicators",
    )
    .fetch_all(pool)
    .await?)
}

const LOCK_ASSESSMENT_SQL: &str = "SELECT id FROM assessments WHERE id = $1 FOR UPDATE";

/// Replaces all stored feedback of an assessment with `entries`
/// (`(competency area, feedback document)`).
pub async fn replace_feedback(
    pool: &PgPool,
    assessment_id: Uuid,
    entries: Vec<(String, Value)>,
) -> Result<Vec<AssessmentFeedbackRow>, AppError> {
    let mut tx = pool.begin().await?;

    // concurrent regenerations of one assessment queue here
    sqlx::query(LOCK_ASSESSMENT_SQL)
        .bind(assessment_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Assessment {assessment_id} not found")))?;

    sqlx::query("DELETE FROM assessment_feedback WHERE assessment_id = $1")
        .bind(assessment_id)
        .execute(&mut *tx)
        .await?;

    let (areas, documents): (Vec<String>, Vec<Value>) = entries.into_iter().unzip();

    let rows = sqlx::query_as::<_, AssessmentFeedbackRow>(
        r#"
        INSERT INTO assessment_feedback (assessment_id, competency_area, feedback)
        SELECT $1::uuid, competency_area, feedback
        FROM UNNEST($2::text[], $3::jsonb[]) AS t (competency_area, feedback)
        RETURNING assessment_id, competency_area, feedback, generated_at
        "#,
    )
    .bind(assessment_id)
    .bind(&areas)
    .bind(&documents)
    .fetch_all(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(rows)
}

pub async fn load_feedback(
    pool: &PgPool,
    assessment_id: Uuid,
) -> Result<Vec<AssessmentFeedbackRow>, AppError> {
    Ok(sqlx::query_as::<_, AssessmentFeedbackRow>(
        r#"
        SELECT assessment_id, competency_area, feedback, generated_at
        FROM assessment_feedback
        WHERE assessment_id = $1
        ORDER BY competency_area
        "#,
    )
    .bind(assessment_id)
    .fetch_all(pool)
    .await?)
}
