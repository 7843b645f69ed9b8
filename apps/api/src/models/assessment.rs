use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssessmentRow {
    pub id: Uuid,
    pub organization_id: i32,
    pub user_id: Option<Uuid>,
    pub user_name: Option<String>,
    pub role_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssessmentResultRow {
    pub assessment_id: Uuid,
    pub competency_id: i32,
    pub score: i16,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CompetencyIndicatorRow {
    pub competency_id: i32,
    pub level: i16,
    pub indicator: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssessmentFeedbackRow {
    pub assessment_id: Uuid,
    pub competency_area: String,
    pub feedback: Value,
    pub generated_at: DateTime<Utc>,
}
