use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoleProcessRow {
    pub organization_id: i32,
    pub role_id: i32,
    pub process_id: i32,
    pub involvement: i16,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoleCompetencyRow {
    pub organization_id: i32,
    pub role_id: i32,
    pub competency_id: i32,
    pub required_level: i16,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProcessCompetencyRow {
    pub process_id: i32,
    pub competency_id: i32,
    pub weight: i16,
}

/// A sparse `(process_id, involvement)` row of an individual's profile.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileProcessRow {
    pub process_id: i32,
    pub involvement: i16,
}

/// A sparse `(competency_id, required_level)` row of an individual's derived profile.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileCompetencyRow {
    pub competency_id: i32,
    pub required_level: i16,
}
