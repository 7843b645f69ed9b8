// Static reference data: process areas, competencies, role archetypes.
// Vectors elsewhere in the crate are indexed in catalog order (ascending id).

pub mod data;
pub mod handlers;
pub mod levels;
pub mod seed;

use serde::{Deserialize, Serialize};

pub use levels::{CompetencyLevel, Involvement, ProcessWeight};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleGroup {
    Agreement,
    OrganizationalProjectEnabling,
    TechnicalManagement,
    TechnicalProcess,
}

impl LifecycleGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleGroup::Agreement => "agreement",
            LifecycleGroup::OrganizationalProjectEnabling => "organizational_project_enabling",
            LifecycleGroup::TechnicalManagement => "technical_management",
            LifecycleGroup::TechnicalProcess => "technical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetencyArea {
    Core,
    SocialPersonal,
    Management,
    Technical,
}

impl CompetencyArea {
    pub fn as_str(self) -> &'static str {
        match self {
            CompetencyArea::Core => "core",
            CompetencyArea::SocialPersonal => "social_personal",
            CompetencyArea::Management => "management",
            CompetencyArea::Technical => "technical",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProcessArea {
    pub id: i32,
    pub name: &'static str,
    pub group: LifecycleGroup,
}

impl ProcessArea {
    pub const fn new(id: i32, name: &'static str, group: LifecycleGroup) -> Self {
        Self { id, name, group }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Competency {
    pub id: i32,
    pub name: &'static str,
    pub area: CompetencyArea,
}

impl Competency {
    pub const fn new(id: i32, name: &'static str, area: CompetencyArea) -> Self {
        Self { id, name, area }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RoleArchetype {
    pub id: i32,
    pub name: &'static str,
    pub description: &'static str,
}

impl RoleArchetype {
    pub const fn new(id: i32, name: &'static str, description: &'static str) -> Self {
        Self {
            id,
            name,
            description,
        }
    }
}

pub fn process_areas() -> &'static [ProcessArea] {
    &data::PROCESS_AREAS
}

pub fn competencies() -> &'static [Competency] {
    &data::COMPETENCIES
}

pub fn role_archetypes() -> &'static [RoleArchetype] {
    &data::ROLE_ARCHETYPES
}

/// Position of a process id inside a process-space vector.
pub fn process_index(process_id: i32) -> Option<usize> {
    data::PROCESS_AREAS.iter().position(|p| p.id == process_id)
}

/// Position of a competency id inside a competency-space vector.
pub fn competency_index(competency_id: i32) -> Option<usize> {
    data::COMPETENCIES.iter().position(|c| c.id == competency_id)
}

pub fn competency(competency_id: i32) -> Option<&'static Competency> {
    data::COMPETENCIES.iter().find(|c| c.id == competency_id)
}

pub fn role(role_id: i32) -> Option<&'static RoleArchetype> {
    data::ROLE_ARCHETYPES.iter().find(|r| r.id == role_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_sizes() {
        assert_eq!(process_areas().len(), 30);
        assert_eq!(competencies().len(), 16);
        assert_eq!(role_archetypes().len(), 14);
    }

    #[test]
    fn test_index_lookup() {
        assert_eq!(process_index(1), Some(0));
        assert_eq!(process_index(30), Some(29));
        assert_eq!(process_index(31), None);
        assert_eq!(competency_index(16), Some(15));
        assert_eq!(role(5).map(|r| r.name), Some("Specialist Developer"));
    }

    #[test]
    fn test_competency_area_serde_matches_column_value() {
        for area in [
            CompetencyArea::Core,
            CompetencyArea::SocialPersonal,
            CompetencyArea::Management,
            CompetencyArea::Technical,
        ] {
            let json = serde_json::to_value(area).unwrap();
            assert_eq!(json, area.as_str());
            let parsed: CompetencyArea = serde_json::from_value(json).unwrap();
            assert_eq!(parsed, area);
        }
    }
}
