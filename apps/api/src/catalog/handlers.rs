use axum::Json;
use serde::Serialize;

use crate::catalog::{self, Competency, CompetencyLevel, ProcessArea, RoleArchetype};

#[derive(Debug, Serialize)]
pub struct LevelDescriptor {
    pub value: i16,
    pub survey_index: u8,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub process_areas: &'static [ProcessArea],
    pub competencies: &'static [Competency],
    pub role_archetypes: &'static [RoleArchetype],
    pub competency_levels: Vec<LevelDescriptor>,
}

/// GET /api/v1/catalog
pub async fn handle_get_catalog() -> Json<CatalogResponse> {
    Json(build_catalog())
}

fn build_catalog() -> CatalogResponse {
    let competency_levels = CompetencyLevel::ALL
        .iter()
        .zip(0u8..)
        .map(|(&level, survey_index)| LevelDescriptor {
            value: level.value(),
            survey_index,
            label: level.label(),
        })
        .collect();

    CatalogResponse {
        process_areas: catalog::process_areas(),
        competencies: catalog::competencies(),
        role_archetypes: catalog::role_archetypes(),
        competency_levels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lists_survey_lookup() {
        let catalog = build_catalog();
        let pairs: Vec<(u8, i16)> = catalog
            .competency_levels
            .iter()
            .map(|l| (l.survey_index, l.value))
            .collect();
        assert_eq!(pairs, vec![(0, 0), (1, 1), (2, 2), (3, 4), (4, 6)]);
        assert_eq!(catalog.role_archetypes.len(), 14);
    }
}
