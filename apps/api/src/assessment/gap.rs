//! Competency gap evaluation: an individual's assessed levels against the
//! levels a role (or their own derived profile) requires.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::catalog::{self, data, CompetencyArea, CompetencyLevel};
use crate::models::assessment::CompetencyIndicatorRow;

/// Shown when no indicator row exists for a (competency, level) pair.
pub const MISSING_INDICATOR: &str = "unaware / no indicator";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GapStatus {
    Below,
    Meets,
    Exceeds,
}

impl GapStatus {
    /// Only `Below` entries may carry an improvement suggestion.
    pub fn wants_improvement(self) -> bool {
        self == GapStatus::Below
    }
}

pub fn classify_gap(user: CompetencyLevel, required: CompetencyLevel) -> GapStatus {
    match user.cmp(&required) {
        std::cmp::Ordering::Less => GapStatus::Below,
        std::cmp::Ordering::Equal => GapStatus::Meets,
        std::cmp::Ordering::Greater => GapStatus::Exceeds,
    }
}

/// Indicator texts keyed by exact (competency id, level).
#[derive(Debug, Clone, Default)]
pub struct IndicatorLookup {
    texts: HashMap<(i32, CompetencyLevel), String>,
}

impl IndicatorLookup {
    pub fn from_rows(rows: Vec<CompetencyIndicatorRow>) -> Self {
        let texts = rows
            .into_iter()
            .filter_map(|row| {
                CompetencyLevel::from_value(row.level)
                    .map(|level| ((row.competency_id, level), row.indicator))
            })
            .collect();
        Self { texts }
    }

    /// Indicators straight from the in-code catalog.
    pub fn from_catalog() -> Self {
        let mut texts = HashMap::new();
        for competency in catalog::competencies() {
            for level in CompetencyLevel::ALL {
                if let Some(text) = data::indicator_text(competency, level) {
                    texts.insert((competency.id, level), text);
                }
            }
        }
        Self { texts }
    }

    pub fn get(&self, competency_id: i32, level: CompetencyLevel) -> Option<&str> {
        self.texts.get(&(competency_id, level)).map(String::as_str)
    }

    /// Exact-match lookup with the placeholder on a miss.
    pub fn text(&self, competency_id: i32, level: CompetencyLevel) -> &str {
        self.get(competency_id, level).unwrap_or(MISSING_INDICATOR)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetencyGap {
    pub competency_id: i32,
    pub competency_name: String,
    pub user_level: CompetencyLevel,
    pub user_indicator: String,
    pub required_level: CompetencyLevel,
    pub required_indicator: String,
    pub status: GapStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaGaps {
    pub area: CompetencyArea,
    pub competencies: Vec<CompetencyGap>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GapSummary {
    pub below: usize,
    pub meets: usize,
    pub exceeds: usize,
}

impl GapSummary {
    pub fn of(areas: &[AreaGaps]) -> Self {
        let mut summary = GapSummary::default();
        for gap in areas.iter().flat_map(|a| a.competencies.iter()) {
            match gap.status {
                GapStatus::Below => summary.below += 1,
                GapStatus::Meets => summary.meets += 1,
                GapStatus::Exceeds => summary.exceeds += 1,
            }
        }
        summary
    }
}

/// Compares two dense vectors (catalog order) and groups the result by
/// competency area. Short vectors are padded with `Unaware`.
pub fn evaluate_gaps(
    user_levels: &[CompetencyLevel],
    required_levels: &[CompetencyLevel],
    indicators: &IndicatorLookup,
) -> Vec<AreaGaps> {
    let mut by_area: BTreeMap<CompetencyArea, Vec<CompetencyGap>> = BTreeMap::new();

    for (idx, competency) in catalog::competencies().iter().enumerate() {
        let user_level = user_levels.get(idx).copied().unwrap_or_default();
        let required_level = required_levels.get(idx).copied().unwrap_or_default();

        by_area.entry(competency.area).or_default().push(CompetencyGap {
            competency_id: competency.id,
            competency_name: competency.name.to_string(),
            user_level,
            user_indicator: indicators.text(competency.id, user_level).to_string(),
            required_level,
            required_indicator: indicators.text(competency.id, required_level).to_string(),
            status: classify_gap(user_level, required_level),
        });
    }

    by_area
        .into_iter()
        .map(|(area, competencies)| AreaGaps { area, competencies })
        .collect()
}

/// Number of indicator lookups in a report that fell back to the placeholder.
pub fn indicator_misses(areas: &[AreaGaps]) -> usize {
    areas
        .iter()
        .flat_map(|a| a.competencies.iter())
        .map(|g| {
            usize::from(g.user_indicator == MISSING_INDICATOR)
                + usize::from(g.required_indicator == MISSING_INDICATOR)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use CompetencyLevel::*;

    #[test]
    fn test_classify_gap() {
        assert_eq!(classify_gap(Understand, Apply), GapStatus::Below);
        assert_eq!(classify_gap(Apply, Apply), GapStatus::Meets);
        assert_eq!(classify_gap(Master, Apply), GapStatus::Exceeds);
        assert!(GapStatus::Below.wants_improvement());
        assert!(!GapStatus::Meets.wants_improvement());
        assert!(!GapStatus::Exceeds.wants_improvement());
    }

    #[test]
    fn test_indicator_miss_uses_placeholder() {
        let lookup = IndicatorLookup::from_catalog();
        assert_eq!(lookup.text(1, Unaware), MISSING_INDICATOR);
        assert_ne!(lookup.text(1, Apply), MISSING_INDICATOR);
        assert_eq!(IndicatorLookup::default().text(1, Apply), MISSING_INDICATOR);
    }

    #[test]
    fn test_from_rows_ignores_off_scale_levels() {
        let lookup = IndicatorLookup::from_rows(vec![
            CompetencyIndicatorRow {
                competency_id: 2,
                level: 4,
                indicator: "Applies it".to_string(),
            },
            CompetencyIndicatorRow {
                competency_id: 2,
                level: 3,
                indicator: "never a level".to_string(),
            },
        ]);
        assert_eq!(lookup.text(2, Apply), "Applies it");
        assert_eq!(lookup.get(2, Understand), None);
    }

    #[test]
    fn test_evaluate_groups_by_area_in_catalog_order() {
        let user = vec![Understand; 16];
        let required = vec![Understand; 16];
        let areas = evaluate_gaps(&user, &required, &IndicatorLookup::from_catalog());
        let names: Vec<CompetencyArea> = areas.iter().map(|a| a.area).collect();
        assert_eq!(
            names,
            vec![
                CompetencyArea::Core,
                CompetencyArea::SocialPersonal,
                CompetencyArea::Management,
                CompetencyArea::Technical
            ]
        );
        assert_eq!(areas.iter().map(|a| a.competencies.len()).sum::<usize>(), 16);
        assert_eq!(GapSummary::of(&areas).meets, 16);
    }

    #[test]
    fn test_evaluate_mixed_statuses() {
        let mut user = vec![Understand; 16];
        let mut required = vec![Apply; 16];
        user[1] = Apply;
        user[2] = Master;
        required[3] = Unaware;

        let areas = evaluate_gaps(&user, &required, &IndicatorLookup::from_catalog());
        let core = &areas[0].competencies;
        assert_eq!(core[0].status, GapStatus::Below);
        assert_eq!(core[1].status, GapStatus::Meets);
        assert_eq!(core[2].status, GapStatus::Exceeds);
        assert_eq!(core[3].status, GapStatus::Exceeds);
        assert_eq!(core[3].required_indicator, MISSING_INDICATOR);

        let summary = GapSummary::of(&areas);
        assert_eq!(summary.below + summary.meets + summary.exceeds, 16);
        assert_eq!(indicator_misses(&areas), 1);
    }

    #[test]
    fn test_missing_requirements_degrade_to_unaware() {
        let user = vec![Aware; 16];
        let areas = evaluate_gaps(&user, &[], &IndicatorLookup::from_catalog());
        assert!(areas
            .iter()
            .flat_map(|a| a.competencies.iter())
            .all(|g| g.required_level == Unaware && g.status == GapStatus::Exceeds));
    }
}
