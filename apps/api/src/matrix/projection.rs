//! Process-to-competency projection.
//!
//! One implementation serves both the per-role materialized matrix and the
//! per-individual derived profile. The level for a single
//! (involvement, weight) pair comes from an exhaustive match rather than
//! from multiplying codes, so the policy-designing code (3) never collides
//! with ordinary arithmetic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::{self, data, CompetencyLevel, Involvement, ProcessWeight};

/// Global process × competency weights, indexed in catalog order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessCompetencyMatrix {
    weights: Vec<Vec<ProcessWeight>>,
}

impl ProcessCompetencyMatrix {
    /// The seeded default matrix.
    #[cfg(test)]
    pub fn from_catalog() -> Self {
        let weights = data::PROCESS_COMPETENCY_WEIGHTS
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&w| ProcessWeight::from_code(i16::from(w)).unwrap_or_default())
                    .collect()
            })
            .collect();
        Self { weights }
    }

    /// Builds the matrix from stored `(process_id, competency_id, weight)`
    /// entries. Missing entries count as `ProcessWeight::None`.
    pub fn from_entries(entries: &[(i32, i32, ProcessWeight)]) -> Self {
        let mut weights =
            vec![vec![ProcessWeight::None; catalog::competencies().len()]; catalog::process_areas().len()];
        for &(process_id, competency_id, weight) in entries {
            match (
                catalog::process_index(process_id),
                catalog::competency_index(competency_id),
            ) {
                (Some(p), Some(c)) => weights[p][c] = weight,
                _ => warn!(
                    "Ignoring process-competency entry for unknown ids (process {process_id}, competency {competency_id})"
                ),
            }
        }
        Self { weights }
    }

    pub fn weight(&self, process_idx: usize, competency_idx: usize) -> ProcessWeight {
        self.weights
            .get(process_idx)
            .and_then(|row| row.get(competency_idx))
            .copied()
            .unwrap_or_default()
    }

    pub fn process_count(&self) -> usize {
        self.weights.len()
    }

    pub fn competency_count(&self) -> usize {
        self.weights.first().map_or(0, Vec::len)
    }
}

/// Competency level implied by taking part in one process that draws on a
/// competency with the given weight.
///
/// | involvement           | relevant   | essential  |
/// |-----------------------|------------|------------|
/// | supporting            | aware      | understand |
/// | responsible           | understand | apply      |
/// | designing (any kind)  | apply      | master     |
pub fn project_level(involvement: Involvement, weight: ProcessWeight) -> CompetencyLevel {
    use CompetencyLevel::*;

    match (involvement, weight) {
        (Involvement::NotPerforming, _) | (_, ProcessWeight::None) => Unaware,
        (Involvement::Supporting, ProcessWeight::Relevant) => Aware,
        (Involvement::Supporting, ProcessWeight::Essential) => Understand,
        (Involvement::Responsible, ProcessWeight::Relevant) => Understand,
        (Involvement::Responsible, ProcessWeight::Essential) => Apply,
        (Involvement::Designing | Involvement::PolicyDesigning, ProcessWeight::Relevant) => Apply,
        (Involvement::Designing | Involvement::PolicyDesigning, ProcessWeight::Essential) => Master,
    }
}

/// Projects a process-involvement vector onto competency requirements:
/// for each competency, the highest level implied by any process.
///
/// A short input is treated as zero-padded (missing processes are not
/// performed).
pub fn project(involvement: &[Involvement], matrix: &ProcessCompetencyMatrix) -> Vec<CompetencyLevel> {
    (0..matrix.competency_count())
        .map(|c| {
            involvement
                .iter()
                .take(matrix.process_count())
                .enumerate()
                .map(|(p, &inv)| project_level(inv, matrix.weight(p, c)))
                .max()
                .unwrap_or_default()
        })
        .collect()
}

/// Builds a dense involvement vector in catalog order from sparse
/// `(process_id, involvement)` pairs. Absent processes are `NotPerforming`.
pub fn dense_involvement<I>(entries: I) -> Vec<Involvement>
where
    I: IntoIterator<Item = (i32, Involvement)>,
{
    let mut vector = vec![Involvement::NotPerforming; catalog::process_areas().len()];
    for (process_id, involvement) in entries {
        match catalog::process_index(process_id) {
            Some(idx) => vector[idx] = involvement,
            None => warn!("Ignoring involvement for unknown process id {process_id}"),
        }
    }
    vector
}

/// One row of an organization's role × process matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleProcessEntry {
    pub role_id: i32,
    pub process_id: i32,
    pub involvement: Involvement,
}

/// One row of the derived role × competency matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoleCompetencyEntry {
    pub role_id: i32,
    pub competency_id: i32,
    pub required_level: CompetencyLevel,
}

/// Computes the full role × competency matrix for one organization.
/// Output is ordered by (role id, competency id), so reruns over the same
/// input are identical.
pub fn materialize_role_competencies(
    entries: &[RoleProcessEntry],
    matrix: &ProcessCompetencyMatrix,
) -> Vec<RoleCompetencyEntry> {
    let mut by_role: BTreeMap<i32, Vec<(i32, Involvement)>> = BTreeMap::new();
    for entry in entries {
        by_role
            .entry(entry.role_id)
            .or_default()
            .push((entry.process_id, entry.involvement));
    }

    by_role
        .into_iter()
        .flat_map(|(role_id, sparse)| {
            let levels = project(&dense_involvement(sparse), matrix);
            catalog::competencies()
                .iter()
                .zip(levels)
                .map(move |(competency, required_level)| RoleCompetencyEntry {
                    role_id,
                    competency_id: competency.id,
                    required_level,
                })
        })
        .collect()
}

/// The template organization's default rows, straight from the catalog.
pub fn default_role_process_entries() -> Vec<RoleProcessEntry> {
    catalog::role_archetypes()
        .iter()
        .zip(data::DEFAULT_ROLE_PROCESS_MATRIX.iter())
        .flat_map(|(role, row)| {
            catalog::process_areas()
                .iter()
                .zip(row.iter())
                .map(move |(process, &code)| RoleProcessEntry {
                    role_id: role.id,
                    process_id: process.id,
                    involvement: Involvement::from_code(i16::from(code)).unwrap_or_default(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::data::POLICY_MANAGER_ROLE_ID;

    fn levels(values: &[CompetencyLevel]) -> Vec<i16> {
        values.iter().map(|l| l.value()).collect()
    }

    fn developer_profile() -> Vec<Involvement> {
        // Design Definition, Implementation, Integration as responsible
        dense_involvement([
            (21, Involvement::Responsible),
            (23, Involvement::Responsible),
            (24, Involvement::Responsible),
        ])
    }

    #[test]
    fn test_project_level_table() {
        use CompetencyLevel::*;
        assert_eq!(project_level(Involvement::NotPerforming, ProcessWeight::Essential), Unaware);
        assert_eq!(project_level(Involvement::Designing, ProcessWeight::None), Unaware);
        assert_eq!(project_level(Involvement::Supporting, ProcessWeight::Relevant), Aware);
        assert_eq!(project_level(Involvement::Supporting, ProcessWeight::Essential), Understand);
        assert_eq!(project_level(Involvement::Responsible, ProcessWeight::Relevant), Understand);
        assert_eq!(project_level(Involvement::Responsible, ProcessWeight::Essential), Apply);
        assert_eq!(project_level(Involvement::Designing, ProcessWeight::Relevant), Apply);
        assert_eq!(project_level(Involvement::Designing, ProcessWeight::Essential), Master);
    }

    #[test]
    fn test_policy_designing_projects_like_designing() {
        for weight in [ProcessWeight::None, ProcessWeight::Relevant, ProcessWeight::Essential] {
            assert_eq!(
                project_level(Involvement::PolicyDesigning, weight),
                project_level(Involvement::Designing, weight)
            );
        }
    }

    #[test]
    fn test_projection_never_yields_gap_values() {
        let matrix = ProcessCompetencyMatrix::from_catalog();
        for code in 0..=4 {
            let inv = Involvement::from_code(code).unwrap();
            let projected = project(&vec![inv; 30], &matrix);
            assert!(projected.iter().all(|l| l.value() != 3 && l.value() != 5));
        }
    }

    #[test]
    fn test_projection_is_deterministic() {
        let matrix = ProcessCompetencyMatrix::from_catalog();
        let profile = developer_profile();
        assert_eq!(project(&profile, &matrix), project(&profile, &matrix));
    }

    #[test]
    fn test_projection_of_developer_profile() {
        let matrix = ProcessCompetencyMatrix::from_catalog();
        let projected = project(&developer_profile(), &matrix);
        assert_eq!(
            levels(&projected),
            vec![4, 2, 0, 4, 2, 0, 4, 0, 2, 2, 2, 2, 4, 4, 0, 2]
        );
    }

    #[test]
    fn test_zero_profile_projects_to_zero() {
        let matrix = ProcessCompetencyMatrix::from_catalog();
        let projected = project(&[], &matrix);
        assert_eq!(projected.len(), 16);
        assert!(projected.iter().all(|&l| l == CompetencyLevel::Unaware));
    }

    #[test]
    fn test_short_vector_is_zero_padded() {
        let matrix = ProcessCompetencyMatrix::from_catalog();
        let full = developer_profile();
        let truncated: Vec<Involvement> = full.iter().copied().take(24).collect();
        assert_eq!(project(&truncated, &matrix), project(&full, &matrix));
    }

    #[test]
    fn test_from_entries_defaults_missing_to_none() {
        let matrix = ProcessCompetencyMatrix::from_entries(&[(1, 1, ProcessWeight::Essential)]);
        assert_eq!(matrix.weight(0, 0), ProcessWeight::Essential);
        assert_eq!(matrix.weight(0, 1), ProcessWeight::None);
        assert_eq!(matrix.weight(29, 15), ProcessWeight::None);
        assert_eq!(matrix.process_count(), 30);
        assert_eq!(matrix.competency_count(), 16);
    }

    #[test]
    fn test_from_entries_ignores_unknown_ids() {
        let matrix = ProcessCompetencyMatrix::from_entries(&[(99, 1, ProcessWeight::Essential)]);
        assert_eq!(matrix, ProcessCompetencyMatrix::from_entries(&[]));
    }

    #[test]
    fn test_materialization_is_idempotent() {
        let matrix = ProcessCompetencyMatrix::from_catalog();
        let entries = default_role_process_entries();
        let first = materialize_role_competencies(&entries, &matrix);
        let second = materialize_role_competencies(&entries, &matrix);
        assert_eq!(first, second);
        assert_eq!(first.len(), 14 * 16);
    }

    #[test]
    fn test_materialization_is_order_independent() {
        let matrix = ProcessCompetencyMatrix::from_catalog();
        let entries = default_role_process_entries();
        let mut reversed = entries.clone();
        reversed.reverse();
        assert_eq!(
            materialize_role_competencies(&entries, &matrix),
            materialize_role_competencies(&reversed, &matrix)
        );
    }

    #[test]
    fn test_materialized_policy_manager_row() {
        let matrix = ProcessCompetencyMatrix::from_catalog();
        let rows = materialize_role_competencies(&default_role_process_entries(), &matrix);
        let policy: Vec<i16> = rows
            .iter()
            .filter(|r| r.role_id == POLICY_MANAGER_ROLE_ID)
            .map(|r| r.required_level.value())
            .collect();
        // Agile Methods is only ever "relevant" to a process, so designing caps it at apply.
        let mut expected = vec![6; 15];
        expected.push(4);
        assert_eq!(policy, expected);
    }

    #[test]
    fn test_default_entries_cover_every_role_and_process() {
        let entries = default_role_process_entries();
        assert_eq!(entries.len(), 14 * 30);
    }
}
