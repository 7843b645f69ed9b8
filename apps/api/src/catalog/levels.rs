//! Discrete scales shared by every matrix in the system.
//!
//! The competency scale is non-contiguous (0, 1, 2, 4, 6). Questionnaires
//! collect a 0–4 survey index which maps onto it through a fixed lookup; the
//! values 3 and 5 never occur as competency levels.

use serde::{Deserialize, Serialize};

/// How a role or individual takes part in a process area.
///
/// Stored as SMALLINT codes 0–4. Code 3 is reserved for the Process & Policy
/// Manager archetype, which designs every process; code 4 is ordinary
/// designing. Variant order follows the codes, so `Ord` ranks involvement.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Involvement {
    #[default]
    NotPerforming,
    Supporting,
    Responsible,
    PolicyDesigning,
    Designing,
}

impl Involvement {
    pub fn code(self) -> i16 {
        match self {
            Involvement::NotPerforming => 0,
            Involvement::Supporting => 1,
            Involvement::Responsible => 2,
            Involvement::PolicyDesigning => 3,
            Involvement::Designing => 4,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(Involvement::NotPerforming),
            1 => Some(Involvement::Supporting),
            2 => Some(Involvement::Responsible),
            3 => Some(Involvement::PolicyDesigning),
            4 => Some(Involvement::Designing),
            _ => None,
        }
    }

    /// Coordinate used when comparing profiles in process space.
    pub fn magnitude(self) -> f64 {
        f64::from(self.code())
    }

    pub fn is_performing(self) -> bool {
        self != Involvement::NotPerforming
    }
}

/// How strongly a process area draws on a competency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessWeight {
    #[default]
    None,
    Relevant,
    Essential,
}

impl ProcessWeight {
    pub fn code(self) -> i16 {
        match self {
            ProcessWeight::None => 0,
            ProcessWeight::Relevant => 1,
            ProcessWeight::Essential => 2,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(ProcessWeight::None),
            1 => Some(ProcessWeight::Relevant),
            2 => Some(ProcessWeight::Essential),
            _ => None,
        }
    }
}

/// A point on the 0/1/2/4/6 proficiency scale.
///
/// Serialized as its numeric value; deserialization rejects 3, 5 and
/// anything outside the scale.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "i16", into = "i16")]
pub enum CompetencyLevel {
    #[default]
    Unaware,
    Aware,
    Understand,
    Apply,
    Master,
}

/// Survey index (position in the list) → competency level.
const SURVEY_INDEX_LEVELS: [CompetencyLevel; 5] = [
    CompetencyLevel::Unaware,
    CompetencyLevel::Aware,
    CompetencyLevel::Understand,
    CompetencyLevel::Apply,
    CompetencyLevel::Master,
];

impl CompetencyLevel {
    pub const ALL: [CompetencyLevel; 5] = SURVEY_INDEX_LEVELS;

    pub fn value(self) -> i16 {
        match self {
            CompetencyLevel::Unaware => 0,
            CompetencyLevel::Aware => 1,
            CompetencyLevel::Understand => 2,
            CompetencyLevel::Apply => 4,
            CompetencyLevel::Master => 6,
        }
    }

    pub fn from_value(value: i16) -> Option<Self> {
        match value {
            0 => Some(CompetencyLevel::Unaware),
            1 => Some(CompetencyLevel::Aware),
            2 => Some(CompetencyLevel::Understand),
            4 => Some(CompetencyLevel::Apply),
            6 => Some(CompetencyLevel::Master),
            _ => None,
        }
    }

    /// Maps a 0–4 questionnaire answer onto the indicator scale.
    pub fn from_survey_index(index: u8) -> Option<Self> {
        SURVEY_INDEX_LEVELS.get(usize::from(index)).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            CompetencyLevel::Unaware => "unaware",
            CompetencyLevel::Aware => "know",
            CompetencyLevel::Understand => "understand",
            CompetencyLevel::Apply => "apply",
            CompetencyLevel::Master => "master",
        }
    }

    pub fn magnitude(self) -> f64 {
        f64::from(self.value())
    }
}

impl TryFrom<i16> for CompetencyLevel {
    type Error = String;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        CompetencyLevel::from_value(value)
            .ok_or_else(|| format!("{value} is not a competency level (expected 0, 1, 2, 4 or 6)"))
    }
}

impl From<CompetencyLevel> for i16 {
    fn from(level: CompetencyLevel) -> Self {
        level.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_survey_index_lookup_is_fixed() {
        let mapped: Vec<i16> = (0..=4)
            .map(|i| CompetencyLevel::from_survey_index(i).unwrap().value())
            .collect();
        assert_eq!(mapped, vec![0, 1, 2, 4, 6]);
    }

    #[test]
    fn test_survey_index_three_and_four_skip_gaps() {
        assert_eq!(
            CompetencyLevel::from_survey_index(3),
            Some(CompetencyLevel::Apply)
        );
        assert_eq!(
            CompetencyLevel::from_survey_index(4),
            Some(CompetencyLevel::Master)
        );
        for index in 0..=4 {
            let value = CompetencyLevel::from_survey_index(index).unwrap().value();
            assert!(value != 3 && value != 5);
        }
    }

    #[test]
    fn test_survey_index_out_of_range() {
        assert!(CompetencyLevel::from_survey_index(5).is_none());
    }

    #[test]
    fn test_gap_values_are_not_levels() {
        assert!(CompetencyLevel::from_value(3).is_none());
        assert!(CompetencyLevel::from_value(5).is_none());
        assert!(CompetencyLevel::from_value(-1).is_none());
        assert!(CompetencyLevel::from_value(7).is_none());
    }

    #[test]
    fn test_level_serde_uses_numeric_value() {
        let json = serde_json::to_string(&CompetencyLevel::Apply).unwrap();
        assert_eq!(json, "4");
        let level: CompetencyLevel = serde_json::from_str("6").unwrap();
        assert_eq!(level, CompetencyLevel::Master);
        assert!(serde_json::from_str::<CompetencyLevel>("3").is_err());
    }

    #[test]
    fn test_involvement_codes_round_trip() {
        for code in 0..=4 {
            assert_eq!(Involvement::from_code(code).unwrap().code(), code);
        }
        assert!(Involvement::from_code(5).is_none());
    }

    #[test]
    fn test_involvement_ordering_ranks_designing_highest() {
        assert!(Involvement::Designing > Involvement::PolicyDesigning);
        assert!(Involvement::PolicyDesigning > Involvement::Responsible);
        assert!(Involvement::Responsible > Involvement::Supporting);
        assert!(Involvement::Supporting > Involvement::NotPerforming);
    }

    #[test]
    fn test_involvement_serde_names() {
        let parsed: Involvement = serde_json::from_str(r#""policy_designing""#).unwrap();
        assert_eq!(parsed, Involvement::PolicyDesigning);
    }

    #[test]
    fn test_process_weight_codes() {
        assert_eq!(ProcessWeight::from_code(2), Some(ProcessWeight::Essential));
        assert!(ProcessWeight::from_code(3).is_none());
    }
}
