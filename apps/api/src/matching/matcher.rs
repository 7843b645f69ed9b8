//! Role matcher: ranks every role archetype of an organization by distance
//! to an individual's profile vector and scores confidence in the best match.
//!
//! Ranking is by ascending Euclidean distance. Roles within `TIE_EPSILON` of
//! each other are tied; ties prefer higher coverage, then the lower role id.
//! Every tied role is reported, none is dropped.

use serde::Serialize;

use crate::catalog::{self, CompetencyLevel, Involvement};
use crate::matching::distance::{distances, Distances};

const TIE_EPSILON: f64 = 1e-9;
const CONFIDENCE_CAP: f64 = 0.99;
const CONFIDENCE_FLOOR: f64 = 0.50;
const HIGH_COVERAGE: f64 = 0.8;

/// Which vector space a comparison runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSpace {
    /// Raw process involvement. The production path.
    Process,
    /// Derived competency requirements. Diagnostic only.
    Competency,
}

/// A role's reference vector in one space.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleVector {
    pub role_id: i32,
    pub vector: Vec<f64>,
}

impl RoleVector {
    pub fn from_involvement(role_id: i32, involvement: &[Involvement]) -> Self {
        Self {
            role_id,
            vector: involvement_vector(involvement),
        }
    }

    pub fn from_levels(role_id: i32, levels: &[CompetencyLevel]) -> Self {
        Self {
            role_id,
            vector: level_vector(levels),
        }
    }
}

pub fn involvement_vector(involvement: &[Involvement]) -> Vec<f64> {
    involvement.iter().map(|i| i.magnitude()).collect()
}

pub fn level_vector(levels: &[CompetencyLevel]) -> Vec<f64> {
    levels.iter().map(|l| l.magnitude()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleDistance {
    pub role_id: i32,
    pub role_name: String,
    #[serde(flatten)]
    pub distances: Distances,
    pub coverage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleMatch {
    pub space: MatchSpace,
    pub selected: RoleDistance,
    pub confidence: f64,
    /// How many of the three metrics rank the selected role best (0–3).
    pub metric_agreement: u8,
    /// Every role at the minimum Euclidean distance, selected one first.
    pub tied_roles: Vec<i32>,
    /// All other roles by ascending Euclidean distance.
    pub alternatives: Vec<RoleDistance>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MatchOutcome {
    Matched(RoleMatch),
    NoRolesAvailable,
}

impl MatchOutcome {
    pub fn selected_role_id(&self) -> Option<i32> {
        match self {
            MatchOutcome::Matched(m) => Some(m.selected.role_id),
            MatchOutcome::NoRolesAvailable => None,
        }
    }
}

/// Fraction of the user's non-zero entries where the role is non-zero too.
/// Zero when the user has no non-zero entries.
pub fn coverage(user: &[f64], role: &[f64]) -> f64 {
    let active: Vec<usize> = user
        .iter()
        .enumerate()
        .filter(|(_, &v)| v != 0.0)
        .map(|(i, _)| i)
        .collect();
    if active.is_empty() {
        return 0.0;
    }
    let covered = active
        .iter()
        .filter(|&&i| role.get(i).copied().unwrap_or(0.0) != 0.0)
        .count();
    covered as f64 / active.len() as f64
}

/// Step function from the best Euclidean distance to a base confidence.
pub fn base_confidence(euclidean: f64) -> f64 {
    match euclidean {
        d if d < 5.0 => 0.95,
        d if d < 10.0 => 0.90,
        d if d < 15.0 => 0.85,
        d if d < 20.0 => 0.75,
        d if d < 25.0 => 0.65,
        _ => 0.55,
    }
}

pub fn confidence(euclidean: f64, coverage: f64, metric_agreement: u8) -> f64 {
    let mut confidence = base_confidence(euclidean);
    if coverage > HIGH_COVERAGE {
        confidence = (confidence + 0.05).min(CONFIDENCE_CAP);
    }
    confidence = match metric_agreement {
        3 => (confidence + 0.05).min(CONFIDENCE_CAP),
        2 => confidence,
        _ => (confidence - 0.05).max(CONFIDENCE_FLOOR),
    };
    (confidence * 100.0).round() / 100.0
}

fn is_tie(a: f64, b: f64) -> bool {
    (a - b).abs() <= TIE_EPSILON
}

fn role_name(role_id: i32) -> String {
    catalog::role(role_id)
        .map(|r| r.name.to_string())
        .unwrap_or_else(|| format!("Role {role_id}"))
}

/// Matches a user vector against every role vector of one space.
pub fn match_roles(user: &[f64], roles: &[RoleVector], space: MatchSpace) -> MatchOutcome {
    if roles.is_empty() {
        return MatchOutcome::NoRolesAvailable;
    }

    let mut ranking: Vec<RoleDistance> = roles
        .iter()
        .map(|role| RoleDistance {
            role_id: role.role_id,
            role_name: role_name(role.role_id),
            distances: distances(user, &role.vector),
            coverage: coverage(user, &role.vector),
        })
        .collect();

    ranking.sort_by(|a, b| {
        if is_tie(a.distances.euclidean, b.distances.euclidean) {
            b.coverage
                .total_cmp(&a.coverage)
                .then(a.role_id.cmp(&b.role_id))
        } else {
            a.distances.euclidean.total_cmp(&b.distances.euclidean)
        }
    });

    let best = ranking[0].distances.euclidean;
    let tied_roles: Vec<i32> = ranking
        .iter()
        .filter(|r| is_tie(r.distances.euclidean, best))
        .map(|r| r.role_id)
        .collect();

    let min_of = |metric: fn(&Distances) -> f64| {
        ranking
            .iter()
            .map(|r| metric(&r.distances))
            .fold(f64::INFINITY, f64::min)
    };
    let min_manhattan = min_of(|d| d.manhattan);
    let min_cosine = min_of(|d| d.cosine);

    let mut alternatives = ranking;
    let selected = alternatives.remove(0);

    let metric_agreement = 1
        + u8::from(is_tie(selected.distances.manhattan, min_manhattan))
        + u8::from(is_tie(selected.distances.cosine, min_cosine));

    let confidence = confidence(best, selected.coverage, metric_agreement);

    MatchOutcome::Matched(RoleMatch {
        space,
        selected,
        confidence,
        metric_agreement,
        tied_roles,
        alternatives,
    })
}
