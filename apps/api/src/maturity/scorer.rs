//! Organizational maturity score from the four questionnaire answers.
//!
//! Pipeline:
//! 1. normalize each answer through its field table
//! 2. weighted sum scaled to 0–100
//! 3. subtract a balance penalty (population stddev × 10), floored at 0
//! 4. gate: a score that reaches a level boundary while the weakest field is
//!    below that boundary's floor is clamped to just under the boundary
//! 5. map to one of five levels and derive the profile type

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

const ROLLOUT_SCOPE: [f64; 5] = [0.0, 0.2, 0.45, 0.75, 1.0];
const SE_ROLES_PROCESSES: [f64; 6] = [0.0, 0.1, 0.3, 0.55, 0.8, 1.0];
const SE_MINDSET: [f64; 5] = [0.0, 0.2, 0.5, 0.8, 1.0];
const KNOWLEDGE_BASE: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

/// rolloutScope, seRolesProcesses, seMindset, knowledgeBase.
const WEIGHTS: [f64; 4] = [0.20, 0.35, 0.25, 0.20];

const PENALTY_FACTOR: f64 = 10.0;

/// (boundary, minimum normalized field), highest first. Only the highest
/// boundary reached is checked.
const GATES: [(f64, f64); 3] = [(80.0, 0.60), (60.0, 0.40), (40.0, 0.20)];
const GATE_MARGIN: f64 = 0.1;

const BALANCED_MAX_STDDEV: f64 = 0.15;
const CRITICAL_MIN_STDDEV: f64 = 0.30;
const DOMINANCE_THRESHOLD: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaturityAnswers {
    pub rollout_scope: i64,
    pub se_roles_processes: i64,
    pub se_mindset: i64,
    pub knowledge_base: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizedAnswers {
    pub rollout_scope: f64,
    pub se_roles_processes: f64,
    pub se_mindset: f64,
    pub knowledge_base: f64,
}

impl NormalizedAnswers {
    fn values(&self) -> [f64; 4] {
        [
            self.rollout_scope,
            self.se_roles_processes,
            self.se_mindset,
            self.knowledge_base,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MaturityLevel {
    Initial,
    Developing,
    Defined,
    Managed,
    Optimized,
}

impl MaturityLevel {
    pub fn number(self) -> u8 {
        match self {
            MaturityLevel::Initial => 1,
            MaturityLevel::Developing => 2,
            MaturityLevel::Defined => 3,
            MaturityLevel::Managed => 4,
            MaturityLevel::Optimized => 5,
        }
    }

    /// Bands are [min, max); the top band includes exactly 100.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            MaturityLevel::Optimized
        } else if score >= 60.0 {
            MaturityLevel::Managed
        } else if score >= 40.0 {
            MaturityLevel::Defined
        } else if score >= 20.0 {
            MaturityLevel::Developing
        } else {
            MaturityLevel::Initial
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProfileType {
    #[serde(rename = "Balanced Development")]
    Balanced,
    #[serde(rename = "Unbalanced Development")]
    Unbalanced,
    #[serde(rename = "Critically Unbalanced")]
    CriticallyUnbalanced,
    #[serde(rename = "Deployment-Focused")]
    DeploymentFocused,
    #[serde(rename = "Process-Centric")]
    ProcessCentric,
    #[serde(rename = "Culture-Centric")]
    CultureCentric,
    #[serde(rename = "Knowledge-Focused")]
    KnowledgeFocused,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaturityScore {
    pub normalized: NormalizedAnswers,
    pub weighted_score: f64,
    pub std_deviation: f64,
    pub balance_penalty: f64,
    /// Set when the weakest field held the score below a level boundary.
    pub gated_at: Option<f64>,
    pub final_score: f64,
    pub level: MaturityLevel,
    pub level_number: u8,
    pub profile_type: ProfileType,
}

fn lookup(table: &[f64], field: &str, answer: i64) -> Result<f64, AppError> {
    usize::try_from(answer)
        .ok()
        .and_then(|idx| table.get(idx).copied())
        .ok_or_else(|| {
            AppError::Validation(format!(
                "{field} must be between 0 and {}, got {answer}",
                table.len() - 1
            ))
        })
}

pub fn normalize(answers: &MaturityAnswers) -> Result<NormalizedAnswers, AppError> {
    Ok(NormalizedAnswers {
        rollout_scope: lookup(&ROLLOUT_SCOPE, "rolloutScope", answers.rollout_scope)?,
        se_roles_processes: lookup(
            &SE_ROLES_PROCESSES,
            "seRolesProcesses",
            answers.se_roles_processes,
        )?,
        se_mindset: lookup(&SE_MINDSET, "seMindset", answers.se_mindset)?,
        knowledge_base: lookup(&KNOWLEDGE_BASE, "knowledgeBase", answers.knowledge_base)?,
    })
}

fn population_std_deviation(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn profile_type(normalized: &NormalizedAnswers, std_deviation: f64) -> ProfileType {
    if std_deviation <= BALANCED_MAX_STDDEV {
        return ProfileType::Balanced;
    }
    if std_deviation > CRITICAL_MIN_STDDEV {
        return ProfileType::CriticallyUnbalanced;
    }

    let values = normalized.values();
    let mean = values.iter().sum::<f64>() / values.len() as f64;

    // first field wins on equal values
    let (dominant, max) = values
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::MIN), |best, (idx, v)| if v > best.1 { (idx, v) } else { best });

    if max - mean < DOMINANCE_THRESHOLD {
        return ProfileType::Unbalanced;
    }
    match dominant {
        0 => ProfileType::DeploymentFocused,
        1 => ProfileType::ProcessCentric,
        2 => ProfileType::CultureCentric,
        _ => ProfileType::KnowledgeFocused,
    }
}

/// Checks the highest boundary `score` reaches; below that boundary's floor
/// the score is clamped just under it. Lower boundaries are not rechecked.
fn apply_gate(score: f64, weakest: f64) -> (f64, Option<f64>) {
    match GATES.iter().find(|(boundary, _)| score >= *boundary) {
        Some(&(boundary, floor)) if weakest < floor => {
            (round1(boundary - GATE_MARGIN), Some(boundary))
        }
        _ => (score, None),
    }
}

/// Scores a validated answer set. Out-of-range answers are rejected before
/// any arithmetic runs.
pub fn calculate(answers: &MaturityAnswers) -> Result<MaturityScore, AppError> {
    let normalized = normalize(answers)?;
    let values = normalized.values();

    let weighted_score = WEIGHTS
        .iter()
        .zip(values.iter())
        .map(|(w, v)| w * v)
        .sum::<f64>()
        * 100.0;

    let std_deviation = population_std_deviation(&values);
    let balance_penalty = std_deviation * PENALTY_FACTOR;
    // Gate on the reported (rounded) score so rounding cannot lift it over a boundary.
    let score = round1((weighted_score - balance_penalty).max(0.0)).clamp(0.0, 100.0);
    let weakest = values.iter().copied().fold(f64::INFINITY, f64::min);
    let (final_score, gated_at) = apply_gate(score, weakest);
    let level = MaturityLevel::from_score(final_score);

    Ok(MaturityScore {
        normalized,
        weighted_score: round1(weighted_score),
        std_deviation,
        balance_penalty,
        gated_at,
        final_score,
        level,
        level_number: level.number(),
        profile_type: profile_type(&normalized, std_deviation),
    })
}
