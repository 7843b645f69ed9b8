//! Feedback generation for a gap report, one competency area at a time.
//!
//! `AppState` holds an `Arc<dyn FeedbackGenerator>`. Whatever a backend
//! returns is passed through `enforce_feedback_contract`, so entries that meet
//! or exceed their requirement never carry an improvement suggestion.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::assessment::gap::{AreaGaps, GapStatus};
use crate::assessment::prompts::{FEEDBACK_PROMPT_TEMPLATE, FEEDBACK_SYSTEM};
use crate::catalog::CompetencyArea;
use crate::errors::AppError;
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, NO_INTERNAL_LEVELS_INSTRUCTION};
use crate::llm_client::LlmClient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetencyFeedback {
    pub competency_name: String,
    pub strengths: String,
    #[serde(default)]
    pub improvement: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaFeedback {
    pub area: CompetencyArea,
    pub competencies: Vec<CompetencyFeedback>,
}

#[async_trait]
pub trait FeedbackGenerator: Send + Sync {
    async fn generate(&self, area: &AreaGaps) -> Result<Vec<CompetencyFeedback>, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// LlmFeedbackGenerator
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmFeedbackGenerator(pub LlmClient);

#[derive(Debug, Deserialize)]
struct RawFeedback {
    #[serde(default)]
    competencies: Vec<CompetencyFeedback>,
}

#[async_trait]
impl FeedbackGenerator for LlmFeedbackGenerator {
    async fn generate(&self, area: &AreaGaps) -> Result<Vec<CompetencyFeedback>, AppError> {
        let prompt = build_prompt(area);
        let system = format!("{FEEDBACK_SYSTEM} {JSON_ONLY_SYSTEM}");
        let raw = self
            .0
            .call_json::<RawFeedback>(&prompt, &system)
            .await
            .map_err(|e| AppError::FeedbackGeneration(e.to_string()))?;
        Ok(raw.competencies)
    }
}

fn status_word(status: GapStatus) -> &'static str {
    match status {
        GapStatus::Below => "BELOW",
        GapStatus::Meets => "MEET",
        GapStatus::Exceeds => "EXCEED",
    }
}

/// Only indicator texts reach the model, never the numeric levels.
fn build_prompt(area: &AreaGaps) -> String {
    let competencies = area
        .competencies
        .iter()
        .map(|gap| {
            format!(
                "Competency: {}\nCurrently: {}\nExpected: {}\nStatus: {}",
                gap.competency_name,
                gap.user_indicator,
                gap.required_indicator,
                status_word(gap.status)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    FEEDBACK_PROMPT_TEMPLATE
        .replace("{area}", area_title(area.area))
        .replace("{competencies}", &competencies)
        .replace("{no_internal_levels}", NO_INTERNAL_LEVELS_INSTRUCTION)
}

fn area_title(area: CompetencyArea) -> &'static str {
    match area {
        CompetencyArea::Core => "Core competencies",
        CompetencyArea::SocialPersonal => "Social and personal competencies",
        CompetencyArea::Management => "Management competencies",
        CompetencyArea::Technical => "Technical competencies",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Post-processing
// ────────────────────────────────────────────────────────────────────────────

/// Aligns generated feedback with the area's competencies: one entry per
/// competency in report order, unknown names dropped, and no improvement
/// text unless the competency is below its requirement.
pub fn enforce_feedback_contract(
    area: &AreaGaps,
    mut generated: Vec<CompetencyFeedback>,
) -> AreaFeedback {
    let competencies = area
        .competencies
        .iter()
        .map(|gap| {
            let position = generated
                .iter()
                .position(|f| f.competency_name.trim().eq_ignore_ascii_case(&gap.competency_name));
            let mut feedback = match position {
                Some(idx) => generated.swap_remove(idx),
                None => {
                    warn!("No feedback generated for competency '{}'", gap.competency_name);
                    CompetencyFeedback {
                        competency_name: gap.competency_name.clone(),
                        strengths: String::new(),
                        improvement: None,
                    }
                }
            };
            feedback.competency_name = gap.competency_name.clone();
            if !gap.status.wants_improvement() {
                feedback.improvement = None;
            } else if feedback.improvement.as_deref().is_some_and(|s| s.trim().is_empty()) {
                feedback.improvement = None;
            }
            feedback
        })
        .collect();

    for extra in &generated {
        warn!("Dropping feedback for unknown competency '{}'", extra.competency_name);
    }

    AreaFeedback {
        area: area.area,
        competencies,
    }
}

/// Runs a generator for one area under a deadline. Elapsed deadlines and
/// backend errors surface as `AppError::FeedbackGeneration`.
pub async fn generate_area_feedback(
    generator: &dyn FeedbackGenerator,
    area: &AreaGaps,
    deadline: Duration,
) -> Result<AreaFeedback, AppError> {
    let generated = match tokio::time::timeout(deadline, generator.generate(area)).await {
        Ok(Ok(generated)) => generated,
        Ok(Err(AppError::FeedbackGeneration(msg))) => return Err(AppError::FeedbackGeneration(msg)),
        Ok(Err(other)) => return Err(AppError::FeedbackGeneration(other.to_string())),
        Err(_) => {
            return Err(AppError::FeedbackGeneration(format!(
                "feedback generator did not answer within {}s",
                deadline.as_secs()
            )))
        }
    };
    Ok(enforce_feedback_contract(area, generated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::gap::{evaluate_gaps, IndicatorLookup};
    use crate::catalog::CompetencyLevel;

    /// Always suggests an improvement, to check that post-processing strips it.
    struct EagerGenerator;

    #[async_trait]
    impl FeedbackGenerator for EagerGenerator {
        async fn generate(&self, area: &AreaGaps) -> Result<Vec<CompetencyFeedback>, AppError> {
            Ok(area
                .competencies
                .iter()
                .map(|g| CompetencyFeedback {
                    competency_name: g.competency_name.to_uppercase(),
                    strengths: format!("Good work on {}", g.competency_name),
                    improvement: Some("Keep growing".to_string()),
                })
                .collect())
        }
    }

    struct SlowGenerator;

    #[async_trait]
    impl FeedbackGenerator for SlowGenerator {
        async fn generate(&self, _area: &AreaGaps) -> Result<Vec<CompetencyFeedback>, AppError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(vec![])
        }
    }

    fn core_area() -> AreaGaps {
        // Core: below, meets, exceeds, meets
        let mut user = vec![CompetencyLevel::Apply; 16];
        let required = vec![CompetencyLevel::Apply; 16];
        user[0] = CompetencyLevel::Understand;
        user[2] = CompetencyLevel::Master;
        evaluate_gaps(&user, &required, &IndicatorLookup::from_catalog()).remove(0)
    }

    #[tokio::test]
    async fn test_improvement_only_for_below() {
        let area = core_area();
        let feedback = generate_area_feedback(&EagerGenerator, &area, Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(feedback.area, CompetencyArea::Core);
        assert_eq!(feedback.competencies.len(), area.competencies.len());
        assert!(feedback.competencies[0].improvement.is_some());
        assert!(feedback.competencies[1..]
            .iter()
            .all(|f| f.improvement.is_none()));
        assert_eq!(feedback.competencies[0].competency_name, "Systems Thinking");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_maps_to_generation_error() {
        let result = generate_area_feedback(&SlowGenerator, &core_area(), Duration::from_secs(2)).await;
        assert!(matches!(result, Err(AppError::FeedbackGeneration(_))));
    }

    #[test]
    fn test_missing_entries_are_filled_and_extras_dropped() {
        let area = core_area();
        let generated = vec![CompetencyFeedback {
            competency_name: "Not a competency".to_string(),
            strengths: "x".to_string(),
            improvement: None,
        }];
        let feedback = enforce_feedback_contract(&area, generated);
        assert_eq!(feedback.competencies.len(), area.competencies.len());
        assert!(feedback.competencies.iter().all(|f| f.strengths.is_empty()));
    }

    #[test]
    fn test_stored_feedback_document_reads_back() {
        let feedback = enforce_feedback_contract(&core_area(), vec![]);
        let document = serde_json::to_value(&feedback).unwrap();
        assert_eq!(document["area"], "core");

        let restored: AreaFeedback = serde_json::from_value(document).unwrap();
        assert_eq!(restored, feedback);
    }

    #[test]
    fn test_prompt_hides_numeric_levels() {
        let prompt = build_prompt(&core_area());
        assert!(prompt.contains("Core competencies"));
        assert!(prompt.contains("Status: BELOW"));
        assert!(prompt.contains("Status: EXCEED"));
        assert!(!prompt.contains("{competencies}"));
        assert!(!prompt.contains("Level 4"));
    }
}
