//! LLM-backed task classifier.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::catalog::{self, Involvement};
use crate::classification::prompts::{TASK_CLASSIFICATION_PROMPT, TASK_CLASSIFICATION_SYSTEM};
use crate::classification::{ClassifiedTasks, SuggestedRole, TaskClassifier, TaskDescriptions};
use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::LlmClient;

pub struct LlmTaskClassifier(pub LlmClient);

#[async_trait]
impl TaskClassifier for LlmTaskClassifier {
    async fn classify(&self, tasks: &TaskDescriptions) -> Result<ClassifiedTasks, AppError> {
        let prompt = build_prompt(tasks);
        let system = format!("{TASK_CLASSIFICATION_SYSTEM} {JSON_ONLY_SYSTEM}");
        let raw = self
            .0
            .call_json::<RawClassification>(&prompt, &system)
            .await
            .map_err(|e| AppError::Classifier(e.to_string()))?;
        Ok(interpret(raw))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire format returned by the model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawClassification {
    #[serde(default)]
    processes: Vec<RawProcess>,
    #[serde(default)]
    suggested_role: Option<RawSuggestedRole>,
}

#[derive(Debug, Deserialize)]
struct RawProcess {
    process_id: i32,
    involvement: String,
}

#[derive(Debug, Deserialize)]
struct RawSuggestedRole {
    role_id: i32,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    rationale: String,
}

fn bullet_list(tasks: &[String]) -> String {
    if tasks.is_empty() {
        return "(none)".to_string();
    }
    tasks
        .iter()
        .map(|t| format!("- {t}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn build_prompt(tasks: &TaskDescriptions) -> String {
    let process_catalog = catalog::process_areas()
        .iter()
        .map(|p| format!("{}: {}", p.id, p.name))
        .collect::<Vec<_>>()
        .join("\n");
    let role_catalog = catalog::role_archetypes()
        .iter()
        .map(|r| format!("{}: {} ({})", r.id, r.name, r.description))
        .collect::<Vec<_>>()
        .join("\n");

    TASK_CLASSIFICATION_PROMPT
        .replace("{responsible_for}", &bullet_list(&tasks.responsible_for))
        .replace("{supporting}", &bullet_list(&tasks.supporting))
        .replace("{designing}", &bullet_list(&tasks.designing))
        .replace("{process_catalog}", &process_catalog)
        .replace("{role_catalog}", &role_catalog)
}

fn parse_involvement(label: &str) -> Option<Involvement> {
    match label.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
        "not_performing" | "none" => Some(Involvement::NotPerforming),
        "supporting" => Some(Involvement::Supporting),
        "responsible" => Some(Involvement::Responsible),
        // Individuals never get the policy-manager code.
        "designing" | "policy_designing" => Some(Involvement::Designing),
        _ => None,
    }
}

/// Converts the model's answer into a dense vector. Unknown ids and labels
/// are dropped with a warning rather than failing the whole classification.
fn interpret(raw: RawClassification) -> ClassifiedTasks {
    let mut involvement = vec![Involvement::NotPerforming; catalog::process_areas().len()];

    for process in raw.processes {
        let Some(level) = parse_involvement(&process.involvement) else {
            warn!(
                "Classifier returned unknown involvement '{}' for process {}",
                process.involvement, process.process_id
            );
            continue;
        };
        match catalog::process_index(process.process_id) {
            Some(idx) => involvement[idx] = involvement[idx].max(level),
            None => warn!("Classifier returned unknown process id {}", process.process_id),
        }
    }

    let suggested_role = raw.suggested_role.and_then(|s| match catalog::role(s.role_id) {
        Some(role) => Some(SuggestedRole {
            role_id: role.id,
            role_name: role.name.to_string(),
            confidence: s.confidence.clamp(0.0, 1.0),
            rationale: s.rationale,
        }),
        None => {
            warn!("Classifier suggested unknown role id {}", s.role_id);
            None
        }
    });

    ClassifiedTasks {
        involvement,
        suggested_role,
        classifier_backend: "llm".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> RawClassification {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_interpret_builds_dense_vector() {
        let result = interpret(raw(
            r#"{"processes":[
                {"process_id":23,"involvement":"responsible"},
                {"process_id":21,"involvement":"Designing"},
                {"process_id":25,"involvement":"supporting"}
            ],"suggested_role":{"role_id":5,"confidence":0.82,"rationale":"Writes code"}}"#,
        ));
        assert_eq!(result.involvement.len(), 30);
        assert_eq!(result.involvement[22], Involvement::Responsible);
        assert_eq!(result.involvement[20], Involvement::Designing);
        assert_eq!(result.involvement[24], Involvement::Supporting);
        let role = result.suggested_role.unwrap();
        assert_eq!(role.role_name, "Specialist Developer");
        assert_eq!(result.classifier_backend, "llm");
    }

    #[test]
    fn test_interpret_drops_unknown_ids_and_labels() {
        let result = interpret(raw(
            r#"{"processes":[
                {"process_id":99,"involvement":"responsible"},
                {"process_id":1,"involvement":"leading"}
            ],"suggested_role":{"role_id":42,"confidence":0.5,"rationale":""}}"#,
        ));
        assert!(result.involvement.iter().all(|i| !i.is_performing()));
        assert!(result.suggested_role.is_none());
    }

    #[test]
    fn test_interpret_keeps_strongest_duplicate() {
        let result = interpret(raw(
            r#"{"processes":[
                {"process_id":24,"involvement":"designing"},
                {"process_id":24,"involvement":"supporting"}
            ]}"#,
        ));
        assert_eq!(result.involvement[23], Involvement::Designing);
        assert!(result.suggested_role.is_none());
    }

    #[test]
    fn test_policy_designing_label_is_downgraded() {
        assert_eq!(parse_involvement("policy designing"), Some(Involvement::Designing));
        assert_eq!(parse_involvement("not-performing"), Some(Involvement::NotPerforming));
    }

    #[test]
    fn test_confidence_is_clamped() {
        let result = interpret(raw(
            r#"{"processes":[],"suggested_role":{"role_id":3,"confidence":1.7,"rationale":"x"}}"#,
        ));
        assert_eq!(result.suggested_role.unwrap().confidence, 1.0);
    }

    #[test]
    fn test_prompt_lists_tasks_and_catalog() {
        let prompt = build_prompt(&TaskDescriptions {
            responsible_for: vec!["Write firmware".to_string()],
            supporting: vec![],
            designing: vec![],
        });
        assert!(prompt.contains("- Write firmware"));
        assert!(prompt.contains("(none)"));
        assert!(prompt.contains("23: Implementation"));
        assert!(prompt.contains("5: Specialist Developer"));
        assert!(!prompt.contains("{process_catalog}"));
    }
}
