//! Keyword-based task classifier. Fast, deterministic, no LLM call.
//!
//! Each task is lowercased and checked against a per-process keyword list.
//! A match gives the process the involvement of the task's category; across
//! categories the strongest involvement wins.

use async_trait::async_trait;

use crate::catalog::{self, Involvement};
use crate::classification::{ClassifiedTasks, TaskClassifier, TaskDescriptions};
use crate::errors::AppError;

const PROCESS_KEYWORDS: &[(i32, &[&str])] = &[
    (1, &["procure", "purchas", "acquisition", "supplier selection", "tender"]),
    (2, &["supply", "deliver to customer", "offer", "quotation", "contract with customer"]),
    (3, &["process model", "lifecycle model", "process improvement", "development process"]),
    (4, &["infrastructure", "tooling", "it system", "build server", "lab equipment"]),
    (5, &["portfolio", "product roadmap", "project selection", "investment"]),
    (6, &["hiring", "recruit", "staffing", "training plan", "human resource"]),
    (7, &["quality management", "quality policy", "iso 9001", "audit"]),
    (8, &["knowledge", "lessons learned", "wiki", "best practice"]),
    (9, &["project plan", "schedule", "estimate", "work breakdown", "milestone"]),
    (10, &["project status", "progress", "controlling", "steering", "reporting"]),
    (11, &["decision", "trade-off", "trade study", "alternatives"]),
    (12, &["risk", "fmea", "hazard", "mitigation"]),
    (13, &["configuration", "version control", "baseline", "change request", "git"]),
    (14, &["documentation", "information management", "document control", "archive"]),
    (15, &["metric", "measurement", "kpi", "measure"]),
    (16, &["quality assurance", "review", "inspection", "compliance check"]),
    (17, &["business case", "market analysis", "mission analysis", "business need"]),
    (18, &["stakeholder", "customer needs", "use case", "user needs", "interview"]),
    (19, &["requirement", "specification", "system requirements"]),
    (20, &["architecture", "architect", "system structure", "interfaces"]),
    (21, &["design", "detailed design", "schematic", "cad", "modeling"]),
    (22, &["analysis", "simulation", "calculation", "feasibility"]),
    (23, &["implement", "coding", "programming", "software", "develop", "firmware", "manufactur"]),
    (24, &["integrat", "assembl", "merge modules"]),
    (25, &["verif", "test", "unit test", "test case"]),
    (26, &["transition", "rollout", "deployment", "commissioning", "handover"]),
    (27, &["validat", "acceptance", "field trial", "customer test"]),
    (28, &["operat", "run the system", "production line"]),
    (29, &["maintenance", "maintain", "repair", "service", "support tickets"]),
    (30, &["disposal", "decommission", "recycling", "end of life"]),
];

pub struct KeywordTaskClassifier;

#[async_trait]
impl TaskClassifier for KeywordTaskClassifier {
    async fn classify(&self, tasks: &TaskDescriptions) -> Result<ClassifiedTasks, AppError> {
        Ok(classify_by_keywords(tasks))
    }
}

pub fn classify_by_keywords(tasks: &TaskDescriptions) -> ClassifiedTasks {
    let mut involvement = vec![Involvement::NotPerforming; catalog::process_areas().len()];

    for (level, descriptions) in tasks.by_involvement() {
        for description in descriptions {
            let text = description.to_lowercase();
            for &(process_id, keywords) in PROCESS_KEYWORDS {
                if !keywords.iter().any(|k| text.contains(k)) {
                    continue;
                }
                if let Some(idx) = catalog::process_index(process_id) {
                    involvement[idx] = involvement[idx].max(level);
                }
            }
        }
    }

    ClassifiedTasks {
        involvement,
        suggested_role: None,
        classifier_backend: "keyword".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(process_id: i32) -> usize {
        catalog::process_index(process_id).unwrap()
    }

    #[test]
    fn test_every_process_has_keywords() {
        for process in catalog::process_areas() {
            assert!(
                PROCESS_KEYWORDS.iter().any(|(id, _)| *id == process.id),
                "missing keywords for process {}",
                process.id
            );
        }
    }

    #[test]
    fn test_category_sets_involvement() {
        let tasks = TaskDescriptions {
            responsible_for: vec!["Programming embedded firmware".to_string()],
            supporting: vec!["Help with risk workshops".to_string()],
            designing: vec![],
        };
        let result = classify_by_keywords(&tasks);
        assert_eq!(result.involvement[idx(23)], Involvement::Responsible);
        assert_eq!(result.involvement[idx(12)], Involvement::Supporting);
        assert_eq!(result.involvement[idx(1)], Involvement::NotPerforming);
        assert_eq!(result.classifier_backend, "keyword");
        assert!(result.suggested_role.is_none());
    }

    #[test]
    fn test_strongest_category_wins() {
        let tasks = TaskDescriptions {
            responsible_for: vec!["Software integration".to_string()],
            supporting: vec!["Integration of subsystems".to_string()],
            designing: vec!["Define the integration strategy".to_string()],
        };
        let result = classify_by_keywords(&tasks);
        assert_eq!(result.involvement[idx(24)], Involvement::Designing);
    }

    #[test]
    fn test_never_assigns_policy_designing() {
        let tasks = TaskDescriptions {
            designing: vec!["Design the development process model".to_string()],
            ..Default::default()
        };
        let result = classify_by_keywords(&tasks);
        assert!(result
            .involvement
            .iter()
            .all(|&i| i != Involvement::PolicyDesigning));
        assert_eq!(result.involvement[idx(3)], Involvement::Designing);
    }
}
