//! Task classification: free-text task descriptions → process involvement.
//!
//! Default: `LlmTaskClassifier`. `KeywordTaskClassifier` is a deterministic
//! fallback the caller may opt into when the LLM backend fails.
//!
//! `AppState` holds an `Arc<dyn TaskClassifier>`.

pub mod keyword;
pub mod llm;
pub mod prompts;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::catalog::Involvement;
use crate::errors::AppError;

pub use keyword::KeywordTaskClassifier;
pub use llm::LlmTaskClassifier;

// ────────────────────────────────────────────────────────────────────────────
// Input / output models
// ────────────────────────────────────────────────────────────────────────────

/// Task descriptions grouped by how the person takes part in them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskDescriptions {
    #[serde(default)]
    pub responsible_for: Vec<String>,
    #[serde(default)]
    pub supporting: Vec<String>,
    #[serde(default)]
    pub designing: Vec<String>,
}

impl TaskDescriptions {
    /// Drops blank entries and rejects a submission with no tasks at all.
    pub fn cleaned(self) -> Result<Self, AppError> {
        fn clean(tasks: Vec<String>) -> Vec<String> {
            tasks
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect()
        }

        let cleaned = TaskDescriptions {
            responsible_for: clean(self.responsible_for),
            supporting: clean(self.supporting),
            designing: clean(self.designing),
        };

        if cleaned.responsible_for.is_empty()
            && cleaned.supporting.is_empty()
            && cleaned.designing.is_empty()
        {
            return Err(AppError::Validation(
                "At least one task description is required".to_string(),
            ));
        }
        Ok(cleaned)
    }

    /// Each category paired with the involvement it implies.
    pub fn by_involvement(&self) -> [(Involvement, &[String]); 3] {
        [
            (Involvement::Supporting, self.supporting.as_slice()),
            (Involvement::Responsible, self.responsible_for.as_slice()),
            (Involvement::Designing, self.designing.as_slice()),
        ]
    }
}

/// A role the classifier proposes directly. Reported next to the distance
/// match for comparison; never used as the match itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedRole {
    pub role_id: i32,
    pub role_name: String,
    pub confidence: f64,
    pub rationale: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedTasks {
    /// Dense, in catalog order.
    pub involvement: Vec<Involvement>,
    pub suggested_role: Option<SuggestedRole>,
    pub classifier_backend: String, // "llm" | "keyword"
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait TaskClassifier: Send + Sync {
    async fn classify(&self, tasks: &TaskDescriptions) -> Result<ClassifiedTasks, AppError>;
}

/// Runs a classifier under a deadline. Elapsed deadlines and backend errors
/// both surface as `AppError::Classifier`.
pub async fn classify_with_deadline(
    classifier: &dyn TaskClassifier,
    tasks: &TaskDescriptions,
    deadline: Duration,
) -> Result<ClassifiedTasks, AppError> {
    match tokio::time::timeout(deadline, classifier.classify(tasks)).await {
        Ok(Ok(classified)) => Ok(classified),
        Ok(Err(AppError::Classifier(msg))) => Err(AppError::Classifier(msg)),
        Ok(Err(other)) => Err(AppError::Classifier(other.to_string())),
        Err(_) => Err(AppError::Classifier(format!(
            "classifier did not answer within {}s",
            deadline.as_secs()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowClassifier;

    #[async_trait]
    impl TaskClassifier for SlowClassifier {
        async fn classify(&self, _tasks: &TaskDescriptions) -> Result<ClassifiedTasks, AppError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(AppError::Classifier("unreachable".to_string()))
        }
    }

    struct BrokenClassifier;

    #[async_trait]
    impl TaskClassifier for BrokenClassifier {
        async fn classify(&self, _tasks: &TaskDescriptions) -> Result<ClassifiedTasks, AppError> {
            Err(AppError::Internal(anyhow::anyhow!("boom")))
        }
    }

    fn tasks() -> TaskDescriptions {
        TaskDescriptions {
            responsible_for: vec!["Write embedded software".to_string()],
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_maps_to_classifier_error() {
        let result = classify_with_deadline(&SlowClassifier, &tasks(), Duration::from_secs(5)).await;
        assert!(matches!(result, Err(AppError::Classifier(_))));
    }

    #[tokio::test]
    async fn test_backend_failure_maps_to_classifier_error() {
        let result =
            classify_with_deadline(&BrokenClassifier, &tasks(), Duration::from_secs(5)).await;
        assert!(matches!(result, Err(AppError::Classifier(_))));
    }

    #[test]
    fn test_cleaned_drops_blank_tasks() {
        let tasks = TaskDescriptions {
            responsible_for: vec!["  ".to_string(), " Integrate modules ".to_string()],
            supporting: vec![String::new()],
            designing: vec![],
        }
        .cleaned()
        .unwrap();
        assert_eq!(tasks.responsible_for, vec!["Integrate modules".to_string()]);
        assert!(tasks.supporting.is_empty());
    }

    #[test]
    fn test_cleaned_rejects_empty_submission() {
        let result = TaskDescriptions::default().cleaned();
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
