//! Individual profiles: an individual's process involvement and the
//! competency requirements derived from it.
//!
//! Registered users are keyed by their user id. People who are not yet
//! registered go through the ephemeral path, keyed by a free-text name within
//! the organization. Both share the same projection and comparison code.

pub mod handlers;
pub mod resolver;
pub mod store;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

const MAX_USER_NAME_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProfileRef {
    Registered { user_id: Uuid },
    Ephemeral { user_name: String },
}

impl ProfileRef {
    /// Trims the ephemeral name and rejects empty or oversized ones.
    pub fn normalized(self) -> Result<Self, AppError> {
        match self {
            ProfileRef::Registered { user_id } => Ok(ProfileRef::Registered { user_id }),
            ProfileRef::Ephemeral { user_name } => {
                let trimmed = user_name.trim();
                if trimmed.is_empty() {
                    return Err(AppError::Validation("user_name cannot be empty".to_string()));
                }
                if trimmed.chars().count() > MAX_USER_NAME_LEN {
                    return Err(AppError::Validation(format!(
                        "user_name must be at most {MAX_USER_NAME_LEN} characters"
                    )));
                }
                Ok(ProfileRef::Ephemeral {
                    user_name: trimmed.to_string(),
                })
            }
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            ProfileRef::Registered { user_id } => Some(*user_id),
            ProfileRef::Ephemeral { .. } => None,
        }
    }

    pub fn user_name(&self) -> Option<&str> {
        match self {
            ProfileRef::Registered { .. } => None,
            ProfileRef::Ephemeral { user_name } => Some(user_name),
        }
    }
}

impl std::fmt::Display for ProfileRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileRef::Registered { user_id } => write!(f, "user {user_id}"),
            ProfileRef::Ephemeral { user_name } => write!(f, "ephemeral '{user_name}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_ref_tagged_serde() {
        let parsed: ProfileRef =
            serde_json::from_str(r#"{"kind":"ephemeral","user_name":"alice"}"#).unwrap();
        assert_eq!(
            parsed,
            ProfileRef::Ephemeral {
                user_name: "alice".to_string()
            }
        );

        let id = Uuid::new_v4();
        let json = serde_json::to_value(ProfileRef::Registered { user_id: id }).unwrap();
        assert_eq!(json["kind"], "registered");
        assert_eq!(json["user_id"], id.to_string());
    }

    #[test]
    fn test_normalized_trims_name() {
        let profile = ProfileRef::Ephemeral {
            user_name: "  bob ".to_string(),
        }
        .normalized()
        .unwrap();
        assert_eq!(profile.user_name(), Some("bob"));
    }

    #[test]
    fn test_normalized_rejects_blank_name() {
        let result = ProfileRef::Ephemeral {
            user_name: "   ".to_string(),
        }
        .normalized();
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_registered_has_no_name() {
        let profile = ProfileRef::Registered {
            user_id: Uuid::nil(),
        };
        assert_eq!(profile.user_name(), None);
        assert_eq!(profile.user_id(), Some(Uuid::nil()));
    }
}
