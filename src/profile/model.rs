//! Profile document

use crate::error::{DatabaseError, ValidationError};
use serde::{Deserialize, Serialize};

/// Maximum number of personality tags on a profile
pub const MAX_TAGS: usize = 5;

/// Profile document stored at `users/<uid>`
///
/// Every field defaults to empty when missing: the database does not keep
/// empty arrays or maps, so an initial profile reads back without `tags`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    /// Display name
    pub name: String,
    /// Account email
    pub email: String,
    /// Birthdate as entered by the user
    pub birthdate: String,
    /// Free-form introduction
    pub bio: String,
    /// Gender as entered by the user
    pub gender: String,
    /// Personality section
    pub personality: Personality,
}

/// Personality section of a profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Personality {
    /// MBTI type, e.g. `INFJ`
    pub mbti: String,
    /// Ordered tags, at most [`MAX_TAGS`]
    pub tags: Vec<String>,
}

impl UserProfile {
    /// Profile written at registration: empty except for the email
    pub fn initial(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }
}

/// Replacement values for a profile
///
/// Applying an update overwrites the whole document; fields are not merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// Display name
    pub name: String,
    /// Birthdate
    pub birthdate: String,
    /// Gender
    pub gender: String,
    /// Introduction
    pub bio: String,
    /// MBTI type
    pub mbti: String,
    /// Tags, order preserved
    pub tags: Vec<String>,
}

impl ProfileUpdate {
    /// Check local preconditions
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_tags(&self.tags)
    }

    /// Full document for the account registered under `email`
    pub fn into_profile(self, email: impl Into<String>) -> UserProfile {
        UserProfile {
            name: self.name,
            email: email.into(),
            birthdate: self.birthdate,
            bio: self.bio,
            gender: self.gender,
            personality: Personality {
                mbti: self.mbti,
                tags: self.tags,
            },
        }
    }
}

/// Reject tag lists longer than [`MAX_TAGS`]
pub fn validate_tags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.len() > MAX_TAGS {
        return Err(ValidationError::TooManyTags {
            count: tags.len(),
            max: MAX_TAGS,
        });
    }
    Ok(())
}

/// Outcome of a profile read that keeps cancellation distinct from absence
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileRead {
    /// A document is stored
    Found(UserProfile),
    /// Nothing is stored
    Absent,
    /// The database cancelled the read
    Cancelled(DatabaseError),
}

impl ProfileRead {
    /// Fold into an optional profile; cancellation reads as absence
    pub fn into_option(self) -> Option<UserProfile> {
        match self {
            Self::Found(profile) => Some(profile),
            Self::Absent | Self::Cancelled(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tags(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("tag{}", i)).collect()
    }

    #[test]
    fn test_validate_tags_limit() {
        assert!(validate_tags(&tags(0)).is_ok());
        assert!(validate_tags(&tags(MAX_TAGS)).is_ok());
        assert_eq!(
            validate_tags(&tags(MAX_TAGS + 1)),
            Err(ValidationError::TooManyTags { count: 6, max: 5 })
        );
    }

    #[test]
    fn test_initial_profile_serialization() {
        let value = serde_json::to_value(UserProfile::initial("a@example.com")).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "",
                "email": "a@example.com",
                "birthdate": "",
                "bio": "",
                "gender": "",
                "personality": { "mbti": "", "tags": [] }
            })
        );
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let profile: UserProfile = serde_json::from_value(json!({
            "email": "a@example.com",
            "personality": { "mbti": "" }
        }))
        .unwrap();
        assert_eq!(profile, UserProfile::initial("a@example.com"));
    }

    #[test]
    fn test_update_into_profile_keeps_tag_order() {
        let update = ProfileUpdate {
            name: "Alice".to_string(),
            birthdate: "1990-01-01".to_string(),
            gender: "F".to_string(),
            bio: "bio text".to_string(),
            mbti: "INFJ".to_string(),
            tags: vec!["hiking".to_string(), "coffee".to_string()],
        };
        let profile = update.into_profile("alice@example.com");

        assert_eq!(profile.name, "Alice");
        assert_eq!(profile.email, "alice@example.com");
        assert_eq!(profile.personality.mbti, "INFJ");
        assert_eq!(profile.personality.tags, ["hiking", "coffee"]);
    }

    #[test]
    fn test_profile_read_into_option() {
        assert_eq!(ProfileRead::Absent.into_option(), None);
        assert_eq!(
            ProfileRead::Cancelled(DatabaseError::PermissionDenied).into_option(),
            None
        );
        assert!(ProfileRead::Found(UserProfile::default()).into_option().is_some());
    }
}
