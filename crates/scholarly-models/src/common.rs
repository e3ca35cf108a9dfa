use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::ValidationError;

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

pub const GENDERS: [&str; 2] = ["MALE", "FEMALE"];

/// Accepts `MALE` or `FEMALE` in any letter case.
pub fn validate_gender(gender: &str) -> Result<(), ValidationError> {
    if normalize_gender(gender).is_some() {
        Ok(())
    } else {
        Err(ValidationError::new("gender"))
    }
}

/// Upper-cased gender, or `None` when it is not one of [`GENDERS`].
pub fn normalize_gender(gender: &str) -> Option<String> {
    let upper = gender.trim().to_uppercase();
    GENDERS.contains(&upper.as_str()).then_some(upper)
}

/// Deserializes a string with surrounding whitespace removed, so validation
/// rules see the value the service will use.
pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(value.trim().to_owned())
}
