//! Error types for the FitIn planner.

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Onboarding error: {0}")]
    Onboarding(#[from] OnboardingError),

    #[error("Unauthorized: {0}")]
    Unauthorized(#[from] AccessError),

    #[error("Photo storage error: {0}")]
    Photo(#[from] PhotoError),
}

/// Configuration-related errors. These abort startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A rejected user-entered field.
///
/// Every variant is recoverable: it blocks the current step and is shown to
/// the user, who resubmits corrected input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be a number")]
    Parse { field: String },

    #[error("{field} must be between {min} and {max} (got {actual})")]
    OutOfBounds {
        field: String,
        min: f64,
        max: f64,
        actual: f64,
    },

    #[error("{field} must be one of: {}", .allowed.join(", "))]
    InvalidEnum { field: String, allowed: Vec<String> },

    #[error("{field} is required to continue from the {step} step")]
    MissingRequired { step: String, field: String },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            Self::Parse { field }
            | Self::OutOfBounds { field, .. }
            | Self::InvalidEnum { field, .. }
            | Self::MissingRequired { field, .. } => field,
        }
    }
}

/// Onboarding state machine errors. None of these change the state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OnboardingError {
    #[error("{}", join_messages(.0))]
    Invalid(Vec<ValidationError>),

    #[error("Event {event} is not accepted in the {step} step")]
    UnexpectedEvent { step: String, event: String },

    #[error("Onboarding is already complete")]
    AlreadyComplete,

    #[error("No onboarding in progress for user {user_id}")]
    NotStarted { user_id: String },
}

impl OnboardingError {
    /// Validation failures carried by this error, empty for flow errors.
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::Invalid(errors) => errors,
            _ => &[],
        }
    }
}

impl From<ValidationError> for OnboardingError {
    fn from(e: ValidationError) -> Self {
        Self::Invalid(vec![e])
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Access errors. These end the flow and turn into a redirect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("No active session")]
    NoSession,

    #[error("Premium plan required (current plan: {plan})")]
    PlanRequired { plan: String },
}

/// Photo storage errors.
#[derive(Debug, thiserror::Error)]
pub enum PhotoError {
    #[error("Uploaded photo is empty")]
    Empty,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_message_names_field_and_range() {
        let e = ValidationError::OutOfBounds {
            field: "height".to_string(),
            min: 100.0,
            max: 250.0,
            actual: 99.0,
        };
        assert_eq!(e.to_string(), "height must be between 100 and 250 (got 99)");
        assert_eq!(e.field(), "height");
    }

    #[test]
    fn invalid_enum_lists_allowed_values() {
        let e = ValidationError::InvalidEnum {
            field: "goal".to_string(),
            allowed: vec!["cut".into(), "maintain".into(), "bulk".into()],
        };
        assert_eq!(e.to_string(), "goal must be one of: cut, maintain, bulk");
    }

    #[test]
    fn invalid_joins_every_message() {
        let err = OnboardingError::Invalid(vec![
            ValidationError::Parse {
                field: "height".into(),
            },
            ValidationError::Parse {
                field: "age".into(),
            },
        ]);
        assert_eq!(err.to_string(), "height must be a number; age must be a number");
        assert_eq!(err.validation_errors().len(), 2);
        assert!(OnboardingError::AlreadyComplete.validation_errors().is_empty());
    }
}
