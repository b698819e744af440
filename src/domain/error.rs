use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Unprocessable entity: {message}")]
    UnprocessableEntity { message: String },

    #[error("Preprocessing error: {message}")]
    Preprocessing { message: String },

    #[error("Configuration inconsistency: {message}")]
    ConfigurationInconsistency { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::UnprocessableEntity {
            message: message.into(),
        }
    }

    pub fn preprocessing(message: impl Into<String>) -> Self {
        Self::Preprocessing {
            message: message.into(),
        }
    }

    pub fn inconsistent(message: impl Into<String>) -> Self {
        Self::ConfigurationInconsistency {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Human-readable message without the classification prefix
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound { message }
            | Self::BadRequest { message }
            | Self::UnprocessableEntity { message }
            | Self::Preprocessing { message }
            | Self::ConfigurationInconsistency { message }
            | Self::Validation { message }
            | Self::Conflict { message }
            | Self::Storage { message }
            | Self::Internal { message } => message,
        }
    }

    /// Short classification label, used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::BadRequest { .. } => "bad_request",
            Self::UnprocessableEntity { .. } => "unprocessable_entity",
            Self::Preprocessing { .. } => "preprocessing",
            Self::ConfigurationInconsistency { .. } => "configuration_inconsistency",
            Self::Validation { .. } => "validation",
            Self::Conflict { .. } => "conflict",
            Self::Storage { .. } => "storage",
            Self::Internal { .. } => "internal",
        }
    }
}
