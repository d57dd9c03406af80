use std::time::Duration;
use thiserror::Error;

/// Errors returned by the booking core. Each checkpoint failure maps to
/// exactly one variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error("Validation error: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Doctor {doctor_id} already has an overlapping appointment")]
    Conflict {
        doctor_id: i64,
        existing_id: Option<i64>,
    },

    #[error("Record store timed out after {timeout:?} during {operation}")]
    StorageTimeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("Record store unavailable: {message}")]
    StorageUnavailable { message: String },
}

/// Transport-neutral status class a gateway adapts to its own codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    ClientError,
    NotFound,
    Conflict,
    ServiceUnavailable,
}

impl ErrorClass {
    pub fn status_code(self) -> u16 {
        match self {
            ErrorClass::ClientError => 400,
            ErrorClass::NotFound => 404,
            ErrorClass::Conflict => 409,
            ErrorClass::ServiceUnavailable => 503,
        }
    }
}

impl BookingError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn patient_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "Patient",
            id,
        }
    }

    pub fn doctor_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "Doctor",
            id,
        }
    }

    pub fn conflict(doctor_id: i64, existing_id: Option<i64>) -> Self {
        Self::Conflict {
            doctor_id,
            existing_id,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            BookingError::Validation { .. } => ErrorClass::ClientError,
            BookingError::NotFound { .. } => ErrorClass::NotFound,
            BookingError::Conflict { .. } => ErrorClass::Conflict,
            BookingError::StorageTimeout { .. } | BookingError::StorageUnavailable { .. } => {
                ErrorClass::ServiceUnavailable
            }
        }
    }

    /// Stable tag for structured responses.
    pub fn kind(&self) -> &'static str {
        match self {
            BookingError::Validation { .. } => "validation_error",
            BookingError::NotFound { .. } => "not_found_error",
            BookingError::Conflict { .. } => "conflict_error",
            BookingError::StorageTimeout { .. } => "storage_timeout_error",
            BookingError::StorageUnavailable { .. } => "storage_unavailable",
        }
    }
}

/// Errors reported by a record store implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("Store unavailable: {message}")]
    Unavailable { message: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration parse error: {message}")]
    ParseError { message: String },

    #[error("Invalid configuration value for {field}: '{value}' - {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, BookingError>;
pub type StoreResult<T> = std::result::Result<T, StoreError>;
