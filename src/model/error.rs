use thiserror::Error;

use crate::model::ResourceType;

pub type DatabaseResult<T> = std::result::Result<T, DatabaseError>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("sqlx migrate error: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),
    #[error("sqlx error: {0}")]
    SqlxError(#[from] sqlx::Error),
    #[error("json error: {0}")]
    SerdeError(#[from] serde_json::Error),
    #[error("resource not found: {resource_type:?}")]
    NotFound { resource_type: ResourceType },
    #[error("unknown {enum_name} value: {value}")]
    UnknownVariant {
        enum_name: &'static str,
        value: String,
    },
}

/// Kind of integrity rule the storage engine rejected a statement for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintViolation {
    Unique,
    ForeignKey,
    NotNull,
    /// Value outside an enum type or a check constraint.
    Domain,
}

// postgres `invalid_text_representation`, raised for unknown enum labels
const PG_INVALID_TEXT_REPRESENTATION: &str = "22P02";

impl DatabaseError {
    /// Classifies the engine error without consuming or wrapping it.
    pub fn violation(&self) -> Option<ConstraintViolation> {
        let Self::SqlxError(sqlx::Error::Database(err)) = self else {
            return None;
        };

        match err.kind() {
            sqlx::error::ErrorKind::UniqueViolation => Some(ConstraintViolation::Unique),
            sqlx::error::ErrorKind::ForeignKeyViolation => Some(ConstraintViolation::ForeignKey),
            sqlx::error::ErrorKind::NotNullViolation => Some(ConstraintViolation::NotNull),
            sqlx::error::ErrorKind::CheckViolation => Some(ConstraintViolation::Domain),
            _ => match err.code().as_deref() {
                Some(PG_INVALID_TEXT_REPRESENTATION) => Some(ConstraintViolation::Domain),
                _ => None,
            },
        }
    }

    pub fn unknown_variant<S: Into<String>>(enum_name: &'static str, value: S) -> Self {
        Self::UnknownVariant {
            enum_name,
            value: value.into(),
        }
    }
}
