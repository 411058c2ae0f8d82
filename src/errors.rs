//! # Error Handling for Grid Operations
//!
//! Every grid operation reports failure through [`GridError`]. The error never crosses the
//! service boundary as-is: [`crate::service::GridService`] logs it and turns it into a
//! [`crate::envelope::ResultEnvelope`] with `error: true`.
//!
//! `Display` carries the full detail and is meant for logs. [`GridError::user_message`] is
//! what the grid widget gets to see. Database errors are sanitized there, so connection
//! strings, SQL fragments and constraint names stay server-side.

use sea_orm::DbErr;
use thiserror::Error;

use crate::RecordId;

#[derive(Debug, Error)]
pub enum GridError {
    /// No entity type is registered under the requested key
    #[error("unknown entity '{0}'")]
    UnknownEntity(String),

    /// The record addressed by an update or delete does not exist
    #[error("{entity} record {id} not found")]
    NotFound { entity: String, id: RecordId },

    /// Malformed filter, sort or paging parameters
    #[error("invalid query: {0}")]
    Query(String),

    /// Missing request keys or field values that do not fit their column
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Anything the store reported
    #[error("persistence error: {0}")]
    Persistence(#[from] DbErr),
}

impl GridError {
    pub fn not_found(entity: impl Into<String>, id: RecordId) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id,
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Get the user-facing error message (sanitized)
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::UnknownEntity(key) => format!("Unknown entity '{key}'"),
            Self::NotFound { entity, id } => {
                format!("{entity} record {} not found", crate::envelope::format_id(*id))
            }
            Self::Query(message) => format!("Invalid query: {message}"),
            Self::InvalidInput(message) => format!("Invalid input: {message}"),
            Self::Persistence(DbErr::RecordNotFound(message)) => message.clone(),
            Self::Persistence(_) => "A database error occurred".to_string(),
        }
    }

    /// Log the error with its internal details.
    ///
    /// Store failures are logged at `error` level. Caller mistakes only at `debug`, since
    /// they are reported back to the grid anyway.
    pub fn log(&self, entity: Option<&str>) {
        let entity = entity.unwrap_or("-");
        match self {
            Self::Persistence(internal) => {
                tracing::error!(entity, error = ?internal, "Database error occurred");
            }
            Self::UnknownEntity(_) => {
                tracing::warn!(entity, error = %self, "Grid request for unregistered entity");
            }
            _ => {
                tracing::debug!(entity, error = %self, "Grid request rejected");
            }
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Persistence(DbErr::RecordNotFound(_))
        )
    }
}
