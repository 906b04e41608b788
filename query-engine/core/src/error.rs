use crate::{connector::ConnectorError, QueryParserError};
use thiserror::Error;
use user_facing_errors::{query_engine, KnownError};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0}")]
    QueryParserError(QueryParserError),

    #[error("Expected 1 value but got {found}")]
    CardinalityViolation { found: usize },

    #[error("Error in connector: {}", _0)]
    ConnectorError(ConnectorError),

    #[error("Inconsistent row fetched for `{entity}`: expected {expected} values, got {found}.")]
    InconsistentRow {
        entity: String,
        expected: usize,
        found: usize,
    },

    #[error("Join value `{key}` was not fetched.")]
    MissingJoinValue { key: String },

    #[error("Error in schema construction: {}", _0)]
    SchemaError(String),

    #[error("Unsupported feature: {}", _0)]
    UnsupportedFeatureError(String),
}

impl CoreError {
    pub fn schema_error(message: impl ToString) -> Self {
        CoreError::SchemaError(message.to_string())
    }

    pub fn inconsistent_row(entity: &str, expected: usize, found: usize) -> Self {
        CoreError::InconsistentRow {
            entity: entity.to_owned(),
            expected,
            found,
        }
    }

    pub fn is_cardinality_violation(&self) -> bool {
        matches!(self, CoreError::CardinalityViolation { .. })
    }
}

impl From<QueryParserError> for CoreError {
    fn from(e: QueryParserError) -> CoreError {
        CoreError::QueryParserError(e)
    }
}

impl From<ConnectorError> for CoreError {
    fn from(e: ConnectorError) -> CoreError {
        CoreError::ConnectorError(e)
    }
}

impl From<CoreError> for user_facing_errors::Error {
    fn from(err: CoreError) -> user_facing_errors::Error {
        match err {
            CoreError::QueryParserError(qpe) => KnownError::new(query_engine::QueryValidationFailed {
                query_validation_error: qpe.error_kind().to_string(),
                query_path: qpe.path().to_string(),
            })
            .into(),

            CoreError::CardinalityViolation { found } => {
                KnownError::new(query_engine::CardinalityViolation { found }).into()
            }

            CoreError::ConnectorError(ConnectorError {
                user_facing_error: Some(user_facing_error),
                ..
            }) => user_facing_error.into(),

            CoreError::ConnectorError(err) => KnownError::new(query_engine::FetchFailed {
                details: err.to_string(),
            })
            .into(),

            CoreError::UnsupportedFeatureError(message) => KnownError::new(query_engine::UnsupportedFeature {
                feature_name: "query".to_owned(),
                message,
            })
            .into(),

            _ => user_facing_errors::Error::new_non_panic_with_current_backtrace(err.to_string()),
        }
    }
}
