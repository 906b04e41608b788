//! The seams between the core and the data sources it fetches from.

use crate::{AmbientContext, Arguments, CoreResult, QueryContext, Request};
use async_trait::async_trait;
use join_value::JoinValue;
use thiserror::Error;
use user_facing_errors::KnownError;

/// One fetched row, positionally aligned to the requested selections.
pub type Row = Vec<JoinValue>;

/// Executes the flat fetch of one entity.
///
/// Implementations must return exactly one row per logical result row, each
/// holding one value per requested selection in the requested order. Row
/// order and row count drive the correlation of parents and children.
#[async_trait]
pub trait FetchImmediates: Send + Sync {
    async fn fetch_immediates(
        &self,
        selections: &[Request],
        query: &QueryContext,
        ambient: &AmbientContext,
    ) -> CoreResult<Vec<Row>>;
}

#[async_trait]
impl<F> FetchImmediates for F
where
    F: Fn(&[Request], &QueryContext, &AmbientContext) -> CoreResult<Vec<Row>> + Send + Sync,
{
    async fn fetch_immediates(
        &self,
        selections: &[Request],
        query: &QueryContext,
        ambient: &AmbientContext,
    ) -> CoreResult<Vec<Row>> {
        self(selections, query, ambient)
    }
}

/// Builds the query context of a relationship's target from the query context
/// of the parent. Must return a new context instead of altering `parent`.
#[async_trait]
pub trait BuildQuery: Send + Sync {
    async fn build_query(
        &self,
        arguments: &Arguments,
        parent: &QueryContext,
        ambient: &AmbientContext,
    ) -> CoreResult<QueryContext>;
}

#[async_trait]
impl<F> BuildQuery for F
where
    F: Fn(&Arguments, &QueryContext, &AmbientContext) -> CoreResult<QueryContext> + Send + Sync,
{
    async fn build_query(
        &self,
        arguments: &Arguments,
        parent: &QueryContext,
        ambient: &AmbientContext,
    ) -> CoreResult<QueryContext> {
        self(arguments, parent, ambient)
    }
}

#[derive(Debug, Error)]
#[error("{}", kind)]
pub struct ConnectorError {
    /// An optional error already rendered for users in case the data source
    /// provides it.
    pub user_facing_error: Option<KnownError>,

    /// The error information for internal use.
    pub kind: ErrorKind,
}

impl ConnectorError {
    pub fn from_kind(kind: ErrorKind) -> Self {
        Self {
            user_facing_error: None,
            kind,
        }
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("Table `{}` does not exist.", _0)]
    TableDoesNotExist(String),

    #[error("Column `{column}` does not exist on table `{table}`.")]
    ColumnDoesNotExist { table: String, column: String },

    #[error("Field `{}` cannot be fetched as a column.", _0)]
    NotAColumn(String),

    #[error("Unexpected query context, expected `{}`.", _0)]
    UnexpectedQueryContext(&'static str),

    #[error("{}", _0)]
    RawError(String),
}

impl From<ErrorKind> for crate::CoreError {
    fn from(kind: ErrorKind) -> Self {
        crate::CoreError::ConnectorError(ConnectorError::from_kind(kind))
    }
}
