use join_core::CoreError;
use thiserror::Error;
use user_facing_errors::{common, KnownError};

#[derive(Debug, Error)]
pub enum DatamodelError {
    #[error("Could not read the datamodel: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML datamodel: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON datamodel: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported datamodel format `{0}`, expected `toml` or `json`.")]
    UnsupportedFormat(String),

    #[error("Table `{0}` is declared more than once.")]
    DuplicateTable(String),

    #[error("Table `{0}` does not exist.")]
    UnknownTable(String),

    #[error("Column `{column}` does not exist on table `{table}`.")]
    UnknownColumn { table: String, column: String },

    #[error("Field `{entity}.{field}` is declared more than once.")]
    DuplicateField { entity: String, field: String },

    #[error("Invalid value for `{table}.{column}`: {message}")]
    InvalidValue {
        table: String,
        column: String,
        message: String,
    },

    #[error("Invalid reference `{0}`, expected `table.column`.")]
    InvalidReference(String),

    #[error(
        "Relationship `{parent}.{relationship}` to `{target}` needs an explicit join: found {candidates} foreign keys between the tables."
    )]
    AmbiguousJoin {
        parent: String,
        relationship: String,
        target: String,
        candidates: usize,
    },

    #[error("{0}")]
    Core(#[from] CoreError),
}

impl From<DatamodelError> for user_facing_errors::Error {
    fn from(err: DatamodelError) -> Self {
        match err {
            DatamodelError::AmbiguousJoin {
                parent,
                target,
                candidates,
                ..
            } => KnownError::new(common::AmbiguousJoin {
                parent,
                target,
                candidates,
            })
            .into(),

            err => KnownError::new(common::SchemaParserError {
                full_error: err.to_string(),
            })
            .into(),
        }
    }
}
