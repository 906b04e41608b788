use graphql_parser::query::ParseError;
use join_core::CoreError;
use thiserror::Error;
use user_facing_errors::{query_engine, KnownError};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{}", _0)]
    Core(#[from] CoreError),

    #[error("Error parsing GraphQL query: {}", _0)]
    QueryParsing(String),

    #[error("Unknown directive `@{}`", _0)]
    UnknownDirective(String),

    #[error("{}", _0)]
    QueryConversion(String),

    #[error("Unsupported feature: {}. {}", feature_name, message)]
    UnsupportedFeature {
        feature_name: &'static str,
        message: String,
    },

    #[error("Introspection error at `{}`: {}", path, message)]
    Introspection { path: String, message: String },
}

impl HandlerError {
    pub fn query_conversion(message: impl ToString) -> Self {
        Self::QueryConversion(message.to_string())
    }

    pub fn unsupported_feature(feature_name: &'static str, message: impl ToString) -> Self {
        let message = message.to_string();

        Self::UnsupportedFeature { feature_name, message }
    }

    pub fn introspection(path: impl ToString, message: impl ToString) -> Self {
        Self::Introspection {
            path: path.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<ParseError> for HandlerError {
    fn from(e: ParseError) -> Self {
        Self::QueryParsing(e.to_string())
    }
}

impl From<HandlerError> for user_facing_errors::Error {
    fn from(err: HandlerError) -> Self {
        match err {
            HandlerError::Core(err) => err.into(),

            HandlerError::QueryParsing(query_parsing_error) | HandlerError::QueryConversion(query_parsing_error) => {
                KnownError::new(query_engine::QueryParsingFailed { query_parsing_error }).into()
            }

            HandlerError::UnknownDirective(directive_name) => {
                KnownError::new(query_engine::UnknownDirective { directive_name }).into()
            }

            HandlerError::UnsupportedFeature { feature_name, message } => {
                KnownError::new(query_engine::UnsupportedFeature {
                    feature_name: feature_name.to_owned(),
                    message,
                })
                .into()
            }

            HandlerError::Introspection { path, message } => KnownError::new(query_engine::QueryValidationFailed {
                query_validation_error: message,
                query_path: path,
            })
            .into(),
        }
    }
}
