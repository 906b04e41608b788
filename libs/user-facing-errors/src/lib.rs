#![deny(unsafe_code, rust_2018_idioms)]

pub mod common;
pub mod query_engine;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// An error that carries a stable code and a message meant for the caller of
/// the engine, as opposed to the operator.
pub trait UserFacingError: serde::Serialize {
    const ERROR_CODE: &'static str;

    fn message(&self) -> String;
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct KnownError {
    pub message: String,
    pub meta: serde_json::Value,
    pub error_code: Cow<'static, str>,
}

impl KnownError {
    pub fn new<T: UserFacingError>(inner: T) -> KnownError {
        KnownError {
            message: inner.message(),
            meta: serde_json::to_value(&inner).unwrap_or(serde_json::Value::Null),
            error_code: Cow::Borrowed(T::ERROR_CODE),
        }
    }

    pub fn is_code(&self, code: &str) -> bool {
        self.error_code == code
    }
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct UnknownError {
    pub message: String,
    pub backtrace: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct Error {
    is_panic: bool,
    #[serde(flatten)]
    inner: ErrorType,
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[serde(untagged)]
enum ErrorType {
    Known(KnownError),
    Unknown(UnknownError),
}

impl Error {
    /// Build from a panic payload caught with `catch_unwind`.
    pub fn from_panic_payload(panic_payload: Box<dyn std::any::Any + Send + 'static>) -> Self {
        let message = Self::extract_panic_message(panic_payload).unwrap_or_else(|| "<unknown panic>".to_owned());

        Error {
            is_panic: true,
            inner: ErrorType::Unknown(UnknownError {
                message,
                backtrace: None,
            }),
        }
    }

    pub fn extract_panic_message(panic_payload: Box<dyn std::any::Any + Send + 'static>) -> Option<String> {
        panic_payload
            .downcast_ref::<&str>()
            .map(|s| -> String { (*s).to_owned() })
            .or_else(|| panic_payload.downcast_ref::<String>().map(|s| s.to_owned()))
    }

    /// Construct a new UnknownError from a [`String`] message, capturing the
    /// current backtrace.
    pub fn new_non_panic_with_current_backtrace(message: String) -> Self {
        Error {
            inner: ErrorType::Unknown(UnknownError {
                message,
                backtrace: Some(format!("{:?}", backtrace::Backtrace::new())),
            }),
            is_panic: false,
        }
    }

    pub fn new_known(err: KnownError) -> Self {
        Error {
            inner: ErrorType::Known(err),
            is_panic: false,
        }
    }

    pub fn as_known(&self) -> Option<&KnownError> {
        match &self.inner {
            ErrorType::Known(err) => Some(err),
            ErrorType::Unknown(_) => None,
        }
    }

    pub fn message(&self) -> &str {
        match &self.inner {
            ErrorType::Known(err) => &err.message,
            ErrorType::Unknown(err) => &err.message,
        }
    }

    pub fn is_panic(&self) -> bool {
        self.is_panic
    }

    pub fn unwrap_known(self) -> KnownError {
        match self.inner {
            ErrorType::Known(err) => err,
            err @ ErrorType::Unknown(_) => panic!("Expected known error, got {err:?}"),
        }
    }
}

impl From<UnknownError> for Error {
    fn from(unknown_error: UnknownError) -> Self {
        Error {
            inner: ErrorType::Unknown(unknown_error),
            is_panic: false,
        }
    }
}

impl From<KnownError> for Error {
    fn from(known_error: KnownError) -> Self {
        Error {
            is_panic: false,
            inner: ErrorType::Known(known_error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn known_errors_serialize_code_message_and_meta() {
        let err = Error::from(KnownError::new(query_engine::CardinalityViolation { found: 2 }));

        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({
                "is_panic": false,
                "message": "Expected 1 value but got 2",
                "meta": { "found": 2 },
                "error_code": "J2003",
            })
        );
    }

    #[test]
    fn panic_payloads_keep_their_message() {
        let err = Error::from_panic_payload(Box::new("boom"));

        assert!(err.is_panic());
        assert_eq!(err.message(), "boom");
        assert!(err.as_known().is_none());
    }
}
