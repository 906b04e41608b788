use crate::UserFacingError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct QueryParsingFailed {
    /// Error(s) encountered when trying to parse a query in the query engine
    pub query_parsing_error: String,
}

impl UserFacingError for QueryParsingFailed {
    const ERROR_CODE: &'static str = "J2000";

    fn message(&self) -> String {
        format!("Failed to parse the query: {}", self.query_parsing_error)
    }
}

#[derive(Debug, Serialize)]
pub struct QueryValidationFailed {
    /// Error(s) encountered when trying to validate a query in the query engine
    pub query_validation_error: String,

    /// Dotted path of the selection or argument that failed validation
    pub query_path: String,
}

impl UserFacingError for QueryValidationFailed {
    const ERROR_CODE: &'static str = "J2001";

    fn message(&self) -> String {
        format!(
            "Failed to validate the query at `{}`: {}",
            self.query_path, self.query_validation_error
        )
    }
}

#[derive(Debug, Serialize)]
pub struct UnknownDirective {
    pub directive_name: String,
}

impl UserFacingError for UnknownDirective {
    const ERROR_CODE: &'static str = "J2002";

    fn message(&self) -> String {
        format!("Unknown directive `@{}`", self.directive_name)
    }
}

#[derive(Debug, Serialize)]
pub struct CardinalityViolation {
    /// Number of related values found for a relationship that requires exactly one
    pub found: usize,
}

impl UserFacingError for CardinalityViolation {
    const ERROR_CODE: &'static str = "J2003";

    fn message(&self) -> String {
        format!("Expected 1 value but got {}", self.found)
    }
}

#[derive(Debug, Serialize)]
pub struct FetchFailed {
    pub details: String,
}

impl UserFacingError for FetchFailed {
    const ERROR_CODE: &'static str = "J2004";

    fn message(&self) -> String {
        format!("Fetching rows failed: {}", self.details)
    }
}

#[derive(Debug, Serialize)]
pub struct UnsupportedFeature {
    pub feature_name: String,
    pub message: String,
}

impl UserFacingError for UnsupportedFeature {
    const ERROR_CODE: &'static str = "J2005";

    fn message(&self) -> String {
        format!("Unsupported feature: {}. {}", self.feature_name, self.message)
    }
}
