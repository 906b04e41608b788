use crate::UserFacingError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SchemaParserError {
    pub full_error: String,
}

impl UserFacingError for SchemaParserError {
    const ERROR_CODE: &'static str = "J1000";

    fn message(&self) -> String {
        format!("Error parsing the datamodel:\n{}", self.full_error)
    }
}

#[derive(Debug, Serialize)]
pub struct AmbiguousJoin {
    /// Entity the relationship is declared on
    pub parent: String,

    /// Entity the relationship points to
    pub target: String,

    /// Number of foreign keys that could correlate the two entities
    pub candidates: usize,
}

impl UserFacingError for AmbiguousJoin {
    const ERROR_CODE: &'static str = "J1001";

    fn message(&self) -> String {
        format!(
            "Cannot infer the join between `{}` and `{}`: found {} candidate foreign keys, expected exactly one. Declare the join explicitly.",
            self.parent, self.target, self.candidates
        )
    }
}
