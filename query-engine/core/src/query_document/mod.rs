//! Selection trees as written in a query, and their resolution against the
//! field registries of the entities.

mod error;
mod parser;
mod request;
mod selection;

pub use error::*;
pub use parser::*;
pub use request::*;
pub use selection::*;

/// One executable operation of a document, with fragments and directives
/// already expanded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operation {
    pub name: Option<String>,
    pub selections: Vec<Selection>,
}

impl Operation {
    pub fn new(name: Option<String>, selections: Vec<Selection>) -> Self {
        Self { name, selections }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }
}
