use crate::FieldRef;
use indexmap::IndexMap;
use join_value::JoinValue;

/// Coerced argument values by argument name, in the order they were given.
pub type Arguments = IndexMap<String, JoinValue>;

/// A selection resolved against a field registry: the field is identified, its
/// arguments are coerced and its subselections are merged and resolved.
#[derive(Debug, Clone)]
pub struct Request {
    key: String,
    field_name: String,
    field: FieldRef,
    arguments: Arguments,
    selections: Vec<Request>,
}

impl Request {
    pub fn new(key: impl Into<String>, field_name: impl Into<String>, field: FieldRef) -> Self {
        Self {
            key: key.into(),
            field_name: field_name.into(),
            field,
            arguments: Arguments::new(),
            selections: Vec::new(),
        }
    }

    pub fn with_arguments(mut self, arguments: Arguments) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn with_selections(mut self, selections: Vec<Request>) -> Self {
        self.selections = selections;
        self
    }

    /// Name of the value in the assembled result.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn field(&self) -> &FieldRef {
        &self.field
    }

    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    pub fn selections(&self) -> &[Request] {
        &self.selections
    }
}
