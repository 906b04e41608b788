use super::{Argument, ScalarType};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OutputType {
    Scalar(ScalarType),

    /// Reference to an object type by name.
    Object(String),
    List(Box<OutputType>),
    NonNull(Box<OutputType>),
}

impl OutputType {
    pub fn scalar(scalar: ScalarType) -> Self {
        OutputType::Scalar(scalar)
    }

    pub fn object(name: impl Into<String>) -> Self {
        OutputType::Object(name.into())
    }

    pub fn list(containing: OutputType) -> Self {
        OutputType::List(Box::new(containing))
    }

    pub fn non_null(self) -> Self {
        match self {
            OutputType::NonNull(_) => self,
            other => OutputType::NonNull(Box::new(other)),
        }
    }

    pub fn nullable(self) -> Self {
        match self {
            OutputType::NonNull(inner) => *inner,
            other => other,
        }
    }

    pub fn is_nullable(&self) -> bool {
        !matches!(self, OutputType::NonNull(_))
    }

    /// Name of the innermost named type.
    pub fn named_type(&self) -> String {
        match self {
            OutputType::Scalar(s) => s.to_string(),
            OutputType::Object(name) => name.clone(),
            OutputType::List(inner) | OutputType::NonNull(inner) => inner.named_type(),
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputType::Scalar(s) => s.fmt(f),
            OutputType::Object(name) => f.write_str(name),
            OutputType::List(inner) => write!(f, "[{inner}]"),
            OutputType::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputField {
    pub name: String,
    pub arguments: Vec<Argument>,
    pub field_type: OutputType,
}

impl OutputField {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn field_type(&self) -> &OutputType {
        &self.field_type
    }

    pub fn find_argument(&self, name: &str) -> Option<&Argument> {
        self.arguments.iter().find(|arg| arg.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectType {
    pub name: String,
    fields: Vec<OutputField>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>, fields: Vec<OutputField>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_fields(&self) -> &[OutputField] {
        &self.fields
    }

    pub fn find_field(&self, name: &str) -> Option<&OutputField> {
        self.fields.iter().find(|f| f.name == name)
    }
}
