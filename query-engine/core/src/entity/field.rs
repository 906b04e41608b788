use crate::{
    schema::{Argument, OutputType, ScalarType},
    RelationshipField,
};
use std::sync::Arc;

pub type FieldRef = Arc<Field>;

/// A field of an entity: either a value read straight from a fetched row, or
/// a relationship resolved by fetching another entity.
#[derive(Debug)]
pub enum Field {
    Immediate(ImmediateField),
    Relationship(RelationshipField),
}

impl Field {
    pub fn is_relationship(&self) -> bool {
        matches!(self, Field::Relationship(_))
    }

    pub fn as_immediate(&self) -> Option<&ImmediateField> {
        match self {
            Field::Immediate(f) => Some(f),
            Field::Relationship(_) => None,
        }
    }

    pub fn as_relationship(&self) -> Option<&RelationshipField> {
        match self {
            Field::Relationship(r) => Some(r),
            Field::Immediate(_) => None,
        }
    }

    /// Internal fields can be joined on but are not part of the schema.
    pub fn is_internal(&self) -> bool {
        match self {
            Field::Immediate(f) => f.is_internal(),
            Field::Relationship(r) => r.is_internal(),
        }
    }

    pub fn arguments(&self) -> Vec<&Argument> {
        match self {
            Field::Immediate(f) => f.arguments().iter().collect(),
            Field::Relationship(r) => r.arguments().collect(),
        }
    }
}

impl From<ImmediateField> for Field {
    fn from(field: ImmediateField) -> Self {
        Field::Immediate(field)
    }
}

impl From<RelationshipField> for Field {
    fn from(field: RelationshipField) -> Self {
        Field::Relationship(field)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImmediateField {
    column: String,
    scalar_type: ScalarType,
    required: bool,
    arguments: Vec<Argument>,
    internal: bool,
}

impl ImmediateField {
    /// A nullable field reading `column`.
    pub fn new(column: impl Into<String>, scalar_type: ScalarType) -> Self {
        Self {
            column: column.into(),
            scalar_type,
            required: false,
            arguments: Vec::new(),
            internal: false,
        }
    }

    pub fn int(column: impl Into<String>) -> Self {
        Self::new(column, ScalarType::Int)
    }

    pub fn string(column: impl Into<String>) -> Self {
        Self::new(column, ScalarType::String)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn internal(mut self) -> Self {
        self.internal = true;
        self
    }

    pub fn argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Opaque name the fetch collaborator reads the value from.
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn scalar_type(&self) -> ScalarType {
        self.scalar_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_internal(&self) -> bool {
        self.internal
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn field_type(&self) -> OutputType {
        let typ = OutputType::scalar(self.scalar_type);

        if self.required {
            typ.non_null()
        } else {
            typ
        }
    }
}
