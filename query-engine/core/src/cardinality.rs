use crate::{schema::OutputType, CoreError, CoreResult, Item};

/// Turns the related values of one parent into the value of a relationship
/// field, and decides the published type of that field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// Exactly one value. Zero or several values are an error.
    Single,

    /// Null for zero values, the value for one, an error for several.
    SingleOrNull,

    /// Null for zero values, the first in fetch order otherwise.
    FirstOrNull,

    /// All values as a list, never null.
    Many,
}

impl Cardinality {
    pub fn apply(self, mut values: Vec<Item>) -> CoreResult<Item> {
        match (self, values.len()) {
            (Cardinality::Many, _) => Ok(Item::List(values)),
            (Cardinality::Single, 1) | (Cardinality::SingleOrNull, 1) => Ok(values.swap_remove(0)),
            (Cardinality::SingleOrNull, 0) | (Cardinality::FirstOrNull, 0) => Ok(Item::null()),
            (Cardinality::FirstOrNull, _) => Ok(values.swap_remove(0)),
            (Cardinality::Single, found) | (Cardinality::SingleOrNull, found) => {
                Err(CoreError::CardinalityViolation { found })
            }
        }
    }

    /// Wraps the non-null type of one related value into the type of the
    /// relationship field.
    pub fn wrap_type(self, target: OutputType) -> OutputType {
        match self {
            Cardinality::Single => target,
            Cardinality::SingleOrNull | Cardinality::FirstOrNull => target.nullable(),
            Cardinality::Many => OutputType::list(target).non_null(),
        }
    }
}
