pub(crate) mod nested_read;
pub(crate) mod read;

pub use nested_read::RelationshipResults;
