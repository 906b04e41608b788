#![deny(unsafe_code, rust_2018_idioms)]

#[macro_use]
extern crate tracing;

pub mod cardinality;
pub mod connector;
pub mod context;
pub mod entity;
pub mod error;
pub mod executor;
pub mod query_document;
pub mod response_ir;
pub mod schema;

mod interpreter;

#[cfg(test)]
mod test_fixtures;

pub use cardinality::*;
pub use connector::*;
pub use context::*;
pub use entity::*;
pub use error::*;
pub use executor::*;
pub use query_document::*;
pub use response_ir::*;
pub use schema::*;

pub use interpreter::RelationshipResults;

pub use join_value::JoinValue;

pub type CoreResult<T> = Result<T, CoreError>;
