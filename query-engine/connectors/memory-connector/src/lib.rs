//! An in-memory data source for the join engine.
//!
//! Tables, their rows and the relationships between them are declared in a
//! datamodel file. Relationships without an explicit join are joined along the
//! single foreign key connecting the two tables.

#![deny(unsafe_code, rust_2018_idioms)]

#[macro_use]
extern crate tracing;

mod builder;
mod database;
mod datamodel;
mod error;
mod query;

pub use builder::MemoryConnector;
pub use database::{Column, Database, FetchLog, Table, TableFetcher};
pub use datamodel::*;
pub use error::DatamodelError;
pub use query::{Condition, TableQuery};

pub type Result<T> = std::result::Result<T, DatamodelError>;
