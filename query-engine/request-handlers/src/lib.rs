//! Entry point of the engine for GraphQL requests: turns a request body into
//! an operation, answers introspection, runs the operation through a
//! `QueryExecutor` and wraps the outcome in a response envelope.

#![deny(unsafe_code, rust_2018_idioms)]

#[macro_use]
extern crate tracing;

mod error;
mod handler;
mod introspection;
mod protocols;
mod response;

pub use error::HandlerError;
pub use handler::*;
pub use protocols::graphql::*;
pub use response::*;

pub type Result<T> = std::result::Result<T, HandlerError>;
