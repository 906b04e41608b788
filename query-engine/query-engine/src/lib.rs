#![deny(unsafe_code, rust_2018_idioms)]

pub mod cli;
pub mod error;
pub mod logger;
pub mod opt;

use error::JoinEngineError;

#[macro_use]
extern crate tracing;

pub type JoinEngineResult<T> = Result<T, JoinEngineError>;

#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub enum LogFormat {
    Text,
    Json,
}
