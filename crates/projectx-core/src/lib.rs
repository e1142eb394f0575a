//! # projectx-core
//!
//! Core crate for the ProjectX admin backend. Contains configuration
//! schemas, page and sort types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other ProjectX crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
