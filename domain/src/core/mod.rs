//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`] - identifier of the LLM backing a role
//! - [`query::Query`] - a validated query to pose to a consultation
//! - [`error::DomainError`] - domain-level errors

pub mod error;
pub mod model;
pub mod query;
pub mod string;
pub mod time;
