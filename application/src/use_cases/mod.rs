//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod collective_coordinator;
pub mod lifecycle_controller;
pub mod run_consultation;
