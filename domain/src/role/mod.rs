//! Consultation roles
//!
//! A [`RoleAgent`] is an immutable consultant profile: title, capability
//! tags and the system prompt that establishes its perspective. The
//! [`RoleRegistry`] holds the available roles and performs automatic
//! selection for a query.

pub mod entities;
pub mod registry;

pub use entities::{RoleAgent, RoleId};
pub use registry::RoleRegistry;
