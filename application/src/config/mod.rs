//! Application-level configuration.
//!
//! This module provides frozen configuration types that control how use
//! cases behave:
//!
//! - [`LifecycleConfig`] - default and per-agent-type lifecycle profiles
//! - [`CollectiveConfig`] - wake policy for the collective coordinator
//! - [`ConsultationParams`] - rounds, timeouts and moderator for consultations

pub mod consultation_params;
pub mod lifecycle_config;

pub use consultation_params::ConsultationParams;
pub use lifecycle_config::{CollectiveConfig, LifecycleConfig};
