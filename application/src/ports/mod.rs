//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod event_bus;
pub mod event_journal;
pub mod llm_gateway;
pub mod progress;
pub mod wake_signal;
