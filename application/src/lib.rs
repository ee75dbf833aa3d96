//! Application layer for agora
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{CollectiveConfig, ConsultationParams, LifecycleConfig};
pub use ports::{
    event_bus::{EventBus, NoEventBus},
    event_journal::{EventJournal, NoEventJournal},
    llm_gateway::{GatewayError, InvocationRequest, LlmGateway},
    progress::{ConsultationProgress, NoProgress},
    wake_signal::{NoWakeSignals, WakeSignalSource},
};
pub use use_cases::collective_coordinator::{AgentSnapshot, CollectiveCoordinator};
pub use use_cases::lifecycle_controller::{
    LifecycleController, TransitionError, TransitionOutcome,
};
pub use use_cases::run_consultation::{
    ConsultInput, ConsultationError, ConsultationOrchestrator,
};
