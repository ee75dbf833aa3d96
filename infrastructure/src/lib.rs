//! Infrastructure layer for agora
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod events;
pub mod logging;
pub mod providers;

// Re-export commonly used types
pub use config::{
    ConfigError, ConfigLoader, FileCollectiveConfig, FileConfig, FileConsultationConfig,
    FileGatewayConfig, FileJournalConfig, FileLifecycleConfig,
};
pub use events::ChannelEventBus;
pub use logging::JsonlEventJournal;
#[cfg(feature = "http-gateway")]
pub use providers::HttpLlmGateway;
