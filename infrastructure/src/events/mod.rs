//! Event bus adapters
//!
//! - [`ChannelEventBus`] - in-process pub/sub on tokio broadcast channels

mod channel_bus;

pub use channel_bus::ChannelEventBus;
