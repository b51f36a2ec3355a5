//! Notification sinks for synchronizer state changes.
//!
//! - `TracingSink` logs every change with structured fields
//! - `BroadcastSink` fans changes out to live subscribers (API streams, tests)
//! - `FanoutSink` forwards to several sinks in order

pub mod broadcast;
pub mod fanout;
pub mod log;

pub use broadcast::BroadcastSink;
pub use fanout::FanoutSink;
pub use log::TracingSink;
