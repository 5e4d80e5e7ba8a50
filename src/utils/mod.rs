//! # Utility Modules
//!
//! Supporting utilities shared by the codec.
//!
//! ## Components
//! - **Logging**: Structured logging setup for applications and tools
//! - **Metrics**: Thread-safe encode/decode counters

pub mod logging;
pub mod metrics;
