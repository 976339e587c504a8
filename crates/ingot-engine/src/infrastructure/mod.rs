//! Infrastructure Layer
//!
//! Adapters implementing the application's ports:
//!
//! - **paper**: in-memory simulated broker for development and tests

pub mod paper;

pub use paper::PaperBroker;
