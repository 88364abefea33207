//! Alibaba Cloud Simple Log Service (SLS) integration.

pub mod client;
pub mod error;
pub mod proto;
pub mod signer;

pub use client::SlsLogStore;
pub use error::SlsError;
