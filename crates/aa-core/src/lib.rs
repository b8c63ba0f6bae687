//! Shared types for the batch action compactor: actions, errors and codec
//! configuration.

pub mod action;
pub mod config;
pub mod error;

pub use action::Action;
pub use config::CodecConfig;
pub use error::{CompactError, Result};

pub use alloy_primitives::{Address, Bytes, U256};
