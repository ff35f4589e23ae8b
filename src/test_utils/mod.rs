//! Test utilities.
//!
//! This module provides:
//! - In-memory repository implementations for mocking persistence
//! - A recording chat model for asserting prompt construction
//! - `TestAppStateBuilder` for HTTP-level tests

mod app_state_builder;
mod repo_mocks;

pub use app_state_builder::*;
pub use repo_mocks::*;
