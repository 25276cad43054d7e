//! Provider error types.
//!
//! The enum is defined in `quiztutor-core` so the generator can classify
//! failures; it is re-exported here for provider implementations.

pub use quiztutor_core::error::ProviderError;
