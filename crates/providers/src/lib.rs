//! Completion provider implementations for EduAssist.
//!
//! All providers implement the `eduassist_core::Provider` trait.
//! The router selects the correct provider based on configuration.

pub mod openai_compat;
pub mod router;
pub mod timeout;

pub use openai_compat::OpenAiCompatProvider;
pub use router::{ProviderRouter, build_from_config};
pub use timeout::TimeoutProvider;
