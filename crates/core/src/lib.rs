//! # EduAssist Core
//!
//! Domain types, traits, and error definitions for the EduAssist educator
//! chat pipeline. This crate has **zero framework dependencies**: it defines
//! the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is defined as a trait here. Implementations
//! live in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod action;
pub mod chat;
pub mod error;
pub mod message;
pub mod prompts;
pub mod provider;
pub mod session;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use action::{ActionKind, ModelTier, ParamMap};
pub use chat::{ActionMetadata, ChatRequest, ChatResponse, MessageView, ResponseStatus, SessionView};
pub use error::{Error, ProviderError, Result, StoreError};
pub use message::{Message, Sender};
pub use prompts::PromptSuggester;
pub use provider::{CompletionRequest, Provider};
pub use session::Session;
pub use store::SessionStore;
