//! The educator chat pipeline: parameter resolution, context assembly,
//! action processors, session handling and the orchestrator tying them together.

pub mod bootstrap;
pub mod context;
pub mod orchestrator;
pub mod params;
pub mod processors;
pub mod prompts;
pub mod sessions;

pub use bootstrap::build;
pub use context::ContextBuilder;
pub use orchestrator::{Orchestrator, validate_request};
pub use params::ParameterResolver;
pub use processors::{ActionProcessor, ProcessorRegistry};
pub use prompts::CatalogSuggester;
pub use sessions::SessionManager;
