//! Action processors: one per [`ActionKind`], plus the generic chat path.
//!
//! Each processor resolves its typed parameters, merges the educational
//! context, fills its fixed template and makes exactly one completion call.

pub mod questions;
pub mod rewrite;
pub mod summarize;
pub mod translate;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use eduassist_config::ModelsConfig;
use eduassist_core::chat::value_as_text;
use eduassist_core::{
    ActionKind, ActionMetadata, ChatRequest, CompletionRequest, ModelTier, ParamMap, Provider,
    Result, Session,
};
use tracing::debug;

use crate::context::ContextBuilder;
use crate::params::ParameterResolver;

pub use questions::QuestionGenerationProcessor;
pub use rewrite::RewriteProcessor;
pub use summarize::SummarizeProcessor;
pub use translate::TranslateProcessor;

pub const GENERAL_PERSONA: &str = "You are a helpful AI assistant designed to help educators and students. \
Provide clear, educational, and engaging responses.";

/// Turns one action request into generated text.
#[async_trait]
pub trait ActionProcessor: Send + Sync {
    fn kind(&self) -> ActionKind;

    /// Run the action and return the raw completion text.
    async fn process(&self, request: &ChatRequest, session: &Session) -> Result<String>;

    /// The resolved parameters worth echoing back to the client.
    fn metadata(&self, request: &ChatRequest) -> ActionMetadata;
}

/// Collaborators every processor needs.
pub struct ProcessorDeps {
    pub provider: Arc<dyn Provider>,
    pub resolver: Arc<ParameterResolver>,
    pub context: Arc<ContextBuilder>,
    pub models: ModelsConfig,
}

impl ProcessorDeps {
    /// One completion call with the model settings of `tier`.
    pub async fn complete(&self, tier: ModelTier, persona: &str, prompt: String) -> Result<String> {
        let model = self.models.for_tier(tier);
        debug!(
            model = %model.name,
            provider = %self.provider.name(),
            prompt_chars = prompt.chars().count(),
            "Dispatching completion"
        );
        let text = self
            .provider
            .complete(CompletionRequest {
                model: model.name.clone(),
                system: Some(persona.to_string()),
                prompt,
                temperature: model.temperature,
                max_tokens: Some(model.max_tokens),
            })
            .await?;
        Ok(text)
    }

    pub fn model_name(&self, tier: ModelTier) -> &str {
        &self.models.for_tier(tier).name
    }
}

/// Processors keyed by kind.
pub struct ProcessorRegistry {
    processors: HashMap<ActionKind, Arc<dyn ActionProcessor>>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self {
            processors: HashMap::new(),
        }
    }

    /// The four built-in processors sharing one set of collaborators.
    pub fn with_defaults(deps: Arc<ProcessorDeps>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(TranslateProcessor::new(deps.clone())));
        registry.register(Arc::new(SummarizeProcessor::new(deps.clone())));
        registry.register(Arc::new(RewriteProcessor::new(deps.clone())));
        registry.register(Arc::new(QuestionGenerationProcessor::new(deps)));
        registry
    }

    pub fn register(&mut self, processor: Arc<dyn ActionProcessor>) {
        self.processors.insert(processor.kind(), processor);
    }

    pub fn get(&self, kind: ActionKind) -> Option<Arc<dyn ActionProcessor>> {
        self.processors.get(&kind).cloned()
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Generic chat: the assembled context prompt with the general persona.
pub async fn generic_chat(deps: &ProcessorDeps, request: &ChatRequest, session: &Session) -> Result<String> {
    let prompt = deps.context.build_prompt(request, session).await?;
    deps.complete(ModelTier::Standard, GENERAL_PERSONA, prompt).await
}

/// `SOME_VALUE` -> `SOME VALUE`.
pub(crate) fn humanize(value: &str) -> String {
    value.replace('_', " ")
}

/// Context value as text, if present and scalar.
pub(crate) fn context_text(context: &ParamMap, key: &str) -> Option<String> {
    context.get(key).and_then(value_as_text)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use eduassist_core::ProviderError;
    use eduassist_store::InMemoryStore;
    use std::sync::Mutex;

    /// Records every request and answers with a fixed reply.
    pub struct RecordingProvider {
        pub reply: String,
        pub requests: Mutex<Vec<CompletionRequest>>,
    }

    impl RecordingProvider {
        pub fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.into(),
                requests: Mutex::new(Vec::new()),
            })
        }

        pub fn last(&self) -> CompletionRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Provider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        async fn complete(&self, request: CompletionRequest) -> std::result::Result<String, ProviderError> {
            self.requests.lock().unwrap().push(request);
            Ok(self.reply.clone())
        }
    }

    pub fn deps(provider: Arc<RecordingProvider>) -> Arc<ProcessorDeps> {
        Arc::new(ProcessorDeps {
            provider,
            resolver: Arc::new(ParameterResolver::builtin()),
            context: Arc::new(ContextBuilder::new(Arc::new(InMemoryStore::new()))),
            models: ModelsConfig::default(),
        })
    }

    pub fn request(action: &str, params: serde_json::Value, context: serde_json::Value) -> ChatRequest {
        let mut request = ChatRequest::new("teacher-1", "The mitochondria is the powerhouse of the cell.");
        request.action_type = Some(action.into());
        if let serde_json::Value::Object(map) = params {
            request.action_params = map;
        }
        if let serde_json::Value::Object(map) = context {
            request.educational_context = map;
        }
        request
    }
}
