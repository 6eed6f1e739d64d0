//! Rewriting content for a different audience, tone or purpose.

use std::sync::Arc;

use async_trait::async_trait;
use eduassist_core::chat::value_as_text;
use eduassist_core::{ActionKind, ActionMetadata, ChatRequest, ParamMap, Result, Session};
use tracing::info;

use super::{ActionProcessor, ProcessorDeps, humanize};
use crate::params::RewriteParams;

pub const PERSONA: &str = "You are an expert writer and editor. Rewrite content to improve clarity, \
tone, and effectiveness while maintaining the original meaning.";

pub struct RewriteProcessor {
    deps: Arc<ProcessorDeps>,
}

impl RewriteProcessor {
    pub fn new(deps: Arc<ProcessorDeps>) -> Self {
        Self { deps }
    }
}

#[async_trait]
impl ActionProcessor for RewriteProcessor {
    fn kind(&self) -> ActionKind {
        ActionKind::Rewrite
    }

    async fn process(&self, request: &ChatRequest, session: &Session) -> Result<String> {
        info!(session_id = %session.id, "Processing rewriting request");
        let params: RewriteParams = self.deps.resolver.resolve(&request.action_params);
        let context = self.deps.context.build_structured_context(request, session);
        let prompt = render(&params, &context, &request.prompt);
        self.deps.complete(self.kind().model_tier(), PERSONA, prompt).await
    }

    fn metadata(&self, request: &ChatRequest) -> ActionMetadata {
        let params: RewriteParams = self.deps.resolver.resolve(&request.action_params);
        ActionMetadata {
            action_type: self.kind().as_str().to_string(),
            tone: Some(params.tone),
            ..Default::default()
        }
    }
}

/// Every scalar context entry, one per line.
fn educational_block(context: &ParamMap) -> String {
    if context.is_empty() {
        return String::new();
    }
    let mut out = String::from("Educational Context:\n");
    for (key, value) in context {
        if let Some(value) = value_as_text(value) {
            out.push_str(&format!("- {key}: {value}\n"));
        }
    }
    out
}

pub fn render(params: &RewriteParams, context: &ParamMap, content: &str) -> String {
    format!(
        "You are an expert educational content editor and writer.\n\
\n\
{educational}\n\
\n\
Rewriting Requirements:\n\
- Target Audience: {audience}\n\
- Tone: {tone}\n\
- Purpose: {purpose}\n\
- Maintain educational value and accuracy\n\
- Improve clarity and engagement\n\
- Use age-appropriate vocabulary\n\
- Preserve key learning objectives\n\
\n\
Content to rewrite: {content}\n",
        educational = educational_block(context),
        audience = humanize(&params.target_audience),
        tone = humanize(&params.tone),
        purpose = humanize(&params.purpose),
    )
}
