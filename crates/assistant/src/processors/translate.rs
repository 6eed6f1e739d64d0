//! Translation of classroom material.

use std::sync::Arc;

use async_trait::async_trait;
use eduassist_core::{ActionKind, ActionMetadata, ChatRequest, ParamMap, Result, Session};
use tracing::{debug, info};

use super::{ActionProcessor, ProcessorDeps, context_text};
use crate::params::TranslateParams;

pub const PERSONA: &str = "You are a professional translator. Provide accurate, contextually appropriate \
translations while maintaining the original meaning and tone.";

pub struct TranslateProcessor {
    deps: Arc<ProcessorDeps>,
}

impl TranslateProcessor {
    pub fn new(deps: Arc<ProcessorDeps>) -> Self {
        Self { deps }
    }
}

#[async_trait]
impl ActionProcessor for TranslateProcessor {
    fn kind(&self) -> ActionKind {
        ActionKind::Translate
    }

    async fn process(&self, request: &ChatRequest, session: &Session) -> Result<String> {
        info!(session_id = %session.id, "Processing translation request");
        let params: TranslateParams = self.deps.resolver.resolve(&request.action_params);
        let context = self.deps.context.build_structured_context(request, session);
        let prompt = render(&params, &context, &request.prompt);

        let result = self.deps.complete(self.kind().model_tier(), PERSONA, prompt).await?;
        debug!(
            from = %params.original_language,
            to = %params.target_language,
            chars = result.chars().count(),
            "Translation completed"
        );
        Ok(result)
    }

    fn metadata(&self, request: &ChatRequest) -> ActionMetadata {
        let params: TranslateParams = self.deps.resolver.resolve(&request.action_params);
        ActionMetadata {
            action_type: self.kind().as_str().to_string(),
            original_language: Some(params.original_language),
            target_language: Some(params.target_language),
            tone: Some(params.tone),
            ..Default::default()
        }
    }
}

fn educational_block(context: &ParamMap) -> String {
    if context.is_empty() {
        return String::new();
    }
    let mut out = String::from("Educational Context:\n");
    for (key, label) in [("subject", "Subject"), ("gradeLevel", "Grade Level"), ("lessonTopic", "Lesson Topic")] {
        if let Some(value) = context_text(context, key) {
            out.push_str(&format!("- {label}: {value}\n"));
        }
    }
    out
}

pub fn render(params: &TranslateParams, context: &ParamMap, content: &str) -> String {
    format!(
        "You are a professional educational translator specializing in classroom materials.\n\
\n\
{educational}\n\
\n\
Translation Requirements:\n\
- Translate from {from} to {to}\n\
- Maintain a {tone} tone appropriate for educational settings\n\
- Preserve educational terminology and concepts\n\
- Ensure age-appropriate language for the target audience\n\
- Keep formatting and structure intact\n\
\n\
Text to translate: {content}\n\
\n\
Important: Provide only the translation without explanations unless specifically requested.\n",
        educational = educational_block(context),
        from = params.original_language,
        to = params.target_language,
        tone = params.tone,
    )
}
