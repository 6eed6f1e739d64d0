//! Summaries of instructional text.

use std::sync::Arc;

use async_trait::async_trait;
use eduassist_core::{ActionKind, ActionMetadata, ChatRequest, ParamMap, Result, Session};
use tracing::info;

use super::{ActionProcessor, ProcessorDeps, context_text, humanize};
use crate::params::SummarizeParams;

pub const PERSONA: &str = "You are an expert at creating concise, informative summaries. \
Extract key points and present them clearly.";

pub struct SummarizeProcessor {
    deps: Arc<ProcessorDeps>,
}

impl SummarizeProcessor {
    pub fn new(deps: Arc<ProcessorDeps>) -> Self {
        Self { deps }
    }
}

#[async_trait]
impl ActionProcessor for SummarizeProcessor {
    fn kind(&self) -> ActionKind {
        ActionKind::Summarize
    }

    async fn process(&self, request: &ChatRequest, session: &Session) -> Result<String> {
        info!(session_id = %session.id, "Processing summarization request");
        let params: SummarizeParams = self.deps.resolver.resolve(&request.action_params);
        let context = self.deps.context.build_structured_context(request, session);
        let prompt = render(&params, &context, &request.prompt);
        self.deps.complete(self.kind().model_tier(), PERSONA, prompt).await
    }

    fn metadata(&self, request: &ChatRequest) -> ActionMetadata {
        let params: SummarizeParams = self.deps.resolver.resolve(&request.action_params);
        ActionMetadata {
            action_type: self.kind().as_str().to_string(),
            summary_type: Some(params.summary_type),
            ..Default::default()
        }
    }
}

fn educational_block(context: &ParamMap) -> String {
    if context.is_empty() {
        return String::new();
    }
    format!(
        "Educational Context: Subject - {}, Grade Level - {}\n",
        context_text(context, "subject").unwrap_or_else(|| "General".into()),
        context_text(context, "gradeLevel").unwrap_or_else(|| "General".into()),
    )
}

pub fn render(params: &SummarizeParams, context: &ParamMap, content: &str) -> String {
    format!(
        "You are an expert educational content summarizer.\n\
\n\
{educational}\n\
\n\
Summarization Requirements:\n\
- Create a {summary_type} summary\n\
- Focus on {focus}\n\
- Limit to approximately {max_length} words\n\
- Make it suitable for educational purposes\n\
- Highlight key learning objectives if present\n\
- Use clear, accessible language\n\
\n\
Content to summarize: {content}\n",
        educational = educational_block(context),
        summary_type = humanize(&params.summary_type.to_lowercase()),
        focus = humanize(&params.focus_area),
        max_length = params.max_length,
    )
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_type_and_focus_are_humanized() {
        let params = SummarizeParams {
            summary_type: "BULLET_POINTS".into(),
            max_length: 120,
            focus_area: "key_vocabulary".into(),
        };
        let prompt = render(&params, &ParamMap::new(), "Long chapter text");
        assert!(prompt.contains("- Create a bullet points summary\n"));
        assert!(prompt.contains("- Focus on key vocabulary\n"));
        assert!(prompt.contains("- Limit to approximately 120 words\n"));
        assert!(prompt.ends_with("Content to summarize: Long chapter text\n"));
    }

    #[test]
    fn missing_subject_defaults_to_general() {
        let mut context = ParamMap::new();
        context.insert("gradeLevel".into(), json!("8"));
        let block = educational_block(&context);
        assert_eq!(block, "Educational Context: Subject - General, Grade Level - 8\n");
    }

    #[tokio::test]
    async fn process_sends_default_template() {
        let provider = RecordingProvider::new("A short summary.");
        let processor = SummarizeProcessor::new(deps(provider.clone()));
        let request = request("summarize", json!({}), json!({"subject": "Biology"}));
        let session = Session::new("teacher-1", "x", "English");

        processor.process(&request, &session).await.unwrap();
        let sent = provider.last();
        assert_eq!(sent.model, "gpt-3.5-turbo");
        assert!(sent.prompt.contains("- Create a paragraph summary\n"));
        assert!(sent.prompt.contains("- Focus on main ideas\n"));
        assert!(sent.prompt.contains("Subject - Biology"));
    }

    #[test]
    fn metadata_reports_summary_type() {
        let processor = SummarizeProcessor::new(deps(RecordingProvider::new("x")));
        let meta = processor.metadata(&request("SUMMARIZE", json!({"summaryType": "OUTLINE"}), json!({})));
        assert_eq!(meta.summary_type.as_deref(), Some("OUTLINE"));
        assert_eq!(meta.action_type, "SUMMARIZE");
    }
}
