//! Assessment question generation.

use std::sync::Arc;

use async_trait::async_trait;
use eduassist_core::{ActionKind, ActionMetadata, ChatRequest, ParamMap, Result, Session};
use tracing::{debug, info};

use super::{ActionProcessor, ProcessorDeps, context_text};
use crate::params::QuestionParams;

pub const PERSONA: &str = "You are an expert in educational assessment and question design. \
Create well-structured, thought-provoking questions that assess understanding at various cognitive levels.";

pub struct QuestionGenerationProcessor {
    deps: Arc<ProcessorDeps>,
}

impl QuestionGenerationProcessor {
    pub fn new(deps: Arc<ProcessorDeps>) -> Self {
        Self { deps }
    }
}

#[async_trait]
impl ActionProcessor for QuestionGenerationProcessor {
    fn kind(&self) -> ActionKind {
        ActionKind::QuestionGeneration
    }

    async fn process(&self, request: &ChatRequest, session: &Session) -> Result<String> {
        info!(session_id = %session.id, "Processing question generation request");
        let params: QuestionParams = self.deps.resolver.resolve(&request.action_params);
        let context = self.deps.context.build_structured_context(request, session);
        let prompt = render(&params, &context, &request.prompt);

        let result = self.deps.complete(self.kind().model_tier(), PERSONA, prompt).await?;
        debug!(
            count = params.question_count,
            difficulty = %params.difficulty_level,
            "Generated questions"
        );
        Ok(result)
    }

    fn metadata(&self, request: &ChatRequest) -> ActionMetadata {
        let params: QuestionParams = self.deps.resolver.resolve(&request.action_params);
        ActionMetadata {
            action_type: self.kind().as_str().to_string(),
            question_count: Some(params.question_count),
            ..Default::default()
        }
    }
}

/// The assessment header is always present, even with no context.
fn educational_block(context: &ParamMap) -> String {
    let mut out = String::from("Educational Assessment Context:\n");
    let fields = [
        ("subject", "Subject"),
        ("gradeLevel", "Grade Level"),
        ("lessonTopic", "Lesson Topic"),
        ("duration", "Assessment Duration"),
    ];
    for (key, label) in fields {
        if let Some(value) = context_text(context, key) {
            out.push_str(&format!("- {label}: {value}\n"));
        }
    }
    out
}

pub fn render(params: &QuestionParams, context: &ParamMap, content: &str) -> String {
    format!(
        "You are an expert educational assessment designer with deep knowledge of pedagogy and learning objectives.\n\
\n\
{educational}\n\
\n\
Question Generation Requirements:\n\
- Generate {count} educational questions\n\
- Difficulty Level: {difficulty}\n\
- Question Types: {types}\n\
- Cognitive Levels: {levels}\n\
\n\
Guidelines:\n\
- Align questions with learning objectives\n\
- Use Bloom's Taxonomy for cognitive levels\n\
- Provide clear, unambiguous questions\n\
- Include answer keys or rubrics where appropriate\n\
- Ensure questions are age-appropriate\n\
- Mix different question types for comprehensive assessment\n\
\n\
Content for question generation: {content}\n\
\n\
Format your response with:\n\
1. Question number and type\n\
2. The actual question\n\
3. Answer options (for multiple choice)\n\
4. Correct answer or key points (for other types)\n",
        educational = educational_block(context),
        count = params.question_count,
        difficulty = params.difficulty_level,
        types = params.question_types.join(", "),
        levels = params.cognitive_level.join(", "),
    )
}
