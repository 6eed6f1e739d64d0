//! The chat pipeline.
//!
//! A request moves through validation, session resolution, user-message
//! persistence, generation, assistant-message persistence and completion.
//! Any failure ends the request with an error response; nothing is retried.

use std::sync::Arc;

use chrono::Utc;
use eduassist_config::ModelsConfig;
use eduassist_core::chat::MAX_PROMPT_CHARS;
use eduassist_core::{
    ActionKind, ActionMetadata, ChatRequest, ChatResponse, Error, Message, ModelTier,
    PromptSuggester, Provider, ResponseStatus, Result, SessionStore, SessionView,
};
use tracing::{debug, error, info, warn};

use crate::context::{ContextBuilder, estimate_tokens};
use crate::params::{ParameterResolver, content_advisories};
use crate::processors::{ProcessorDeps, ProcessorRegistry, generic_chat};
use crate::sessions::SessionManager;

const FAILURE_PREFIX: &str = "An error occurred while processing your request: ";

/// Coordinates one chat turn over injected collaborators. Holds no state of its own.
pub struct Orchestrator {
    sessions: SessionManager,
    registry: ProcessorRegistry,
    deps: Arc<ProcessorDeps>,
    suggester: Arc<dyn PromptSuggester>,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn SessionStore>,
        provider: Arc<dyn Provider>,
        resolver: ParameterResolver,
        models: ModelsConfig,
        suggester: Arc<dyn PromptSuggester>,
    ) -> Self {
        let deps = Arc::new(ProcessorDeps {
            provider,
            resolver: Arc::new(resolver),
            context: Arc::new(ContextBuilder::new(store.clone())),
            models,
        });
        Self {
            sessions: SessionManager::new(store),
            registry: ProcessorRegistry::with_defaults(deps.clone()),
            deps,
            suggester,
        }
    }

    /// Run one chat turn. Always returns a response.
    pub async fn process_chat(&self, request: &ChatRequest) -> ChatResponse {
        info!(user_id = %request.user_id, "Processing chat request");
        match self.run(request).await {
            Ok(response) => response,
            Err(e) => {
                match &e {
                    Error::Validation(_) => warn!(user_id = %request.user_id, error = %e, "Rejected chat request"),
                    _ => error!(user_id = %request.user_id, error = %e, "Chat request failed"),
                }
                ChatResponse::error(failure_message(&e))
            }
        }
    }

    async fn run(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let errors = validate_request(request);
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }
        let kind = self.classify(request);

        let mut session = self.sessions.resolve(request).await?;
        let subject = session.current_subject.clone();

        let params_json = if request.action_params.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&request.action_params)?)
        };
        let user_message = Message::user(
            &session.id,
            &request.prompt,
            request.action_type().map(String::from),
            params_json,
        );
        self.sessions.append(&user_message).await?;

        let (content, metadata) = match kind.and_then(|k| self.registry.get(k)) {
            Some(processor) => {
                let content = processor.process(request, &session).await?;
                (content, Some(processor.metadata(request)))
            }
            None => {
                let content = generic_chat(&self.deps, request, &session).await?;
                let metadata = request.action_type().map(|raw| ActionMetadata {
                    action_type: raw.to_string(),
                    ..Default::default()
                });
                (content, metadata)
            }
        };

        let tier = kind.map(|k| k.model_tier()).unwrap_or(ModelTier::Standard);
        let model = self.deps.model_name(tier).to_string();
        let tokens = estimate_tokens(&content);
        let metadata_json = metadata.as_ref().map(serde_json::to_string).transpose()?;
        let assistant_message = Message::assistant(&session.id, &content, &model, tokens)
            .with_action(request.action_type().map(String::from), metadata_json);
        self.sessions.append(&assistant_message).await?;

        let suggested_prompts = self.suggester.suggest(subject.as_deref(), request.action_type());
        self.sessions.record_activity(&mut session, request).await?;

        info!(
            session_id = %session.id,
            model = %model,
            tokens,
            "Chat request completed"
        );
        Ok(ChatResponse {
            message_id: Some(assistant_message.id),
            content: Some(content),
            session_id: Some(session.id),
            timestamp: Utc::now(),
            status: ResponseStatus::Success,
            ai_model: Some(model),
            suggested_prompts,
            action_metadata: metadata,
            error_message: None,
            tokens_used: Some(tokens),
        })
    }

    /// Match the action type against known kinds and log advisories.
    fn classify(&self, request: &ChatRequest) -> Option<ActionKind> {
        let raw = request.action_type()?;
        let Some(kind) = ActionKind::parse(raw) else {
            warn!(action_type = raw, "Unknown action type, falling back to general chat");
            return None;
        };
        if kind.requires_context() && request.educational_context.is_empty() {
            debug!(action_type = %kind, "Action works best with educational context");
        }
        for key in kind.recommended_context_keys() {
            if !request.educational_context.contains_key(*key) {
                debug!(action_type = %kind, key, "Recommended context key missing");
            }
        }
        for note in content_advisories(kind, &request.prompt) {
            warn!(action_type = %kind, "{note}");
        }
        Some(kind)
    }

    pub async fn history(&self, session_id: &str, user_id: &str) -> Result<SessionView> {
        self.sessions.history(session_id, user_id).await
    }

    pub async fn active_sessions(&self, user_id: &str) -> Result<Vec<SessionView>> {
        self.sessions.active_sessions(user_id).await
    }

    pub async fn deactivate(&self, session_id: &str, user_id: &str) -> Result<()> {
        self.sessions.deactivate(session_id, user_id).await
    }

    pub fn suggestions(&self, subject: Option<&str>, action_type: Option<&str>) -> Vec<String> {
        self.suggester.suggest(subject, action_type)
    }

    pub fn add_custom_prompt(&self, category: &str, prompt: &str) {
        self.suggester.add_custom(category, prompt);
    }

    pub fn provider_name(&self) -> &str {
        self.deps.provider.name()
    }

    pub async fn provider_healthy(&self) -> bool {
        self.deps.provider.health_check().await.unwrap_or(false)
    }
}

/// Every problem with a request, in reporting order. Empty means valid.
pub fn validate_request(request: &ChatRequest) -> Vec<String> {
    let mut errors = Vec::new();
    if let Some(kind) = request.action_type().and_then(ActionKind::parse) {
        errors.extend(ParameterResolver::validate(kind, &request.action_params));
    }
    if request.user_id.trim().is_empty() {
        errors.push("User ID is required".to_string());
    }
    if request.prompt.trim().is_empty() {
        errors.push("Prompt content is required".to_string());
    } else if request.prompt.chars().count() > MAX_PROMPT_CHARS {
        errors.push(format!("Prompt must not exceed {MAX_PROMPT_CHARS} characters"));
    }
    errors
}

/// Client-facing text for a failed turn. Storage causes are not exposed.
fn failure_message(err: &Error) -> String {
    match err {
        Error::Validation(_) => err.to_string(),
        Error::Store(_) => format!("{FAILURE_PREFIX}storage unavailable"),
        Error::Completion(cause) => format!("{FAILURE_PREFIX}{cause}"),
        other => format!("{FAILURE_PREFIX}{other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::GENERAL_PERSONA;
    use crate::processors::test_support::RecordingProvider;
    use crate::prompts::CatalogSuggester;
    use async_trait::async_trait;
    use eduassist_core::{CompletionRequest, ProviderError, Sender, Session, StoreError};
    use eduassist_store::InMemoryStore;
    use serde_json::json;

    struct FailingProvider;

    #[async_trait]
    impl Provider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        async fn complete(&self, _request: CompletionRequest) -> std::result::Result<String, ProviderError> {
            Err(ProviderError::ApiError {
                status_code: 503,
                message: "backend overloaded".into(),
            })
        }
    }

    /// Reads succeed, every write fails.
    struct ReadOnlyStore;

    #[async_trait]
    impl SessionStore for ReadOnlyStore {
        fn name(&self) -> &str {
            "read-only"
        }

        async fn find_session_by_id_and_user(
            &self,
            _session_id: &str,
            _user_id: &str,
        ) -> std::result::Result<Option<Session>, StoreError> {
            Ok(None)
        }

        async fn find_session(&self, _session_id: &str) -> std::result::Result<Option<Session>, StoreError> {
            Ok(None)
        }

        async fn save_session(&self, _session: &Session) -> std::result::Result<(), StoreError> {
            Err(StoreError::Storage("disk full at /var/lib/db".into()))
        }

        async fn list_active_sessions(&self, _user_id: &str) -> std::result::Result<Vec<Session>, StoreError> {
            Ok(Vec::new())
        }

        async fn append_message(&self, _message: &Message) -> std::result::Result<(), StoreError> {
            Err(StoreError::Storage("disk full at /var/lib/db".into()))
        }

        async fn count_messages(&self, _session_id: &str) -> std::result::Result<usize, StoreError> {
            Ok(0)
        }

        async fn messages_in_session(&self, _session_id: &str) -> std::result::Result<Vec<Message>, StoreError> {
            Ok(Vec::new())
        }
    }

    fn orchestrator(store: Arc<dyn SessionStore>, provider: Arc<dyn Provider>) -> Orchestrator {
        Orchestrator::new(
            store,
            provider,
            ParameterResolver::builtin(),
            ModelsConfig::default(),
            Arc::new(CatalogSuggester::new()),
        )
    }

    fn request(prompt: &str, action: Option<&str>, params: serde_json::Value) -> ChatRequest {
        let mut request = ChatRequest::new("u1", prompt);
        request.action_type = action.map(String::from);
        if let serde_json::Value::Object(map) = params {
            request.action_params = map;
        }
        request
    }

    #[tokio::test]
    async fn translate_creates_session_and_resolves_params() {
        let store = Arc::new(InMemoryStore::new());
        let provider = RecordingProvider::new("Bonjour la classe");
        let orchestrator = orchestrator(store.clone(), provider.clone());

        let response = orchestrator
            .process_chat(&request(
                "Translate: Hello class",
                Some("TRANSLATE"),
                json!({"targetLanguage": "French"}),
            ))
            .await;

        assert!(response.is_success(), "{:?}", response.error_message);
        assert_eq!(response.content.as_deref(), Some("Bonjour la classe"));
        assert_eq!(response.ai_model.as_deref(), Some("gpt-3.5-turbo"));
        assert_eq!(response.suggested_prompts.len(), 5);

        let meta = response.action_metadata.unwrap();
        assert_eq!(meta.target_language.as_deref(), Some("French"));
        assert_eq!(meta.original_language.as_deref(), Some("auto-detect"));

        let session_id = response.session_id.unwrap();
        let session = store.find_session(&session_id).await.unwrap().unwrap();
        assert_eq!(session.preferred_language.as_deref(), Some("French"));
        assert_eq!(session.last_action_type.as_deref(), Some("TRANSLATE"));

        let messages = store.messages_in_session(&session_id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[1].sender, Sender::Assistant);
        assert_eq!(messages[1].ai_model.as_deref(), Some("gpt-3.5-turbo"));
        assert_eq!(response.message_id.as_deref(), Some(messages[1].id.as_str()));
    }

    #[tokio::test]
    async fn negative_question_count_is_rejected_before_persistence() {
        let store = Arc::new(InMemoryStore::new());
        let provider = RecordingProvider::new("unused");
        let orchestrator = orchestrator(store.clone(), provider.clone());

        let response = orchestrator
            .process_chat(&request(
                "Cells and organelles",
                Some("QUESTION_GENERATION"),
                json!({"questionCount": -1}),
            ))
            .await;

        assert_eq!(response.status, ResponseStatus::Error);
        let message = response.error_message.unwrap();
        assert!(message.starts_with("Parameter validation failed: "));
        assert!(message.contains("questionCount must be a positive integer"));
        assert!(store.list_active_sessions("u1").await.unwrap().is_empty());
        assert!(provider.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn explicit_nulls_and_loose_scalars_are_accepted() {
        let provider = RecordingProvider::new("ok");
        let orchestrator = orchestrator(Arc::new(InMemoryStore::new()), provider.clone());

        let response = orchestrator
            .process_chat(&request("Translate: Hello class", Some("TRANSLATE"), json!({"tone": null})))
            .await;
        assert!(response.is_success(), "{:?}", response.error_message);
        assert!(provider.last().prompt.contains("neutral"));

        let response = orchestrator
            .process_chat(&request("Make this simpler", Some("REWRITE"), json!({"purpose": null})))
            .await;
        assert!(response.is_success(), "{:?}", response.error_message);

        let response = orchestrator
            .process_chat(&request(
                "Photosynthesis converts light energy into chemical energy in plants.",
                Some("QUESTION_GENERATION"),
                json!({"difficultyLevel": 3}),
            ))
            .await;
        assert!(response.is_success(), "{:?}", response.error_message);

        let response = orchestrator
            .process_chat(&request("Translate: Hi", Some("TRANSLATE"), json!({"targetLanguage": null})))
            .await;
        assert_eq!(
            response.error_message.as_deref(),
            Some("Parameter validation failed: targetLanguage cannot be null")
        );
    }

    #[tokio::test]
    async fn validation_errors_are_joined() {
        let orchestrator = orchestrator(Arc::new(InMemoryStore::new()), RecordingProvider::new("x"));
        let mut bad = request("   ", Some("rewrite"), json!({"colour": "blue"}));
        bad.user_id = String::new();

        let response = orchestrator.process_chat(&bad).await;
        assert_eq!(
            response.error_message.as_deref(),
            Some(
                "Parameter validation failed: Unsupported parameter 'colour' for action type REWRITE, \
User ID is required, Prompt content is required"
            )
        );
    }

    #[test]
    fn overlong_prompt_is_invalid() {
        let long = "a".repeat(MAX_PROMPT_CHARS + 1);
        let errors = validate_request(&ChatRequest::new("u1", long));
        assert_eq!(errors, vec!["Prompt must not exceed 4000 characters"]);
        assert!(validate_request(&ChatRequest::new("u1", "a".repeat(MAX_PROMPT_CHARS))).is_empty());
    }

    #[tokio::test]
    async fn unknown_action_falls_back_to_generic_chat() {
        let provider = RecordingProvider::new("General answer");
        let orchestrator = orchestrator(Arc::new(InMemoryStore::new()), provider.clone());

        let response = orchestrator
            .process_chat(&request("Help me plan", Some("FOO"), json!({"anything": 1})))
            .await;

        assert!(response.is_success());
        assert_eq!(response.ai_model.as_deref(), Some("gpt-3.5-turbo"));
        assert_eq!(response.action_metadata.unwrap().action_type, "FOO");
        let sent = provider.last();
        assert_eq!(sent.system.as_deref(), Some(GENERAL_PERSONA));
        assert!(sent.prompt.ends_with("Current Request: Help me plan"));
    }

    #[tokio::test]
    async fn advanced_actions_are_tagged_with_advanced_model() {
        let store = Arc::new(InMemoryStore::new());
        let orchestrator = orchestrator(store.clone(), RecordingProvider::new("Rewritten"));

        let response = orchestrator
            .process_chat(&request("Make this simpler", Some("rewrite"), json!({"tone": "formal"})))
            .await;

        assert_eq!(response.ai_model.as_deref(), Some("gpt-4"));
        assert_eq!(response.action_metadata.unwrap().tone.as_deref(), Some("formal"));
        let messages = store
            .messages_in_session(&response.session_id.unwrap())
            .await
            .unwrap();
        assert_eq!(messages[1].ai_model.as_deref(), Some("gpt-4"));
        assert_eq!(messages[0].action_metadata.as_deref(), Some(r#"{"tone":"formal"}"#));
    }

    #[tokio::test]
    async fn completion_failure_keeps_user_message_only() {
        let store = Arc::new(InMemoryStore::new());
        let orchestrator = orchestrator(store.clone(), Arc::new(FailingProvider));

        let response = orchestrator.process_chat(&request("Hello", None, json!({}))).await;

        assert_eq!(response.status, ResponseStatus::Error);
        let message = response.error_message.unwrap();
        assert!(message.starts_with(FAILURE_PREFIX));
        assert!(message.contains("backend overloaded"));

        let sessions = store.list_active_sessions("u1").await.unwrap();
        assert_eq!(sessions.len(), 1);
        let messages = store.messages_in_session(&sessions[0].id).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender, Sender::User);
    }

    #[tokio::test]
    async fn store_failures_hide_the_cause() {
        let orchestrator = orchestrator(Arc::new(ReadOnlyStore), RecordingProvider::new("x"));
        let response = orchestrator.process_chat(&request("Hello", None, json!({}))).await;
        let message = response.error_message.unwrap();
        assert_eq!(message, format!("{FAILURE_PREFIX}storage unavailable"));
        assert!(!message.contains("/var/lib/db"));
    }

    #[tokio::test]
    async fn second_turn_reuses_session_and_replays_history() {
        let store = Arc::new(InMemoryStore::new());
        let provider = RecordingProvider::new("Sure.");
        let orchestrator = orchestrator(store.clone(), provider.clone());

        let first = orchestrator.process_chat(&request("First question", None, json!({}))).await;
        let mut next = request("Follow-up question", None, json!({}));
        next.session_id = first.session_id.clone();
        next.educational_context.insert("subject".into(), json!("Math"));
        let second = orchestrator.process_chat(&next).await;

        assert_eq!(second.session_id, first.session_id);
        let prompt = provider.last().prompt;
        assert!(prompt.contains("Educator: First question"));
        assert!(prompt.contains("Assistant: Sure."));

        let session = store
            .find_session(first.session_id.as_deref().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.current_subject.as_deref(), Some("Math"));
        assert_eq!(store.count_messages(&session.id).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn history_is_owner_only() {
        let orchestrator = orchestrator(Arc::new(InMemoryStore::new()), RecordingProvider::new("ok"));
        let response = orchestrator.process_chat(&request("Hello", None, json!({}))).await;
        let session_id = response.session_id.unwrap();

        let view = orchestrator.history(&session_id, "u1").await.unwrap();
        assert_eq!(view.messages.unwrap().len(), 2);
        assert!(matches!(
            orchestrator.history(&session_id, "intruder").await,
            Err(Error::NotFound(_))
        ));
    }
}
