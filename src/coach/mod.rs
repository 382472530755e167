// Coach: classify, record, select and generate replies
//
// Every path through `respond` produces a reply. Provider and store
// failures are logged and degrade to a static message instead of an error,
// because the person on the other end may be in distress.

use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{Config, ReplyMode, DEFAULT_SYSTEM_PROMPT};
use crate::conversation::ChatMessage;
use crate::crisis::{ClassificationResult, CrisisDetector, RiskLevel};
use crate::errors::wrap_error_with_suggestion;
use crate::metrics::{MetricsLogger, RequestMetric, SafetyMetrics};
use crate::providers::{create_provider, LlmProvider, ProviderRequest};
use crate::responder::{
    select_response, NoDelay, RandomDelay, ReplyContext, TemplateCatalog, ThinkingDelay,
};
use crate::store::{RecoveryStore, SosEvent};

/// Reply when the provider cannot be reached or is not configured
pub const FALLBACK_REPLY: &str = "I had trouble reaching the AI service. \
Let's try a grounding exercise together: take 3 slow breaths.";

/// Reply when the provider answers with nothing
pub const EMPTY_COMPLETION_REPLY: &str = "I am here with you. How can I help right now?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    CrisisTemplate,
    UrgeTemplate,
    Provider,
    Fallback,
    Catalog,
}

impl ReplySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplySource::CrisisTemplate => "crisis_template",
            ReplySource::UrgeTemplate => "urge_template",
            ReplySource::Provider => "provider",
            ReplySource::Fallback => "fallback",
            ReplySource::Catalog => "catalog",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CoachReply {
    pub reply: String,
    pub source: ReplySource,
    pub classification: ClassificationResult,
    /// Messages stored for the user after this exchange
    pub message_count: usize,
}

/// Reply-generation knobs taken from configuration
#[derive(Debug, Clone)]
pub struct CoachSettings {
    pub reply_mode: ReplyMode,
    pub system_prompt: String,
    pub history_limit: usize,
    pub max_tokens: u32,
    pub temperature: f32,
    pub request_timeout: Duration,
}

impl Default for CoachSettings {
    fn default() -> Self {
        Self {
            reply_mode: ReplyMode::Generative,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            history_limit: 10,
            max_tokens: 400,
            temperature: 0.7,
            request_timeout: Duration::from_secs(20),
        }
    }
}

impl CoachSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            reply_mode: config.chat.reply_mode,
            system_prompt: config.ai.system_prompt.clone(),
            history_limit: config.ai.history_limit,
            max_tokens: config.ai.max_tokens,
            temperature: config.ai.temperature,
            request_timeout: Duration::from_secs(config.ai.timeout_seconds),
        }
    }
}

/// Crisis detector using the configured lexicon, or the built-in one
pub fn load_detector(config: &Config) -> Result<CrisisDetector> {
    match &config.crisis.lexicon_path {
        Some(path) => CrisisDetector::load_from_file(path).map_err(|e| {
            anyhow::anyhow!(wrap_error_with_suggestion(
                format!("{:#}", e),
                "Fix the lexicon file or remove crisis.lexicon_path to use the built-in phrases"
            ))
        }),
        None => Ok(CrisisDetector::default()),
    }
}

pub struct Coach {
    detector: CrisisDetector,
    catalog: TemplateCatalog,
    provider: Option<Box<dyn LlmProvider>>,
    store: Arc<dyn RecoveryStore>,
    delay: Box<dyn ThinkingDelay>,
    metrics: SafetyMetrics,
    metrics_logger: Option<Arc<MetricsLogger>>,
    settings: CoachSettings,
}

impl Coach {
    pub fn new(detector: CrisisDetector, store: Arc<dyn RecoveryStore>) -> Result<Self> {
        Ok(Self {
            detector,
            catalog: TemplateCatalog::new(),
            provider: None,
            store,
            delay: Box::new(NoDelay),
            metrics: SafetyMetrics::new()?,
            metrics_logger: None,
            settings: CoachSettings::default(),
        })
    }

    /// Build a coach from configuration
    pub fn from_config(config: &Config, store: Arc<dyn RecoveryStore>) -> Result<Self> {
        let detector = load_detector(config)?;
        let mut coach = Self::new(detector, store)?.with_settings(CoachSettings::from_config(config));

        if config.chat.reply_mode == ReplyMode::Generative {
            if let Some(provider) = create_provider(&config.ai)? {
                tracing::info!(provider = provider.name(), "Text-generation provider ready");
                coach = coach.with_provider(provider);
            }
        }

        if config.chat.thinking_delay {
            coach = coach.with_delay(Box::new(RandomDelay::default()));
        }

        if let Some(dir) = config.metrics_dir() {
            match MetricsLogger::new(dir) {
                Ok(logger) => coach = coach.with_metrics_logger(logger),
                Err(e) => tracing::warn!(error = %e, "Metrics logging disabled"),
            }
        }

        Ok(coach)
    }

    pub fn with_provider(mut self, provider: Box<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_delay(mut self, delay: Box<dyn ThinkingDelay>) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_settings(mut self, settings: CoachSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_metrics_logger(mut self, logger: MetricsLogger) -> Self {
        self.metrics_logger = Some(Arc::new(logger));
        self
    }

    pub fn store(&self) -> &Arc<dyn RecoveryStore> {
        &self.store
    }

    pub fn metrics(&self) -> &SafetyMetrics {
        &self.metrics
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Classify without storing anything
    pub fn analyze(&self, content: &str) -> ClassificationResult {
        self.detector.classify(content)
    }

    /// Handle one user message and produce the assistant reply
    pub async fn respond(&self, user_id: &str, content: &str) -> CoachReply {
        let start_time = Instant::now();

        let classification = self.detector.classify(content);
        self.metrics.record_classification(classification.risk_level);

        if let Err(e) = self.store.append_message(user_id, ChatMessage::user(content)) {
            tracing::warn!(user_id = %user_id, error = %e, "Failed to store user message");
        }

        if let Some(event) = SosEvent::from_classification(user_id, &classification) {
            let level = event.level.as_str();
            match self.store.record_sos_event(event) {
                Ok(()) => self.metrics.record_sos_event(level, "detector"),
                Err(e) => {
                    tracing::error!(user_id = %user_id, error = %e, "Failed to record SOS event")
                }
            }
        }

        let (reply, source) = match select_response(&classification) {
            Some(text) => {
                let source = if classification.risk_level == RiskLevel::Crisis {
                    ReplySource::CrisisTemplate
                } else {
                    ReplySource::UrgeTemplate
                };
                (text.to_string(), source)
            }
            None => match self.settings.reply_mode {
                ReplyMode::Generative => self.generate(user_id).await,
                ReplyMode::Templates => self.catalog_reply(user_id, content).await,
            },
        };

        if let Err(e) = self
            .store
            .append_message(user_id, ChatMessage::assistant(reply.clone()))
        {
            tracing::warn!(user_id = %user_id, error = %e, "Failed to store assistant reply");
        }

        let message_count = self.store.message_count(user_id).unwrap_or(0);
        let elapsed_ms = start_time.elapsed().as_millis() as u64;

        tracing::info!(
            user_id = %user_id,
            risk_level = %classification.risk_level,
            source = source.as_str(),
            elapsed_ms,
            "Replied to message"
        );

        self.metrics.record_reply(source.as_str());
        self.log_metric(content, &classification, source, elapsed_ms).await;

        CoachReply {
            reply,
            source,
            classification,
            message_count,
        }
    }

    async fn generate(&self, user_id: &str) -> (String, ReplySource) {
        let Some(provider) = &self.provider else {
            tracing::debug!("No provider configured, using fallback reply");
            return (FALLBACK_REPLY.to_string(), ReplySource::Fallback);
        };

        let history = self
            .store
            .recent_messages(user_id, self.settings.history_limit)
            .unwrap_or_else(|e| {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to load history");
                Vec::new()
            });

        let request = ProviderRequest::new(history)
            .with_system(self.settings.system_prompt.clone())
            .with_max_tokens(self.settings.max_tokens)
            .with_temperature(self.settings.temperature);

        let outcome = tokio::time::timeout(
            self.settings.request_timeout,
            provider.send_message(&request),
        )
        .await
        .context("Provider request timed out")
        .and_then(|result| result);

        match outcome {
            Ok(response) if response.text.trim().is_empty() => {
                (EMPTY_COMPLETION_REPLY.to_string(), ReplySource::Provider)
            }
            Ok(response) => (response.text, ReplySource::Provider),
            Err(e) => {
                tracing::warn!(
                    provider = provider.name(),
                    error = %e,
                    "Provider failed, using fallback reply"
                );
                self.metrics.record_provider_failure();
                (FALLBACK_REPLY.to_string(), ReplySource::Fallback)
            }
        }
    }

    async fn catalog_reply(&self, user_id: &str, content: &str) -> (String, ReplySource) {
        let turns = self.store.turn_count(user_id).unwrap_or(0);
        let context = ReplyContext::new(turns);

        let pause = self.delay.duration();
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }

        (self.catalog.reply(content, &context), ReplySource::Catalog)
    }

    async fn log_metric(
        &self,
        content: &str,
        classification: &ClassificationResult,
        source: ReplySource,
        elapsed_ms: u64,
    ) {
        let Some(logger) = self.metrics_logger.clone() else {
            return;
        };

        let metric = RequestMetric::new(
            MetricsLogger::hash_query(content),
            classification.risk_level,
            classification.suggested_action,
            classification.matched_phrases.len(),
            source.as_str().to_string(),
            elapsed_ms,
        );
        match tokio::task::spawn_blocking(move || logger.log(&metric)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "Failed to write metrics"),
            Err(e) => tracing::warn!(error = %e, "Metrics writer task failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;
    use crate::providers::ProviderResponse;
    use crate::responder::{CRISIS_SUPPORT_MESSAGE, URGE_SUPPORT_MESSAGE};
    use crate::store::{MemoryStore, SosLevel};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Clone, Copy)]
    enum Behavior {
        Reply(&'static str),
        Fail,
        Hang,
    }

    struct MockProvider {
        behavior: Behavior,
        calls: Arc<AtomicUsize>,
        last_request: Arc<Mutex<Option<ProviderRequest>>>,
    }

    impl MockProvider {
        fn new(behavior: Behavior) -> Self {
            Self {
                behavior,
                calls: Arc::new(AtomicUsize::new(0)),
                last_request: Arc::new(Mutex::new(None)),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        async fn send_message(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());

            match self.behavior {
                Behavior::Reply(text) => Ok(ProviderResponse {
                    id: "test-id".to_string(),
                    model: "test-model".to_string(),
                    text: text.to_string(),
                    stop_reason: Some("stop".to_string()),
                    provider: "mock".to_string(),
                }),
                Behavior::Fail => anyhow::bail!("Mock provider failed"),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    anyhow::bail!("unreachable")
                }
            }
        }

        fn name(&self) -> &str {
            "mock"
        }

        fn default_model(&self) -> &str {
            "test-model"
        }
    }

    struct Harness {
        coach: Coach,
        store: Arc<MemoryStore>,
        calls: Arc<AtomicUsize>,
        last_request: Arc<Mutex<Option<ProviderRequest>>>,
    }

    fn harness(behavior: Behavior) -> Harness {
        let store = Arc::new(MemoryStore::default());
        let provider = MockProvider::new(behavior);
        let calls = Arc::clone(&provider.calls);
        let last_request = Arc::clone(&provider.last_request);

        let coach = Coach::new(CrisisDetector::default(), store.clone())
            .unwrap()
            .with_provider(Box::new(provider));

        Harness {
            coach,
            store,
            calls,
            last_request,
        }
    }

    #[tokio::test]
    async fn test_crisis_reply_skips_provider_and_records_event() {
        let h = harness(Behavior::Reply("should not be used"));

        let reply = h.coach.respond("alice", "I want to kill myself").await;

        assert_eq!(reply.reply, CRISIS_SUPPORT_MESSAGE);
        assert_eq!(reply.source, ReplySource::CrisisTemplate);
        assert_eq!(reply.classification.risk_level, RiskLevel::Crisis);
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);

        let events = h.store.sos_events("alice").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, SosLevel::Crisis);
    }

    #[tokio::test]
    async fn test_urge_reply() {
        let h = harness(Behavior::Reply("unused"));

        let reply = h.coach.respond("alice", "I really need to gamble tonight").await;

        assert_eq!(reply.reply, URGE_SUPPORT_MESSAGE);
        assert_eq!(reply.source, ReplySource::UrgeTemplate);
        assert_eq!(h.store.sos_events("alice").unwrap()[0].level, SosLevel::Urge);
    }

    #[tokio::test]
    async fn test_low_risk_uses_provider_with_history() {
        let h = harness(Behavior::Reply("That sounds like a good plan."));

        let reply = h.coach.respond("alice", "I went for a walk today").await;

        assert_eq!(reply.reply, "That sounds like a good plan.");
        assert_eq!(reply.source, ReplySource::Provider);
        assert_eq!(reply.message_count, 2);
        assert!(h.store.sos_events("alice").unwrap().is_empty());

        let request = h.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.system.as_deref(), Some(DEFAULT_SYSTEM_PROMPT));
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, Role::User);
        assert_eq!(request.messages[0].content, "I went for a walk today");
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        let mut h = harness(Behavior::Reply("ok"));
        h.coach = h.coach.with_settings(CoachSettings {
            history_limit: 3,
            ..CoachSettings::default()
        });

        for i in 0..5 {
            h.coach.respond("alice", &format!("message {}", i)).await;
        }

        let request = h.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[2].content, "message 4");
    }

    #[tokio::test]
    async fn test_provider_failure_falls_back() {
        let h = harness(Behavior::Fail);

        let reply = h.coach.respond("alice", "what should I do this weekend").await;

        assert_eq!(reply.reply, FALLBACK_REPLY);
        assert_eq!(reply.source, ReplySource::Fallback);
        assert_eq!(h.coach.metrics().provider_failures(), 1);
    }

    #[tokio::test]
    async fn test_empty_completion_gets_gentle_default() {
        let h = harness(Behavior::Reply("   "));

        let reply = h.coach.respond("alice", "hi").await;
        assert_eq!(reply.reply, EMPTY_COMPLETION_REPLY);
    }

    #[tokio::test]
    async fn test_provider_timeout_falls_back() {
        let mut h = harness(Behavior::Hang);
        h.coach = h.coach.with_settings(CoachSettings {
            request_timeout: Duration::from_millis(50),
            ..CoachSettings::default()
        });

        let reply = h.coach.respond("alice", "tell me something").await;
        assert_eq!(reply.reply, FALLBACK_REPLY);
        assert_eq!(h.coach.metrics().provider_failures(), 1);
    }

    #[tokio::test]
    async fn test_missing_provider_falls_back() {
        let coach = Coach::new(CrisisDetector::default(), Arc::new(MemoryStore::default())).unwrap();
        assert!(!coach.has_provider());

        let reply = coach.respond("alice", "hello").await;
        assert_eq!(reply.reply, FALLBACK_REPLY);
        assert_eq!(reply.source, ReplySource::Fallback);
    }

    #[tokio::test]
    async fn test_templates_mode_uses_catalog() {
        let mut h = harness(Behavior::Reply("unused"));
        h.coach = h.coach.with_settings(CoachSettings {
            reply_mode: ReplyMode::Templates,
            ..CoachSettings::default()
        });

        let reply = h.coach.respond("alice", "I'm so anxious about work").await;

        assert_eq!(reply.source, ReplySource::Catalog);
        assert!(reply.reply.starts_with("Anxiety can feel overwhelming"));
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_safety_reply_wins_in_templates_mode() {
        let mut h = harness(Behavior::Reply("unused"));
        h.coach = h.coach.with_settings(CoachSettings {
            reply_mode: ReplyMode::Templates,
            ..CoachSettings::default()
        });

        let reply = h.coach.respond("alice", "everything feels hopeless").await;
        assert_eq!(reply.reply, CRISIS_SUPPORT_MESSAGE);
    }

    #[tokio::test]
    async fn test_analyze_has_no_side_effects() {
        let h = harness(Behavior::Reply("unused"));

        let result = h.coach.analyze("I want to place a bet");
        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(h.store.message_count("alice").unwrap(), 0);
        assert!(h.store.sos_events("alice").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_metrics_log_written() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(Behavior::Reply("ok"));
        let coach = h
            .coach
            .with_metrics_logger(MetricsLogger::new(dir.path().to_path_buf()).unwrap());

        coach.respond("alice", "a calm day").await;

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_catalog_turns_keep_counting_past_history_cap() {
        let mut h = harness(Behavior::Reply("unused"));
        h.coach = h.coach.with_settings(CoachSettings {
            reply_mode: ReplyMode::Templates,
            ..CoachSettings::default()
        });

        let mut last = None;
        for _ in 0..40 {
            last = Some(h.coach.respond("u", "ok").await);
        }

        let reply = last.unwrap();
        assert!(h.store.message_count("u").unwrap() < 80);
        assert!(reply.reply.contains("39 exchanges"), "{}", reply.reply);
    }
}
