//! Deterministic collaborator doubles
//!
//! These return pre-configured answers without any network calls. Clones share
//! their script and call log, so a test can keep a handle after injecting one.

use async_trait::async_trait;
use docex_domain::{CollaboratorError, LanguageModel, ModelRequest, OcrEngine, OcrInput, OcrLine, OcrPage};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// One scripted answer
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// Answer with this text
    Text(String),
    /// Fail with this error
    Fail(CollaboratorError),
    /// Sleep, then answer with this text
    Stall(Duration, String),
}

impl MockReply {
    /// Text answer
    pub fn text(s: impl Into<String>) -> Self {
        MockReply::Text(s.into())
    }
}

/// Mock language model
///
/// Reply selection order: the first rule whose needle occurs in the prompt,
/// then the next scripted reply, then the default.
///
/// ```
/// use docex_llm::{MockLanguageModel, MockReply};
/// use docex_domain::CollaboratorError;
///
/// let model = MockLanguageModel::new("{}")
///     .then(MockReply::Fail(CollaboratorError::Timeout(100)))
///     .when("invoiceNumber", MockReply::text(r#"{"score": 0.9}"#));
/// assert_eq!(model.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockLanguageModel {
    name: String,
    default_reply: MockReply,
    script: Arc<Mutex<VecDeque<MockReply>>>,
    rules: Arc<Mutex<Vec<(String, MockReply)>>>,
    requests: Arc<Mutex<Vec<ModelRequest>>>,
}

impl MockLanguageModel {
    /// Mock answering every call with `response`
    pub fn new(response: impl Into<String>) -> Self {
        Self::with_default(MockReply::Text(response.into()))
    }

    /// Mock failing every call with `error`
    pub fn failing(error: CollaboratorError) -> Self {
        Self::with_default(MockReply::Fail(error))
    }

    fn with_default(default_reply: MockReply) -> Self {
        Self {
            name: "mock".to_string(),
            default_reply,
            script: Arc::new(Mutex::new(VecDeque::new())),
            rules: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the reported model name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Queue a one-shot reply
    pub fn then(self, reply: MockReply) -> Self {
        lock(&self.script).push_back(reply);
        self
    }

    /// Answer every prompt containing `needle` with `reply`
    pub fn when(self, needle: impl Into<String>, reply: MockReply) -> Self {
        lock(&self.rules).push((needle.into(), reply));
        self
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Every request received, in arrival order
    pub fn requests(&self) -> Vec<ModelRequest> {
        lock(&self.requests).clone()
    }

    /// Forget recorded calls
    pub fn reset_call_count(&self) {
        lock(&self.requests).clear();
    }

    fn next_reply(&self, request: &ModelRequest) -> MockReply {
        lock(&self.requests).push(request.clone());

        let rules = lock(&self.rules);
        if let Some((_, reply)) = rules.iter().find(|(needle, _)| request.prompt.contains(needle.as_str())) {
            return reply.clone();
        }
        drop(rules);

        lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| self.default_reply.clone())
    }
}

impl Default for MockLanguageModel {
    fn default() -> Self {
        Self::new("{}")
    }
}

#[async_trait]
impl LanguageModel for MockLanguageModel {
    async fn generate(&self, request: &ModelRequest) -> Result<String, CollaboratorError> {
        match self.next_reply(request) {
            MockReply::Text(text) => Ok(text),
            MockReply::Fail(e) => Err(e),
            MockReply::Stall(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Mock OCR engine
///
/// Pages answer with configured text (or `"page N"`), optionally after a
/// per-page delay, so tests can force out-of-order completion.
#[derive(Debug, Clone, Default)]
pub struct MockOcrEngine {
    unavailable: bool,
    pages: HashMap<usize, String>,
    delays: HashMap<usize, Duration>,
    failures: HashSet<usize>,
    calls: Arc<Mutex<Vec<usize>>>,
}

impl MockOcrEngine {
    /// Available engine with no configured pages
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine reporting itself unavailable
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Configure the text for one page
    pub fn with_page(mut self, page_index: usize, text: impl Into<String>) -> Self {
        self.pages.insert(page_index, text.into());
        self
    }

    /// Delay the answer for one page
    pub fn with_delay(mut self, page_index: usize, delay: Duration) -> Self {
        self.delays.insert(page_index, delay);
        self
    }

    /// Make one page fail
    pub fn with_failure(mut self, page_index: usize) -> Self {
        self.failures.insert(page_index);
        self
    }

    /// Number of recognize calls made so far
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Page indexes in the order calls arrived
    pub fn calls(&self) -> Vec<usize> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl OcrEngine for MockOcrEngine {
    async fn is_available(&self) -> bool {
        !self.unavailable
    }

    async fn recognize(&self, input: &OcrInput) -> Result<OcrPage, CollaboratorError> {
        lock(&self.calls).push(input.page_index);

        if let Some(delay) = self.delays.get(&input.page_index) {
            tokio::time::sleep(*delay).await;
        }
        if self.unavailable {
            return Err(CollaboratorError::Unavailable("mock OCR offline".to_string()));
        }
        if self.failures.contains(&input.page_index) {
            return Err(CollaboratorError::Other(format!("mock OCR failure on page {}", input.page_index)));
        }

        let text = self
            .pages
            .get(&input.page_index)
            .cloned()
            .unwrap_or_else(|| format!("page {}", input.page_index));
        let lines = text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| OcrLine {
                text: l.to_string(),
                location: String::new(),
            })
            .collect();

        Ok(OcrPage {
            page_index: input.page_index,
            text,
            lines,
        })
    }
}
