/*!
 * Mock translator implementations for testing
 *
 * These implement the BatchTranslate trait without any network access and
 * record every call so tests can assert on chunking and retries.
 */

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use strans::errors::ErrorKind;
use strans::providers::{BatchOutcome, BatchTranslate};
use strans::translation::CancelSignal;

/// Tracks calls made to a mock translator
#[derive(Debug, Default)]
pub struct ApiCallTracker {
    /// Count of mock API calls made
    pub call_count: usize,
    /// Texts received by each call
    pub requests: Vec<Vec<String>>,
}

/// Type of error to simulate
#[derive(Debug, Clone, Copy)]
pub enum MockErrorType {
    Auth,
    RateLimit,
    Timeout,
    Network,
}

impl MockErrorType {
    fn kind(self) -> ErrorKind {
        match self {
            MockErrorType::Auth => ErrorKind::Auth,
            MockErrorType::RateLimit => ErrorKind::RateLimit,
            MockErrorType::Timeout => ErrorKind::Timeout,
            MockErrorType::Network => ErrorKind::Network("connection reset".to_string()),
        }
    }
}

/// Scripted step for a mock call
#[derive(Debug, Clone)]
pub enum MockStep {
    /// Translate every text by prefixing it with the target language
    Translate,
    /// Return these segments verbatim
    Respond(Vec<&'static str>),
    /// Fail with the given error type
    Fail(MockErrorType),
}

/// Replays a script of steps, then keeps translating
pub struct MockTranslator {
    tracker: Arc<Mutex<ApiCallTracker>>,
    script: Mutex<VecDeque<MockStep>>,
    /// Fail every call for texts containing this marker
    poison: Option<&'static str>,
}

impl MockTranslator {
    pub fn new() -> Self {
        Self::with_script(Vec::new())
    }

    pub fn with_script(script: Vec<MockStep>) -> Self {
        Self {
            tracker: Arc::new(Mutex::new(ApiCallTracker::default())),
            script: Mutex::new(script.into()),
            poison: None,
        }
    }

    /// Always time out on batches that contain `marker`
    pub fn poisoned(marker: &'static str) -> Self {
        let mut mock = Self::new();
        mock.poison = Some(marker);
        mock
    }

    pub fn tracker(&self) -> Arc<Mutex<ApiCallTracker>> {
        self.tracker.clone()
    }
}

/// Deterministic fake translation
pub fn fake_translation(text: &str, target_language: &str) -> String {
    format!("[{}] {}", target_language, text)
}

#[async_trait]
impl BatchTranslate for MockTranslator {
    async fn translate_batch(&self, texts: &[String], target_language: &str, _cancel: &CancelSignal) -> BatchOutcome {
        {
            let mut tracker = self.tracker.lock().unwrap();
            tracker.call_count += 1;
            tracker.requests.push(texts.to_vec());
        }

        if let Some(marker) = self.poison {
            if texts.iter().any(|t| t.contains(marker)) {
                return BatchOutcome::failure(ErrorKind::Timeout);
            }
        }

        let step = self.script.lock().unwrap().pop_front().unwrap_or(MockStep::Translate);
        match step {
            MockStep::Translate => BatchOutcome::success(
                texts.iter().map(|t| fake_translation(t, target_language)).collect(),
            ),
            MockStep::Respond(segments) => {
                BatchOutcome::success(segments.into_iter().map(str::to_string).collect())
            }
            MockStep::Fail(error_type) => BatchOutcome::failure(error_type.kind()),
        }
    }
}

/// Translator that blocks on a gate after a number of calls
///
/// Lets a test cancel a run at a precise chunk boundary: once `open_calls`
/// calls have been answered, the next call signals `reached` and waits for
/// `release` before honoring the cancel signal it was given.
pub struct GatedTranslator {
    pub tracker: Arc<Mutex<ApiCallTracker>>,
    open_calls: usize,
    pub reached: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl GatedTranslator {
    pub fn new(open_calls: usize) -> Self {
        Self {
            tracker: Arc::new(Mutex::new(ApiCallTracker::default())),
            open_calls,
            reached: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        }
    }
}

#[async_trait]
impl BatchTranslate for GatedTranslator {
    async fn translate_batch(&self, texts: &[String], target_language: &str, cancel: &CancelSignal) -> BatchOutcome {
        let call_number = {
            let mut tracker = self.tracker.lock().unwrap();
            tracker.call_count += 1;
            tracker.requests.push(texts.to_vec());
            tracker.call_count
        };

        if call_number > self.open_calls {
            self.reached.notify_one();
            self.release.notified().await;
            if cancel.is_canceled() {
                return BatchOutcome::failure(ErrorKind::Canceled);
            }
        }

        BatchOutcome::success(texts.iter().map(|t| fake_translation(t, target_language)).collect())
    }
}
