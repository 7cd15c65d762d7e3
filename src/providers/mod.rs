/*!
 * Translation API client.
 *
 * The chunk engine talks to the API only through [`BatchTranslate`], so
 * the real HTTP client ([`xai::XaiClient`]) and test doubles are
 * interchangeable.
 */

use async_trait::async_trait;

use crate::errors::ErrorKind;
use crate::translation::cancel::CancelSignal;

/// Result of one batch translation attempt
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    /// One segment per input text, positionally aligned; `None` on failure
    pub texts: Option<Vec<String>>,
    /// Classification of the failure, if any
    pub error: Option<ErrorKind>,
}

impl BatchOutcome {
    pub fn success(texts: Vec<String>) -> Self {
        Self {
            texts: Some(texts),
            error: None,
        }
    }

    pub fn failure(kind: ErrorKind) -> Self {
        Self {
            texts: None,
            error: Some(kind),
        }
    }

    /// Split into the translated texts or the failure kind
    pub fn into_result(self) -> Result<Vec<String>, ErrorKind> {
        match (self.texts, self.error) {
            (Some(texts), _) => Ok(texts),
            (None, Some(kind)) => Err(kind),
            (None, None) => Err(ErrorKind::Network("empty outcome".to_string())),
        }
    }
}

/// Common interface for anything that can translate a batch of texts
///
/// Implementations must never panic or return early with an error: every
/// failure is reported through [`BatchOutcome::failure`].
#[async_trait]
pub trait BatchTranslate: Send + Sync {
    /// Translate `texts` into `target_language`, preserving order
    async fn translate_batch(
        &self,
        texts: &[String],
        target_language: &str,
        cancel: &CancelSignal,
    ) -> BatchOutcome;
}

pub mod xai;
