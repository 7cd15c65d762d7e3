/*!
 * Chunked translation with retry and fallback.
 *
 * Units are sent to the translator in consecutive chunks of at most
 * `batch_size`. Each chunk is retried according to the [`RetryPolicy`];
 * a chunk that never succeeds keeps its source text. Cancellation is
 * observed before every chunk and every attempt, and stops the engine
 * with the units resolved so far. Units with blank source text are
 * resolved in place and never sent.
 */

use std::sync::Arc;
use log::{debug, error, warn};

use crate::errors::ErrorKind;
use crate::formats::TranslationUnit;
use crate::providers::BatchTranslate;

use super::cancel::CancelSignal;
use super::retry::{ExhaustionAction, RetryPolicy};

/// How a completed chunk was resolved
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkResolution {
    /// The translator answered; `blank_segments` units still fell back
    Translated { blank_segments: usize },
    /// Every attempt failed and the chunk kept its source text
    FellBack(ErrorKind),
}

/// Report for one completed chunk
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkReport {
    /// Zero-based chunk index
    pub chunk_index: usize,
    pub total_chunks: usize,
    /// Number of units resolved by this chunk
    pub delta: usize,
    /// Attempts used, including the successful one
    pub attempts: u32,
    pub resolution: ChunkResolution,
}

/// Notifications emitted while chunks are processed
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkEvent {
    /// An attempt failed and another one will follow
    Retrying {
        chunk_index: usize,
        /// One-based number of the attempt about to start
        next_attempt: u32,
        error: ErrorKind,
    },
    /// A chunk finished; emitted exactly once per completed chunk
    ChunkDone(ChunkReport),
}

/// Result of translating a list of units
#[derive(Debug, Clone, Default)]
pub struct ChunkedTranslation {
    /// Resolved units in input order; a prefix of the input when canceled
    pub units: Vec<TranslationUnit>,
    pub canceled: bool,
    /// Chunks that exhausted their attempts
    pub fallback_chunks: usize,
}

/// Split `items` into consecutive chunks of at most `batch_size` (0 counts as 1)
pub fn split_into_chunks<T>(items: &[T], batch_size: usize) -> std::slice::Chunks<'_, T> {
    items.chunks(batch_size.max(1))
}

fn is_blank(unit: &TranslationUnit) -> bool {
    unit.source_text.trim().is_empty()
}

enum ChunkAttempts {
    Translated(Vec<String>, u32),
    Exhausted(ErrorKind, u32),
    Canceled,
}

/// Drives a [`BatchTranslate`] implementation chunk by chunk
#[derive(Clone)]
pub struct BatchTranslator {
    translator: Arc<dyn BatchTranslate>,
    policy: RetryPolicy,
    batch_size: usize,
}

impl BatchTranslator {
    pub fn new(translator: Arc<dyn BatchTranslate>, batch_size: usize, policy: RetryPolicy) -> Self {
        Self {
            translator,
            policy,
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Translate `units` chunk by chunk.
    ///
    /// `on_event` receives a [`ChunkEvent::ChunkDone`] for every chunk that
    /// completes, whether translated or fallen back, and nothing for a chunk
    /// interrupted by cancellation.
    pub async fn translate_chunked<F>(
        &self,
        units: &[TranslationUnit],
        target_language: &str,
        cancel: &CancelSignal,
        mut on_event: F,
    ) -> ChunkedTranslation
    where
        F: FnMut(ChunkEvent) + Send,
    {
        let total_chunks = units.len().div_ceil(self.batch_size);
        let mut result = ChunkedTranslation {
            units: Vec::with_capacity(units.len()),
            ..Default::default()
        };

        for (chunk_index, chunk) in split_into_chunks(units, self.batch_size).enumerate() {
            if cancel.is_canceled() {
                debug!("Canceled before chunk {}/{}", chunk_index + 1, total_chunks);
                result.canceled = true;
                return result;
            }

            let texts: Vec<String> = chunk
                .iter()
                .filter(|unit| !is_blank(unit))
                .map(|unit| unit.source_text.clone())
                .collect();
            let attempts = if texts.is_empty() {
                ChunkAttempts::Translated(Vec::new(), 0)
            } else {
                self.attempt_chunk(chunk_index, &texts, target_language, cancel, &mut on_event)
                    .await
            };

            let mut resolved = chunk.to_vec();
            let (resolution, attempts_used) = match attempts {
                ChunkAttempts::Canceled => {
                    result.canceled = true;
                    return result;
                }
                ChunkAttempts::Translated(segments, attempts_used) => {
                    let mut blank_segments = 0;
                    let mut segments = segments.into_iter();
                    for unit in resolved.iter_mut() {
                        if is_blank(unit) {
                            unit.resolve(None);
                            continue;
                        }
                        let segment = segments.next();
                        if segment.as_deref().is_none_or(|s| s.trim().is_empty()) {
                            blank_segments += 1;
                        }
                        unit.resolve(segment.as_deref());
                    }
                    (ChunkResolution::Translated { blank_segments }, attempts_used)
                }
                ChunkAttempts::Exhausted(kind, attempts_used) => {
                    error!(
                        "Chunk {}/{} failed after {} attempts: {}",
                        chunk_index + 1,
                        total_chunks,
                        attempts_used,
                        kind
                    );
                    match self.policy.on_exhaustion {
                        ExhaustionAction::FallbackToSource => {
                            for unit in resolved.iter_mut() {
                                unit.resolve(None);
                            }
                        }
                    }
                    result.fallback_chunks += 1;
                    (ChunkResolution::FellBack(kind), attempts_used)
                }
            };

            let delta = resolved.len();
            result.units.extend(resolved);
            on_event(ChunkEvent::ChunkDone(ChunkReport {
                chunk_index,
                total_chunks,
                delta,
                attempts: attempts_used,
                resolution,
            }));
        }

        result
    }

    async fn attempt_chunk<F>(
        &self,
        chunk_index: usize,
        texts: &[String],
        target_language: &str,
        cancel: &CancelSignal,
        on_event: &mut F,
    ) -> ChunkAttempts
    where
        F: FnMut(ChunkEvent) + Send,
    {
        let mut attempts_made = 0u32;
        let mut last_error = ErrorKind::Network("no attempt made".to_string());

        while self.policy.allows_attempt(attempts_made) {
            if let Some(delay) = self.policy.delay_before(attempts_made) {
                tokio::time::sleep(delay).await;
            }
            if cancel.is_canceled() {
                return ChunkAttempts::Canceled;
            }

            let outcome = self
                .translator
                .translate_batch(texts, target_language, cancel)
                .await;
            attempts_made += 1;

            match outcome.into_result() {
                Ok(segments) => return ChunkAttempts::Translated(segments, attempts_made),
                Err(kind) if kind.is_cancellation() => return ChunkAttempts::Canceled,
                Err(kind) => {
                    warn!("Chunk {} attempt {} failed: {}", chunk_index + 1, attempts_made, kind);
                    if self.policy.allows_attempt(attempts_made) {
                        on_event(ChunkEvent::Retrying {
                            chunk_index,
                            next_attempt: attempts_made + 1,
                            error: kind.clone(),
                        });
                    }
                    last_error = kind;
                }
            }
        }

        ChunkAttempts::Exhausted(last_error, attempts_made)
    }
}
