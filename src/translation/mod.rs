/*!
 * Chunking, retry and cancellation for batch translation.
 *
 * - `batch`: the chunk engine driving a [`crate::providers::BatchTranslate`]
 * - `retry`: attempt counting and backoff
 * - `cancel`: the shared cancellation flag
 */

pub use self::batch::{BatchTranslator, ChunkEvent, ChunkReport, ChunkResolution, ChunkedTranslation};
pub use self::cancel::CancelSignal;
pub use self::retry::{ExhaustionAction, RetryPolicy};

pub mod batch;
pub mod cancel;
pub mod retry;
