//! Bounded retry-with-fallback execution.
//!
//! A small capability used wherever a fallible operation has a recovery
//! action worth running between attempts (for the retriever: refreshing
//! metadata after a failed decode). Generic over the success and error
//! types so it is not reinvented per call site.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Retry configuration.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of `exec` attempts.
    pub max_attempts: u32,
    /// Sleep between attempts.
    pub inter_attempt_delay: Duration,
    /// Keep retrying even when the fallback itself fails.
    pub retry_on_fallback_error: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            inter_attempt_delay: Duration::ZERO,
            retry_on_fallback_error: true,
        }
    }
}

impl From<&config::RetryConfig> for RetryPolicy {
    fn from(config: &config::RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            inter_attempt_delay: Duration::from_millis(config.inter_attempt_delay_ms),
            retry_on_fallback_error: config.retry_on_fallback_error,
        }
    }
}

/// Failure of a retried operation.
#[derive(Debug)]
pub enum RetryError<E> {
    /// The cancellation handle fired; not an error condition of the
    /// operation itself.
    Cancelled,
    /// Every attempt failed; causes are in attempt order.
    Exhausted { attempts: Vec<E> },
    /// The fallback failed and `retry_on_fallback_error` is off; carries
    /// the triggering attempt's cause and the fallback's cause.
    FallbackFailed { cause: E, fallback_cause: E },
}

impl<E> RetryError<E> {
    /// The causes collected so far, in order.
    pub fn causes(&self) -> Vec<&E> {
        match self {
            RetryError::Cancelled => vec![],
            RetryError::Exhausted { attempts } => attempts.iter().collect(),
            RetryError::FallbackFailed {
                cause,
                fallback_cause,
            } => vec![cause, fallback_cause],
        }
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Cancelled => write!(f, "operation cancelled"),
            RetryError::Exhausted { attempts } => {
                write!(f, "operation failed after {} attempt(s): ", attempts.len())?;
                for (i, cause) in attempts.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "attempt {}: {}", i + 1, cause)?;
                }
                Ok(())
            }
            RetryError::FallbackFailed {
                cause,
                fallback_cause,
            } => write!(
                f,
                "operation failed ({cause}) and its fallback also failed ({fallback_cause})"
            ),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for RetryError<E> {}

/// Run `exec` up to `policy.max_attempts` times, invoking `fallback`
/// between failed attempts.
///
/// Returns the first success. Exhaustion aggregates every attempt's cause
/// in order; nothing is swallowed. All waits select against `cancel`, so
/// cancellation exits the loop promptly.
pub async fn retry_with_fallback<T, E, ExecFn, ExecFut, FbFn, FbFut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut exec: ExecFn,
    mut fallback: FbFn,
) -> Result<T, RetryError<E>>
where
    E: fmt::Display,
    ExecFn: FnMut() -> ExecFut,
    ExecFut: Future<Output = Result<T, E>>,
    FbFn: FnMut() -> FbFut,
    FbFut: Future<Output = Result<(), E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempts = Vec::new();

    for attempt in 1..=max_attempts {
        let result = tokio::select! {
            _ = cancel.cancelled() => return Err(RetryError::Cancelled),
            result = exec() => result,
        };

        match result {
            Ok(value) => return Ok(value),
            Err(cause) => {
                tracing::debug!(attempt, max_attempts, error = %cause, "attempt failed");
                attempts.push(cause);
            }
        }

        // The fallback only matters if another attempt follows.
        if attempt == max_attempts {
            break;
        }

        let fallback_result = tokio::select! {
            _ = cancel.cancelled() => return Err(RetryError::Cancelled),
            result = fallback() => result,
        };

        if let Err(fallback_cause) = fallback_result {
            if !policy.retry_on_fallback_error {
                let cause = attempts
                    .pop()
                    .expect("at least one failed attempt is recorded");
                return Err(RetryError::FallbackFailed {
                    cause,
                    fallback_cause,
                });
            }
            tracing::debug!(error = %fallback_cause, "fallback failed, retrying anyway");
        }

        if !policy.inter_attempt_delay.is_zero() {
            tokio::select! {
                _ = cancel.cancelled() => return Err(RetryError::Cancelled),
                _ = tokio::time::sleep(policy.inter_attempt_delay) => {}
            }
        }
    }

    Err(RetryError::Exhausted { attempts })
}
