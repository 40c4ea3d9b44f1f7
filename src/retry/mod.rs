//! Retry orchestration for indeterminate VMC results.
//!
//! The validation service may answer `indeterminate_revocation` (or report a
//! transient `timeout`/`network` failure) together with a retry hint. The
//! orchestrator re-polls the service on that hint:
//!
//! ```text
//! Initial ──(pending + hint)──> Polling ──(revocation ok / not pending / no hint)──> Resolved
//!    │                             │
//!    └──(otherwise)──> Resolved    └──(attempts used up)──> Exhausted
//! ```
//!
//! The hint is clamped to the local [`RetryPolicy`] caps and every wait can be
//! interrupted through a `CancellationToken`.

use std::time::Duration;

use serde::Serialize;
use tokio_retry::strategy::FixedInterval;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, MAX_RETRIES_CAP, MAX_RETRY_DELAY_SECS};
use crate::error_handling::VerificationError;
use crate::vmc::{RetrySuggestion, VmcValidationResult, VmcValidator};

/// Local upper bounds on the server-supplied retry hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES_CAP,
            max_delay: Duration::from_secs(MAX_RETRY_DELAY_SECS),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_retries: config.max_retries_cap,
            max_delay: Duration::from_secs(config.max_retry_delay_secs),
        }
    }

    /// Applies the caps to a hint, returning `(retries, delay)`.
    pub fn clamp(&self, hint: RetrySuggestion) -> (u32, Duration) {
        (
            hint.max_retries.min(self.max_retries),
            Duration::from_secs(hint.retry_after_seconds).min(self.max_delay),
        )
    }
}

/// How the polling loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollState {
    /// No retry was warranted, or a retry produced a settled result.
    Resolved,
    /// The retry budget ran out while the result was still pending.
    Exhausted,
}

/// Final result of [`poll_until_settled`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollOutcome {
    pub result: VmcValidationResult,
    pub state: PollState,
    /// Total validator calls, the initial one included
    pub attempts: u32,
}

/// Per-invocation polling state; dropped when the call returns.
struct RetryState {
    attempts_remaining: u32,
    last_result: VmcValidationResult,
}

/// The hint to follow, if the result warrants polling again.
///
/// A pending result without a hint is final.
pub fn retry_hint(result: &VmcValidationResult) -> Option<RetrySuggestion> {
    result.retry_suggestion.filter(|_| result.is_pending())
}

/// Calls the validator and keeps polling while the result is pending.
///
/// Every response must carry its own retry hint to keep the loop going; the
/// retry budget and delay come from the first one.
///
/// # Errors
///
/// Transport, HTTP-status and schema errors from any call propagate
/// immediately. Returns `VerificationError::Cancelled` if `cancel` fires
/// during a wait. Running out of retries is not an error: the last result is
/// returned with [`PollState::Exhausted`].
pub async fn poll_until_settled<V: VmcValidator>(
    validator: &V,
    domain: &str,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> Result<PollOutcome, VerificationError> {
    let first = validator.validate(domain).await?;
    let Some(hint) = retry_hint(&first) else {
        return Ok(PollOutcome {
            result: first,
            state: PollState::Resolved,
            attempts: 1,
        });
    };

    let (max_retries, delay) = policy.clamp(hint);
    if max_retries < hint.max_retries || delay.as_secs() < hint.retry_after_seconds {
        log::warn!(
            "Clamped VMC retry hint for {domain} from {}x{}s to {}x{}s",
            hint.max_retries,
            hint.retry_after_seconds,
            max_retries,
            delay.as_secs()
        );
    }
    log::info!(
        "VMC result for {domain} is {:?}; polling up to {max_retries} more times every {}s",
        first.status,
        delay.as_secs()
    );

    let mut state = RetryState {
        attempts_remaining: max_retries,
        last_result: first,
    };
    let mut attempts = 1;

    for wait in FixedInterval::new(delay).take(max_retries as usize) {
        sleep_or_cancel(wait, cancel).await?;
        state.attempts_remaining -= 1;

        let next = validator.validate(domain).await?;
        attempts += 1;

        // A result without a hint is final even while still pending
        if next.revocation_ok == Some(true) || retry_hint(&next).is_none() {
            log::info!(
                "VMC result for {domain} settled as {:?} after {attempts} calls",
                next.status
            );
            return Ok(PollOutcome {
                result: next,
                state: PollState::Resolved,
                attempts,
            });
        }
        log::debug!(
            "VMC result for {domain} still pending, {} retries left",
            state.attempts_remaining
        );
        state.last_result = next;
    }

    log::warn!("VMC result for {domain} still pending after {attempts} calls");
    Ok(PollOutcome {
        result: state.last_result,
        state: PollState::Exhausted,
        attempts,
    })
}

async fn sleep_or_cancel(
    delay: Duration,
    cancel: &CancellationToken,
) -> Result<(), VerificationError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(VerificationError::Cancelled),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}
