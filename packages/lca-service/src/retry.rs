use std::{future::Future, time::Duration};

use tokio::time;

use crate::{Error, Result};

/// Runs `operation` up to `cfg.max_attempts` times, sleeping with exponential backoff between
/// attempts. Only retryable errors trigger another attempt.
pub async fn with_retry<T, F, Fut>(cfg: &lca_config::Retry, operation: &str, mut f: F) -> Result<T>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T>>,
{
	let max_attempts = cfg.max_attempts.max(1);
	let max_backoff = Duration::from_millis(cfg.max_backoff_ms);
	let mut backoff = Duration::from_millis(cfg.initial_backoff_ms).min(max_backoff);
	let mut attempt = 1;

	loop {
		match f().await {
			Ok(value) => return Ok(value),
			Err(err) if err.is_retryable() && attempt < max_attempts => {
				tracing::warn!(
					operation,
					attempt,
					max_attempts,
					backoff_ms = backoff.as_millis() as u64,
					error = %err,
					"Retrying after a transient failure."
				);

				time::sleep(backoff).await;

				backoff = backoff.saturating_mul(2).min(max_backoff);
				attempt += 1;
			},
			Err(err) => return Err(err),
		}
	}
}

/// Bounds `fut` by `timeout_ms`; expiry becomes the error built by `on_timeout`.
pub async fn with_timeout<T, Fut>(
	timeout_ms: u64,
	on_timeout: impl FnOnce(String) -> Error,
	fut: Fut,
) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	match time::timeout(Duration::from_millis(timeout_ms), fut).await {
		Ok(result) => result,
		Err(_) => Err(on_timeout(format!("Timed out after {timeout_ms} ms."))),
	}
}
