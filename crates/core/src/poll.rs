//! Waiting for an element's text to move past a placeholder.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

use crate::error::{Error, Result};
use crate::session::PageElement;

/// Placeholder shown while the remote program is still running.
pub const SENTINEL: &str = "Waiting for remote server...";

/// Fixed-interval polling policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PollConfig {
	/// Text meaning "still in progress".
	pub sentinel: String,
	/// Sleep between reads.
	pub interval_ms: u64,
	/// Upper bound on total waiting; `None` polls forever.
	pub max_wait_ms: Option<u64>,
}

impl Default for PollConfig {
	fn default() -> Self {
		Self {
			sentinel: SENTINEL.to_string(),
			interval_ms: 100,
			max_wait_ms: Some(60_000),
		}
	}
}

/// First text that differed from the sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stabilized {
	pub text: String,
	/// Number of intervals slept before `text` was read.
	pub sleeps: u32,
}

impl PollConfig {
	fn interval(&self) -> Duration {
		Duration::from_millis(self.interval_ms)
	}

	/// Reads `element` until its text differs from the sentinel.
	///
	/// Each read that returns exactly the sentinel is followed by one sleep of
	/// `interval_ms`. The comparison is exact; text that merely contains the
	/// sentinel ends the wait.
	///
	/// # Errors
	///
	/// Propagates read failures immediately. Returns
	/// [`Error::StabilizeTimeout`] when another sleep would exceed
	/// `max_wait_ms`.
	pub async fn settle<E>(&self, element: &E) -> Result<Stabilized>
	where
		E: PageElement + ?Sized,
	{
		let interval = self.interval();
		let max_wait = self.max_wait_ms.map(Duration::from_millis);
		let started = Instant::now();
		let mut sleeps = 0u32;

		loop {
			let text = element.text().await?;
			if text != self.sentinel {
				debug!(target = "wd", sleeps, "output settled");
				return Ok(Stabilized { text, sleeps });
			}

			if let Some(max_wait) = max_wait {
				let waited = started.elapsed();
				if waited + interval > max_wait {
					return Err(Error::StabilizeTimeout {
						waited_ms: waited.as_millis() as u64,
						last: text,
					});
				}
			}

			tokio::time::sleep(interval).await;
			sleeps += 1;
		}
	}
}
