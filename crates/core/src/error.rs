//! Error types for scenario runs.

use thiserror::Error;

/// Result type alias for harness operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can end a scenario run.
#[derive(Debug, Error)]
pub enum Error {
	/// Artifact, provisioning, or server process failure.
	#[error(transparent)]
	Runtime(#[from] wd_runtime::Error),

	/// The WebDriver session could not be created.
	#[error("Failed to open WebDriver session at {url}: {message}")]
	NewSession { url: String, message: String },

	/// A WebDriver command failed.
	#[error("WebDriver {op} failed{}: {message}", target.as_ref().map(|t| format!(" for '{t}'")).unwrap_or_default())]
	Command {
		op: &'static str,
		target: Option<String>,
		message: String,
	},

	/// The output never moved past the sentinel value.
	#[error("Output still {last:?} after {waited_ms}ms")]
	StabilizeTimeout { waited_ms: u64, last: String },

	/// The scenario finished with an unexpected output.
	#[error("Output mismatch: expected {expected:?}, got {actual:?}")]
	OutputMismatch { expected: String, actual: String },

	/// Invalid or unreadable configuration.
	#[error("Invalid configuration: {0}")]
	Config(String),

	/// I/O error.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl Error {
	/// Builds a [`Error::Command`] for an operation without a selector or URL.
	pub fn command(op: &'static str, err: impl std::fmt::Display) -> Self {
		Error::Command {
			op,
			target: None,
			message: err.to_string(),
		}
	}

	/// Builds a [`Error::Command`] naming the selector or URL involved.
	pub fn command_on(op: &'static str, target: impl Into<String>, err: impl std::fmt::Display) -> Self {
		Error::Command {
			op,
			target: Some(target.into()),
			message: err.to_string(),
		}
	}

	/// Returns true if this is the assertion outcome rather than a setup,
	/// process, or protocol failure.
	pub fn is_mismatch(&self) -> bool {
		matches!(self, Error::OutputMismatch { .. })
	}

	/// Returns true if this is a timeout error.
	pub fn is_timeout(&self) -> bool {
		matches!(
			self,
			Error::StabilizeTimeout { .. } | Error::Runtime(wd_runtime::Error::NotReady { .. })
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn command_errors_name_their_target() {
		let err = Error::command_on("find", "#code", "no such element");
		assert_eq!(err.to_string(), "WebDriver find failed for '#code': no such element");

		let err = Error::command("quit", "session gone");
		assert_eq!(err.to_string(), "WebDriver quit failed: session gone");
	}

	#[test]
	fn classifies_mismatch_and_timeouts() {
		let mismatch = Error::OutputMismatch {
			expected: "a".into(),
			actual: "b".into(),
		};
		assert!(mismatch.is_mismatch());
		assert!(!mismatch.is_timeout());

		let stuck = Error::StabilizeTimeout {
			waited_ms: 1000,
			last: "Waiting for remote server...".into(),
		};
		assert!(stuck.is_timeout());

		let not_ready = Error::from(wd_runtime::Error::NotReady {
			url: "http://localhost:8080/wd/hub".into(),
			waited_ms: 30_000,
		});
		assert!(not_ready.is_timeout());
	}
}
