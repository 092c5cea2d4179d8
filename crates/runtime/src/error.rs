//! Error types for the Selenium runtime.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while preparing or running the Selenium server.
#[derive(Debug, Error)]
pub enum Error {
	/// Provisioning finished but artifacts are still absent.
	#[error("Artifacts still missing after provisioning: {}", display_paths(.0))]
	ArtifactsMissing(Vec<PathBuf>),

	/// The setup command could not be started.
	#[error("Failed to start setup command '{program}': {source}")]
	ProvisionSpawn {
		program: String,
		#[source]
		source: std::io::Error,
	},

	/// The setup command exited unsuccessfully.
	#[error("Setup command '{program}' failed with status: {status}")]
	ProvisionFailed { program: String, status: std::process::ExitStatus },

	/// An artifact download failed.
	#[error("Download of {url} failed: {message}")]
	Download { url: String, message: String },

	/// A downloaded archive did not contain the expected entry.
	#[error("Archive from {url} has no '{entry}' entry")]
	ArchiveEntryMissing { url: String, entry: String },

	/// The host platform has no GeckoDriver release build.
	#[error("Unsupported platform for GeckoDriver: {os} {arch}")]
	UnsupportedPlatform { os: &'static str, arch: &'static str },

	/// Failed to launch the virtual display.
	#[error("Failed to start virtual display: {0}. Check that Xvfb is installed.")]
	FrameBuffer(String),

	/// Failed to launch the Selenium server process.
	#[error("Failed to launch Selenium server: {0}. Check that Java is installed.")]
	LaunchFailed(String),

	/// Server process started but never answered its status endpoint.
	#[error("Selenium server at {url} not ready after {waited_ms}ms")]
	NotReady { url: String, waited_ms: u64 },

	/// Failed to stop a child process.
	#[error("Failed to stop {what}: {source}")]
	Stop {
		what: &'static str,
		#[source]
		source: std::io::Error,
	},

	/// I/O error.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl Error {
	pub(crate) fn download(url: &str, err: impl std::fmt::Display) -> Self {
		Error::Download {
			url: url.to_string(),
			message: err.to_string(),
		}
	}

	/// Returns true if this error came from artifact provisioning.
	pub fn is_provisioning(&self) -> bool {
		matches!(
			self,
			Error::ArtifactsMissing(_)
				| Error::ProvisionSpawn { .. }
				| Error::ProvisionFailed { .. }
				| Error::Download { .. }
				| Error::ArchiveEntryMissing { .. }
				| Error::UnsupportedPlatform { .. }
		)
	}
}

fn display_paths(paths: &[PathBuf]) -> String {
	paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
}
