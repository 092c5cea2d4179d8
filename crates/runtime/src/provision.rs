//! Making missing artifacts appear on disk.
//!
//! [`ensure_artifacts`] checks both artifact paths and invokes a
//! [`Provisioner`] exactly once when either is missing. Two provisioners ship
//! with the crate:
//!
//! * [`SetupCommand`]: runs an external helper program inside the work directory
//! * [`ReleaseFetcher`]: downloads release builds directly over HTTPS

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, info};

use crate::artifacts::ArtifactPaths;
use crate::error::{Error, Result};
use crate::fetch::ReleaseFetcher;

/// Flags passed to the setup helper unless configured otherwise.
pub const DEFAULT_SETUP_ARGS: [&str; 3] = ["--alsologtostderr", "--download_browsers", "--download_latest"];

/// Something that can fetch the Selenium jar and GeckoDriver.
#[async_trait]
pub trait Provisioner: Send + Sync {
	/// Fetches the artifacts described by `paths`.
	async fn provision(&self, paths: &ArtifactPaths) -> Result<()>;
}

#[async_trait]
impl<T: Provisioner + ?Sized> Provisioner for &T {
	async fn provision(&self, paths: &ArtifactPaths) -> Result<()> {
		(**self).provision(paths).await
	}
}

/// What [`ensure_artifacts`] had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provision {
	/// Both artifacts were already on disk; nothing was invoked.
	AlreadyPresent,
	/// The provisioner ran and both artifacts now exist.
	Provisioned,
}

/// Checks both artifacts and provisions them when either is missing.
///
/// The provisioner runs at most once. Its failure is returned as-is and is not
/// retried.
///
/// # Errors
///
/// Returns the provisioner's error, or [`Error::ArtifactsMissing`] if it
/// reported success without producing both files.
pub async fn ensure_artifacts<P>(paths: &ArtifactPaths, provisioner: &P) -> Result<Provision>
where
	P: Provisioner + ?Sized,
{
	let missing = paths.missing();
	if missing.is_empty() {
		debug!(target = "wd", jar = %paths.selenium_jar.display(), driver = %paths.geckodriver.display(), "artifacts present");
		return Ok(Provision::AlreadyPresent);
	}

	info!(target = "wd", missing = ?missing, "provisioning missing artifacts");
	provisioner.provision(paths).await?;

	let still_missing = paths.missing();
	if !still_missing.is_empty() {
		return Err(Error::ArtifactsMissing(still_missing));
	}
	Ok(Provision::Provisioned)
}

/// Runs an external helper that downloads the artifacts into the work directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupCommand {
	/// Program to execute.
	pub program: String,
	/// Arguments passed to the program.
	#[serde(default = "default_setup_args")]
	pub args: Vec<String>,
	/// Working directory override; defaults to the artifact work directory.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub dir: Option<PathBuf>,
}

fn default_setup_args() -> Vec<String> {
	DEFAULT_SETUP_ARGS.iter().map(|s| s.to_string()).collect()
}

impl SetupCommand {
	/// Creates a setup command with the default download flags.
	pub fn new(program: impl Into<String>) -> Self {
		Self {
			program: program.into(),
			args: default_setup_args(),
			dir: None,
		}
	}

	/// Replaces the argument list.
	pub fn with_args<I, S>(mut self, args: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.args = args.into_iter().map(Into::into).collect();
		self
	}
}

#[async_trait]
impl Provisioner for SetupCommand {
	async fn provision(&self, paths: &ArtifactPaths) -> Result<()> {
		let dir = self.dir.as_ref().unwrap_or(&paths.work_dir);
		tokio::fs::create_dir_all(dir).await?;

		info!(target = "wd", program = %self.program, args = ?self.args, dir = %dir.display(), "running setup command");

		let status = Command::new(&self.program)
			.args(&self.args)
			.current_dir(dir)
			.stdin(Stdio::null())
			.stdout(Stdio::inherit())
			.stderr(Stdio::inherit())
			.status()
			.await
			.map_err(|source| Error::ProvisionSpawn {
				program: self.program.clone(),
				source,
			})?;

		if !status.success() {
			return Err(Error::ProvisionFailed {
				program: self.program.clone(),
				status,
			});
		}
		Ok(())
	}
}

/// Provisioning strategy selected by configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ProvisionConfig {
	/// Run an external helper program.
	Command(SetupCommand),
	/// Download release builds directly.
	Fetch(ReleaseFetcher),
}

impl Default for ProvisionConfig {
	fn default() -> Self {
		ProvisionConfig::Fetch(ReleaseFetcher::default())
	}
}

#[async_trait]
impl Provisioner for ProvisionConfig {
	async fn provision(&self, paths: &ArtifactPaths) -> Result<()> {
		match self {
			ProvisionConfig::Command(cmd) => cmd.provision(paths).await,
			ProvisionConfig::Fetch(fetcher) => fetcher.provision(paths).await,
		}
	}
}

#[cfg(test)]
mod tests {
	use std::fs;
	use std::sync::atomic::{AtomicUsize, Ordering};

	use tempfile::TempDir;

	use super::*;

	/// Writes whichever artifacts are missing and counts invocations.
	#[derive(Default)]
	struct Recording {
		calls: AtomicUsize,
		write: bool,
	}

	#[async_trait]
	impl Provisioner for Recording {
		async fn provision(&self, paths: &ArtifactPaths) -> Result<()> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			if self.write {
				fs::write(&paths.selenium_jar, b"jar")?;
				fs::write(&paths.geckodriver, b"bin")?;
			}
			Ok(())
		}
	}

	#[tokio::test]
	async fn present_artifacts_skip_provisioner() {
		let temp = TempDir::new().unwrap();
		let paths = ArtifactPaths::in_dir(temp.path());
		fs::write(&paths.selenium_jar, b"jar").unwrap();
		fs::write(&paths.geckodriver, b"bin").unwrap();

		let recorder = Recording { write: true, ..Default::default() };
		let outcome = ensure_artifacts(&paths, &recorder).await.unwrap();

		assert_eq!(outcome, Provision::AlreadyPresent);
		assert_eq!(recorder.calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn one_missing_artifact_provisions_once() {
		let temp = TempDir::new().unwrap();
		let paths = ArtifactPaths::in_dir(temp.path());
		fs::write(&paths.selenium_jar, b"jar").unwrap();

		let recorder = Recording { write: true, ..Default::default() };
		let outcome = ensure_artifacts(&paths, &recorder).await.unwrap();

		assert_eq!(outcome, Provision::Provisioned);
		assert_eq!(recorder.calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn provisioner_that_writes_nothing_is_reported() {
		let temp = TempDir::new().unwrap();
		let paths = ArtifactPaths::in_dir(temp.path());

		let recorder = Recording::default();
		let err = ensure_artifacts(&paths, &recorder).await.unwrap_err();

		assert!(matches!(err, Error::ArtifactsMissing(ref missing) if missing.len() == 2));
		assert!(err.is_provisioning());
		assert_eq!(recorder.calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn setup_command_defaults_to_download_flags() {
		let cmd = SetupCommand::new("setup");
		assert_eq!(cmd.args, vec!["--alsologtostderr", "--download_browsers", "--download_latest"]);

		let parsed: SetupCommand = serde_json::from_str(r#"{"program": "setup"}"#).unwrap();
		assert_eq!(parsed, cmd);
	}

	#[test]
	fn provision_config_defaults_to_fetch() {
		assert!(matches!(ProvisionConfig::default(), ProvisionConfig::Fetch(_)));

		let parsed: ProvisionConfig = serde_json::from_str(r#"{"kind": "command", "program": "setup", "args": ["-x"]}"#).unwrap();
		assert_eq!(parsed, ProvisionConfig::Command(SetupCommand::new("setup").with_args(["-x"])));
	}

	#[cfg(unix)]
	#[tokio::test]
	async fn setup_command_runs_in_work_dir() {
		let temp = TempDir::new().unwrap();
		let paths = ArtifactPaths::in_dir(temp.path().join("tmp"));
		let cmd = SetupCommand::new("sh").with_args(["-c", "touch selenium-server.jar geckodriver"]);

		let outcome = ensure_artifacts(&paths, &cmd).await.unwrap();

		assert_eq!(outcome, Provision::Provisioned);
		assert!(paths.check().is_complete());
	}

	#[cfg(unix)]
	#[tokio::test]
	async fn setup_command_nonzero_exit_is_fatal() {
		let temp = TempDir::new().unwrap();
		let paths = ArtifactPaths::in_dir(temp.path());
		let cmd = SetupCommand::new("sh").with_args(["-c", "exit 3"]);

		let err = ensure_artifacts(&paths, &cmd).await.unwrap_err();

		match err {
			Error::ProvisionFailed { program, status } => {
				assert_eq!(program, "sh");
				assert_eq!(status.code(), Some(3));
			}
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[tokio::test]
	async fn setup_command_missing_program_is_fatal() {
		let temp = TempDir::new().unwrap();
		let paths = ArtifactPaths::in_dir(temp.path());
		let cmd = SetupCommand::new("wd-definitely-not-a-real-program");

		let err = cmd.provision(&paths).await.unwrap_err();
		assert!(matches!(err, Error::ProvisionSpawn { .. }));
	}
}
