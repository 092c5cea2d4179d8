//! Local artifacts the Selenium server needs before it can start.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default working directory for downloaded artifacts.
pub const DEFAULT_WORK_DIR: &str = "./tmp";

/// Locations of the Selenium server jar and the GeckoDriver binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArtifactPaths {
	/// Directory the setup command runs in.
	pub work_dir: PathBuf,
	/// Selenium standalone server jar.
	pub selenium_jar: PathBuf,
	/// GeckoDriver executable.
	pub geckodriver: PathBuf,
}

impl Default for ArtifactPaths {
	fn default() -> Self {
		let work_dir = PathBuf::from(DEFAULT_WORK_DIR);
		Self {
			selenium_jar: work_dir.join("selenium-server.jar"),
			geckodriver: work_dir.join("geckodriver"),
			work_dir,
		}
	}
}

impl ArtifactPaths {
	/// Places both artifacts under `work_dir` with their default file names.
	pub fn in_dir(work_dir: impl Into<PathBuf>) -> Self {
		let work_dir = work_dir.into();
		Self {
			selenium_jar: work_dir.join("selenium-server.jar"),
			geckodriver: work_dir.join("geckodriver"),
			work_dir,
		}
	}

	/// Checks both paths for existence. Never fails.
	pub fn check(&self) -> ArtifactStatus {
		ArtifactStatus {
			selenium_jar: exists(&self.selenium_jar),
			geckodriver: exists(&self.geckodriver),
		}
	}

	/// Paths that do not exist right now.
	pub fn missing(&self) -> Vec<PathBuf> {
		let status = self.check();
		let mut missing = Vec::new();
		if !status.selenium_jar {
			missing.push(self.selenium_jar.clone());
		}
		if !status.geckodriver {
			missing.push(self.geckodriver.clone());
		}
		missing
	}
}

/// Existence flag per artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactStatus {
	pub selenium_jar: bool,
	pub geckodriver: bool,
}

impl ArtifactStatus {
	pub fn is_complete(&self) -> bool {
		self.selenium_jar && self.geckodriver
	}
}

fn exists(path: &Path) -> bool {
	std::fs::metadata(path).is_ok()
}
