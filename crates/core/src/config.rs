//! Harness configuration.
//!
//! Everything a run needs is carried by [`HarnessConfig`] and handed to
//! [`crate::Harness`] explicitly, so separate runs can use separate ports and
//! artifact directories. Defaults reproduce the stock scenario.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use wd_runtime::{ArtifactPaths, ProvisionConfig, ServerConfig};

use crate::error::{Error, Result};
use crate::poll::PollConfig;
use crate::script::ScriptConfig;

/// Capability descriptor sent when the session is created.
pub type Capabilities = Map<String, Value>;

/// Browser requested unless configured otherwise.
pub const DEFAULT_BROWSER: &str = "firefox";

/// `{"browserName": "firefox"}`
pub fn default_capabilities() -> Capabilities {
	let mut caps = Map::new();
	caps.insert("browserName".to_string(), Value::String(DEFAULT_BROWSER.to_string()));
	caps
}

/// Fully owned configuration for one scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HarnessConfig {
	/// Selenium jar and GeckoDriver locations.
	pub artifacts: ArtifactPaths,
	/// How missing artifacts are fetched.
	pub provision: ProvisionConfig,
	/// Selenium server startup options.
	pub server: ServerConfig,
	/// Capability descriptor for the session.
	pub capabilities: Capabilities,
	/// The interaction script.
	pub script: ScriptConfig,
	/// Output stabilization policy.
	pub poll: PollConfig,
}

impl Default for HarnessConfig {
	fn default() -> Self {
		Self {
			artifacts: ArtifactPaths::default(),
			provision: ProvisionConfig::default(),
			server: ServerConfig::default(),
			capabilities: default_capabilities(),
			script: ScriptConfig::default(),
			poll: PollConfig::default(),
		}
	}
}

impl HarnessConfig {
	/// Parses a JSON document; missing fields keep their defaults.
	pub fn from_json(json: &str) -> Result<Self> {
		let config: Self = serde_json::from_str(json)?;
		config.validate()?;
		Ok(config)
	}

	/// Reads and parses a JSON config file.
	pub fn from_file(path: &Path) -> Result<Self> {
		let contents = std::fs::read_to_string(path)?;
		Self::from_json(&contents)
	}

	/// WebDriver endpoint of the configured server.
	pub fn hub_url(&self) -> String {
		self.server.hub_url()
	}

	/// Rejects configurations that cannot produce a working run.
	pub fn validate(&self) -> Result<()> {
		if self.server.port == 0 {
			return Err(Error::Config("server.port must be non-zero".into()));
		}
		if !self.server.base_path.starts_with('/') {
			return Err(Error::Config(format!(
				"server.basePath must start with '/': {:?}",
				self.server.base_path
			)));
		}
		if self.poll.interval_ms == 0 {
			return Err(Error::Config("poll.intervalMs must be non-zero".into()));
		}
		if !self.capabilities.contains_key("browserName") {
			return Err(Error::Config("capabilities.browserName is required".into()));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use std::path::PathBuf;

	use super::*;

	#[test]
	fn defaults_match_stock_scenario() {
		let config = HarnessConfig::default();

		assert_eq!(config.artifacts.selenium_jar, PathBuf::from("./tmp/selenium-server.jar"));
		assert_eq!(config.artifacts.geckodriver, PathBuf::from("./tmp/geckodriver"));
		assert_eq!(config.server.port, 8080);
		assert_eq!(config.hub_url(), "http://localhost:8080/wd/hub");
		assert!(config.server.frame_buffer);
		assert!(config.server.debug);
		assert_eq!(Value::Object(config.capabilities.clone()), serde_json::json!({"browserName": "firefox"}));
		assert_eq!(config.poll.interval_ms, 100);
		assert!(config.validate().is_ok());
	}

	#[test]
	fn json_overrides_keep_other_defaults() {
		let config = HarnessConfig::from_json(
			r#"{
				"server": {"port": 4444},
				"artifacts": {"workDir": "/opt/wd", "seleniumJar": "/opt/wd/s.jar", "geckodriver": "/opt/wd/gd"},
				"poll": {"maxWaitMs": null},
				"capabilities": {"browserName": "firefox", "moz:firefoxOptions": {"args": ["-headless"]}}
			}"#,
		)
		.unwrap();

		assert_eq!(config.hub_url(), "http://localhost:4444/wd/hub");
		assert_eq!(config.artifacts.selenium_jar, PathBuf::from("/opt/wd/s.jar"));
		assert_eq!(config.poll.max_wait_ms, None);
		assert_eq!(config.poll.interval_ms, 100);
		assert!(config.capabilities.contains_key("moz:firefoxOptions"));
		assert_eq!(config.script, ScriptConfig::default());
	}

	#[test]
	fn validation_rejects_unusable_values() {
		let mut config = HarnessConfig::default();
		config.server.port = 0;
		assert!(matches!(config.validate(), Err(Error::Config(_))));

		let mut config = HarnessConfig::default();
		config.server.base_path = "wd/hub".into();
		assert!(matches!(config.validate(), Err(Error::Config(_))));

		let mut config = HarnessConfig::default();
		config.capabilities.clear();
		assert!(matches!(config.validate(), Err(Error::Config(_))));

		assert!(matches!(HarnessConfig::from_json(r#"{"poll": {"intervalMs": 0}}"#), Err(Error::Config(_))));
		assert!(matches!(HarnessConfig::from_json("{not json"), Err(Error::Json(_))));
	}
}
