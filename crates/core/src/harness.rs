//! Scenario orchestration with guaranteed teardown.
//!
//! [`Harness::run`] walks the fixed pipeline: ensure artifacts, launch the
//! server, open a session, run the script. The server and the session are
//! scoped resources: once acquired they are always released before `run`
//! returns, whatever the script did.

use async_trait::async_trait;
use tracing::{info, warn};
use wd_runtime::{ArtifactPaths, Provision, ProvisionConfig, Provisioner, SeleniumServer, ServerConfig, ensure_artifacts};

use crate::config::HarnessConfig;
use crate::error::Result;
use crate::remote::RemoteConnector;
use crate::report::ScenarioReport;
use crate::session::{Browser, Connector};

/// A running server that can be stopped exactly once.
#[async_trait]
pub trait ServerHandle: Send {
	/// WebDriver endpoint the server answers on.
	fn hub_url(&self) -> String;

	/// Stops the server and anything it started.
	async fn stop(self) -> Result<()>;
}

/// Starts the automation server.
#[async_trait]
pub trait ServerLauncher: Send + Sync {
	type Server: ServerHandle;

	async fn launch(&self, artifacts: &ArtifactPaths, config: &ServerConfig) -> Result<Self::Server>;
}

/// Launches the Selenium standalone server under Java.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeleniumLauncher;

#[async_trait]
impl ServerLauncher for SeleniumLauncher {
	type Server = SeleniumServer;

	async fn launch(&self, artifacts: &ArtifactPaths, config: &ServerConfig) -> Result<SeleniumServer> {
		Ok(SeleniumServer::launch(&artifacts.selenium_jar, &artifacts.geckodriver, config).await?)
	}
}

#[async_trait]
impl ServerHandle for SeleniumServer {
	fn hub_url(&self) -> String {
		SeleniumServer::hub_url(self).to_string()
	}

	async fn stop(self) -> Result<()> {
		Ok(SeleniumServer::stop(self).await?)
	}
}

/// One configured scenario plus the collaborators that carry it out.
pub struct Harness<P = ProvisionConfig, L = SeleniumLauncher, C = RemoteConnector> {
	config: HarnessConfig,
	provisioner: P,
	launcher: L,
	connector: C,
}

impl Harness {
	/// Harness using the configured provisioner, a real Selenium server, and
	/// a `fantoccini` session.
	pub fn new(config: HarnessConfig) -> Self {
		Self {
			provisioner: config.provision.clone(),
			launcher: SeleniumLauncher,
			connector: RemoteConnector::new(config.server.debug),
			config,
		}
	}
}

impl<P, L, C> Harness<P, L, C>
where
	P: Provisioner,
	L: ServerLauncher,
	C: Connector,
{
	/// Harness with explicit collaborators.
	pub fn with_parts(config: HarnessConfig, provisioner: P, launcher: L, connector: C) -> Self {
		Self {
			config,
			provisioner,
			launcher,
			connector,
		}
	}

	pub fn config(&self) -> &HarnessConfig {
		&self.config
	}

	/// Makes sure both artifacts exist, provisioning them at most once.
	pub async fn prepare(&self) -> Result<Provision> {
		Ok(ensure_artifacts(&self.config.artifacts, &self.provisioner).await?)
	}

	/// Runs the whole scenario and returns its output without verifying it.
	///
	/// Errors before the server is launched release nothing. After that, the
	/// session is quit and the server stopped on every path; if the script
	/// failed, its error is returned and teardown failures are only logged.
	pub async fn run(&self) -> Result<ScenarioReport> {
		let provision = self.prepare().await?;
		info!(target = "wd", ?provision, "artifacts ready");

		let server = self.launcher.launch(&self.config.artifacts, &self.config.server).await?;
		let outcome = self.run_session(&server.hub_url()).await;
		let stopped = server.stop().await;
		settle(outcome, stopped, "server")
	}

	/// Runs the scenario, then checks the raw output against the expected
	/// literal. Teardown has already happened when a mismatch is reported.
	pub async fn run_and_verify(&self) -> Result<ScenarioReport> {
		let report = self.run().await?;
		report.verify(&self.config.script.expected)?;
		Ok(report)
	}

	async fn run_session(&self, hub_url: &str) -> Result<ScenarioReport> {
		let session = self.connector.connect(hub_url, &self.config.capabilities).await?;
		let outcome = self.config.script.run(&session, &self.config.poll).await;
		let quit = session.quit().await;
		settle(outcome, quit, "session")
	}
}

/// Combines a body's outcome with its teardown result.
fn settle<T>(outcome: Result<T>, teardown: Result<()>, resource: &'static str) -> Result<T> {
	match (outcome, teardown) {
		(Ok(value), Ok(())) => Ok(value),
		(Ok(_), Err(err)) => Err(err),
		(Err(err), Ok(())) => Err(err),
		(Err(err), Err(teardown_err)) => {
			warn!(target = "wd", resource, error = %teardown_err, "teardown failed after earlier error");
			Err(err)
		}
	}
}

impl<P, L, C> std::fmt::Debug for Harness<P, L, C> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Harness").field("config", &self.config).finish_non_exhaustive()
	}
}
