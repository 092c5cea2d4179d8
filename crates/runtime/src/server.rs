//! Selenium server management
//!
//! Handles launching the Selenium standalone server under Java, waiting for it
//! to answer on its hub endpoint, and tearing it down again.

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::process::{Child, Command};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::display::{DEFAULT_SCREEN, FrameBuffer};
use crate::error::{Error, Result};

/// Interval between readiness probes.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Per-request timeout for a single readiness probe.
const READY_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Destination for the server's diagnostic output.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputSink {
	/// Forward to this process's stderr.
	#[default]
	Stderr,
	/// Forward to this process's stdout.
	Stdout,
	/// Discard.
	Null,
	/// Append to a file.
	File(PathBuf),
}

impl OutputSink {
	/// Builds the (stdout, stderr) pair for the child process.
	fn stdio_pair(&self) -> io::Result<(Stdio, Stdio)> {
		Ok(match self {
			OutputSink::Stderr => (Stdio::from(io::stderr()), Stdio::from(io::stderr())),
			OutputSink::Stdout => (Stdio::from(io::stdout()), Stdio::from(io::stdout())),
			OutputSink::Null => (Stdio::null(), Stdio::null()),
			OutputSink::File(path) => {
				let file = OpenOptions::new().create(true).append(true).open(path)?;
				let clone = file.try_clone()?;
				(Stdio::from(file), Stdio::from(clone))
			}
		})
	}
}

/// Startup options for the Selenium server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
	/// Java launcher.
	pub java: String,
	/// Host used to reach the server.
	pub host: String,
	/// TCP port the server binds.
	pub port: u16,
	/// Path prefix of the WebDriver endpoint.
	pub base_path: String,
	/// Run the browser inside an Xvfb virtual display.
	pub frame_buffer: bool,
	/// Xvfb program.
	pub xvfb: String,
	/// Xvfb screen geometry.
	pub screen: String,
	/// Where server output goes.
	pub output: OutputSink,
	/// Verbose server and protocol logging.
	pub debug: bool,
	/// How long to wait for the hub to answer.
	pub startup_timeout_ms: u64,
	/// Extra arguments appended after the server flags.
	pub extra_args: Vec<String>,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			java: "java".to_string(),
			host: "localhost".to_string(),
			port: 8080,
			base_path: "/wd/hub".to_string(),
			frame_buffer: true,
			xvfb: "Xvfb".to_string(),
			screen: DEFAULT_SCREEN.to_string(),
			output: OutputSink::Stderr,
			debug: true,
			startup_timeout_ms: 30_000,
			extra_args: Vec::new(),
		}
	}
}

impl ServerConfig {
	/// WebDriver endpoint, e.g. `http://localhost:8080/wd/hub`.
	pub fn hub_url(&self) -> String {
		format!("http://{}:{}{}", self.host, self.port, self.base_path)
	}

	fn startup_timeout(&self) -> Duration {
		Duration::from_millis(self.startup_timeout_ms)
	}
}

/// Arguments passed to the Java launcher.
pub fn server_args(jar: &Path, gecko_driver: &Path, config: &ServerConfig) -> Vec<OsString> {
	let mut driver_prop = OsString::from("-Dwebdriver.gecko.driver=");
	driver_prop.push(gecko_driver.as_os_str());

	let mut args = vec![
		driver_prop,
		OsString::from("-jar"),
		jar.as_os_str().to_owned(),
		OsString::from("-port"),
		OsString::from(config.port.to_string()),
	];
	if config.debug {
		args.push(OsString::from("-debug"));
	}
	args.extend(config.extra_args.iter().map(OsString::from));
	args
}

/// Manages the Selenium server process lifecycle
///
/// Owns the Java child process and, when enabled, the Xvfb display the browser
/// renders into. Both children are spawned with kill-on-drop, but callers are
/// expected to call [`SeleniumServer::stop`] explicitly.
#[derive(Debug)]
pub struct SeleniumServer {
	process: Child,
	frame_buffer: Option<FrameBuffer>,
	hub_url: String,
}

impl SeleniumServer {
	/// Launch the Selenium server process
	///
	/// This will:
	/// 1. Start Xvfb if `frame_buffer` is set and export its `DISPLAY`
	/// 2. Launch `java -Dwebdriver.gecko.driver=<driver> -jar <jar> -port <port>`
	/// 3. Poll `<hub>/status` until the server answers
	///
	/// # Errors
	///
	/// Returns `Error::FrameBuffer` if the virtual display cannot be started.
	/// Returns `Error::LaunchFailed` if the process fails to start or exits early.
	/// Returns `Error::NotReady` if the hub does not answer within `startup_timeout_ms`.
	pub async fn launch(jar: &Path, gecko_driver: &Path, config: &ServerConfig) -> Result<Self> {
		let frame_buffer = if config.frame_buffer {
			Some(FrameBuffer::start(&config.xvfb, &config.screen).await?)
		} else {
			None
		};

		let (stdout, stderr) = config.output.stdio_pair()?;
		let args = server_args(jar, gecko_driver, config);

		let mut cmd = Command::new(&config.java);
		cmd.args(&args)
			.stdin(Stdio::null())
			.stdout(stdout)
			.stderr(stderr)
			.kill_on_drop(true);
		if let Some(fb) = &frame_buffer {
			cmd.env("DISPLAY", fb.display());
		}

		info!(target = "wd", java = %config.java, args = ?args, port = config.port, "launching selenium server");

		let process = match cmd.spawn() {
			Ok(child) => child,
			Err(e) => {
				stop_frame_buffer(frame_buffer).await;
				return Err(Error::LaunchFailed(format!("Failed to spawn process: {e}")));
			}
		};

		let mut server = Self {
			process,
			frame_buffer,
			hub_url: config.hub_url(),
		};

		if let Err(e) = server.wait_ready(config.startup_timeout()).await {
			if let Err(stop_err) = server.stop().await {
				warn!(target = "wd", error = %stop_err, "failed to stop server after failed startup");
			}
			return Err(e);
		}

		info!(target = "wd", hub = %server.hub_url, "selenium server ready");
		Ok(server)
	}

	/// WebDriver endpoint served by this process.
	pub fn hub_url(&self) -> &str {
		&self.hub_url
	}

	/// OS process id of the Java server, if still running.
	pub fn pid(&self) -> Option<u32> {
		self.process.id()
	}

	async fn wait_ready(&mut self, timeout: Duration) -> Result<()> {
		let client = reqwest::Client::builder()
			.timeout(READY_PROBE_TIMEOUT)
			.build()
			.map_err(|e| Error::LaunchFailed(format!("Failed to build HTTP client: {e}")))?;
		let status_url = format!("{}/status", self.hub_url);
		let started = Instant::now();

		loop {
			match self.process.try_wait() {
				Ok(Some(status)) => {
					return Err(Error::LaunchFailed(format!(
						"Server process exited immediately with status: {status}"
					)));
				}
				Ok(None) => {}
				Err(e) => {
					return Err(Error::LaunchFailed(format!("Failed to check process status: {e}")));
				}
			}

			match client.get(&status_url).send().await {
				Ok(response) if response.status().is_success() => return Ok(()),
				Ok(response) => debug!(target = "wd", status = %response.status(), "server not ready"),
				Err(e) => debug!(target = "wd", error = %e, "server not reachable yet"),
			}

			let waited = started.elapsed();
			if waited >= timeout {
				return Err(Error::NotReady {
					url: self.hub_url.clone(),
					waited_ms: waited.as_millis() as u64,
				});
			}
			tokio::time::sleep(READY_POLL_INTERVAL).await;
		}
	}

	/// Stops the server, then the virtual display.
	///
	/// Both are always attempted; the first failure is returned.
	pub async fn stop(mut self) -> Result<()> {
		debug!(target = "wd", hub = %self.hub_url, "stopping selenium server");
		let server = match self.process.try_wait() {
			Ok(Some(status)) => {
				debug!(target = "wd", %status, "selenium server already exited");
				Ok(())
			}
			_ => self
				.process
				.kill()
				.await
				.map_err(|source| Error::Stop { what: "selenium server", source }),
		};

		let display = match self.frame_buffer.take() {
			Some(fb) => fb.stop().await,
			None => Ok(()),
		};

		server.and(display)
	}
}

async fn stop_frame_buffer(frame_buffer: Option<FrameBuffer>) {
	if let Some(fb) = frame_buffer {
		if let Err(e) = fb.stop().await {
			warn!(target = "wd", error = %e, "failed to stop virtual display");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hub_url_from_defaults() {
		let config = ServerConfig::default();
		assert_eq!(config.hub_url(), "http://localhost:8080/wd/hub");

		let config = ServerConfig {
			port: 4444,
			host: "127.0.0.1".into(),
			..Default::default()
		};
		assert_eq!(config.hub_url(), "http://127.0.0.1:4444/wd/hub");
	}

	#[test]
	fn args_include_driver_port_and_debug() {
		let config = ServerConfig::default();
		let args = server_args(Path::new("tmp/selenium-server.jar"), Path::new("tmp/geckodriver"), &config);
		assert_eq!(
			args,
			vec![
				OsString::from("-Dwebdriver.gecko.driver=tmp/geckodriver"),
				OsString::from("-jar"),
				OsString::from("tmp/selenium-server.jar"),
				OsString::from("-port"),
				OsString::from("8080"),
				OsString::from("-debug"),
			]
		);
	}

	#[test]
	fn args_without_debug_keep_extras_last() {
		let config = ServerConfig {
			debug: false,
			extra_args: vec!["-browserTimeout".into(), "60".into()],
			..Default::default()
		};
		let args = server_args(Path::new("s.jar"), Path::new("gd"), &config);
		assert!(!args.contains(&OsString::from("-debug")));
		assert_eq!(&args[args.len() - 2..], &[OsString::from("-browserTimeout"), OsString::from("60")]);
	}

	#[test]
	fn config_deserializes_partial_json() {
		let config: ServerConfig = serde_json::from_str(r#"{"port": 9090, "frameBuffer": false, "output": {"file": "server.log"}}"#).unwrap();
		assert_eq!(config.port, 9090);
		assert!(!config.frame_buffer);
		assert_eq!(config.output, OutputSink::File(PathBuf::from("server.log")));
		assert_eq!(config.java, "java");

		let null: ServerConfig = serde_json::from_str(r#"{"output": "null"}"#).unwrap();
		assert_eq!(null.output, OutputSink::Null);
	}
}
