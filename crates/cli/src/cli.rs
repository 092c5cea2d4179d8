use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use wd::HarnessConfig;
use wd::runtime::{ArtifactPaths, OutputSink};

use crate::styles::cli_styles;

#[derive(Parser, Debug)]
#[command(name = "wd")]
#[command(about = "Run a Selenium browser scenario against a local server")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// JSON config file; unspecified fields keep their defaults
	#[arg(short, long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
	/// Provision artifacts, launch the server, run the scenario, verify output
	Run(RunArgs),

	/// Make sure the Selenium jar and GeckoDriver exist, downloading if needed
	Provision(ArtifactArgs),

	/// Show whether the Selenium jar and GeckoDriver exist
	Status(ArtifactArgs),
}

impl Cli {
	/// The subcommand to run; bare `wd` means `wd run`.
	pub fn command(&self) -> Commands {
		match &self.command {
			Some(cmd) => cmd.clone(),
			None => Commands::Run(RunArgs::default()),
		}
	}
}

/// Artifact location overrides.
#[derive(Args, Debug, Clone, Default)]
pub struct ArtifactArgs {
	/// Directory holding both artifacts (default ./tmp)
	#[arg(long, value_name = "DIR")]
	pub work_dir: Option<PathBuf>,

	/// Selenium standalone server jar
	#[arg(long, value_name = "FILE")]
	pub selenium_jar: Option<PathBuf>,

	/// GeckoDriver executable
	#[arg(long, value_name = "FILE")]
	pub geckodriver: Option<PathBuf>,
}

impl ArtifactArgs {
	pub fn apply(&self, artifacts: &mut ArtifactPaths) {
		if let Some(dir) = &self.work_dir {
			*artifacts = ArtifactPaths::in_dir(dir);
		}
		if let Some(jar) = &self.selenium_jar {
			artifacts.selenium_jar = jar.clone();
		}
		if let Some(driver) = &self.geckodriver {
			artifacts.geckodriver = driver.clone();
		}
	}
}

/// Scenario run overrides.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
	#[command(flatten)]
	pub artifacts: ArtifactArgs,

	/// Port the Selenium server binds
	#[arg(short, long, value_name = "PORT")]
	pub port: Option<u16>,

	/// Do not start an Xvfb virtual display
	#[arg(long)]
	pub no_frame_buffer: bool,

	/// Give up waiting for output after this many milliseconds
	#[arg(long, value_name = "MS", conflicts_with = "no_max_wait")]
	pub max_wait_ms: Option<u64>,

	/// Poll for output without a time limit
	#[arg(long)]
	pub no_max_wait: bool,

	/// Discard Selenium server output and disable its debug logging
	#[arg(short, long)]
	pub quiet_server: bool,
}

impl RunArgs {
	pub fn apply(&self, config: &mut HarnessConfig) {
		self.artifacts.apply(&mut config.artifacts);
		if let Some(port) = self.port {
			config.server.port = port;
		}
		if self.no_frame_buffer {
			config.server.frame_buffer = false;
		}
		if let Some(ms) = self.max_wait_ms {
			config.poll.max_wait_ms = Some(ms);
		}
		if self.no_max_wait {
			config.poll.max_wait_ms = None;
		}
		if self.quiet_server {
			config.server.output = OutputSink::Null;
			config.server.debug = false;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(args: &[&str]) -> Cli {
		Cli::try_parse_from(std::iter::once("wd").chain(args.iter().copied())).unwrap()
	}

	#[test]
	fn bare_invocation_runs_with_defaults() {
		let cli = parse(&[]);
		assert_eq!(cli.verbose, 0);
		assert!(cli.config.is_none());

		let Commands::Run(args) = cli.command() else {
			panic!("expected run");
		};
		let mut config = HarnessConfig::default();
		args.apply(&mut config);
		assert_eq!(config, HarnessConfig::default());
	}

	#[test]
	fn run_flags_override_config() {
		let cli = parse(&["-vv", "run", "--port", "4444", "--no-frame-buffer", "--max-wait-ms", "5000", "--quiet-server", "--work-dir", "/opt/wd"]);
		assert_eq!(cli.verbose, 2);

		let Commands::Run(args) = cli.command() else {
			panic!("expected run");
		};
		let mut config = HarnessConfig::default();
		args.apply(&mut config);

		assert_eq!(config.server.port, 4444);
		assert!(!config.server.frame_buffer);
		assert_eq!(config.poll.max_wait_ms, Some(5000));
		assert_eq!(config.server.output, OutputSink::Null);
		assert!(!config.server.debug);
		assert_eq!(config.artifacts.selenium_jar, PathBuf::from("/opt/wd/selenium-server.jar"));
		assert_eq!(config.artifacts.geckodriver, PathBuf::from("/opt/wd/geckodriver"));
	}

	#[test]
	fn explicit_paths_win_over_work_dir() {
		let cli = parse(&["status", "--work-dir", "/opt/wd", "--geckodriver", "/usr/bin/geckodriver"]);
		let Commands::Status(args) = cli.command() else {
			panic!("expected status");
		};
		let mut artifacts = ArtifactPaths::default();
		args.apply(&mut artifacts);

		assert_eq!(artifacts.selenium_jar, PathBuf::from("/opt/wd/selenium-server.jar"));
		assert_eq!(artifacts.geckodriver, PathBuf::from("/usr/bin/geckodriver"));
	}

	#[test]
	fn unbounded_wait_conflicts_with_limit() {
		let cli = parse(&["run", "--no-max-wait"]);
		let Commands::Run(args) = cli.command() else {
			panic!("expected run");
		};
		let mut config = HarnessConfig::default();
		args.apply(&mut config);
		assert_eq!(config.poll.max_wait_ms, None);

		assert!(Cli::try_parse_from(["wd", "run", "--no-max-wait", "--max-wait-ms", "10"]).is_err());
	}

	#[test]
	fn global_config_flag_after_subcommand() {
		let cli = parse(&["provision", "--config", "wd.json"]);
		assert_eq!(cli.config, Some(PathBuf::from("wd.json")));
		assert!(matches!(cli.command(), Commands::Provision(_)));
	}
}
