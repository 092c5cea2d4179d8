use std::path::Path;

use anyhow::Context;
use tracing::info;
use wd::{Harness, HarnessConfig};

use crate::cli::{Cli, Commands};
use crate::output;

pub async fn dispatch(cli: &Cli) -> anyhow::Result<()> {
	let mut config = load_config(cli.config.as_deref())?;

	match cli.command() {
		Commands::Run(args) => {
			args.apply(&mut config);
			run(config).await
		}
		Commands::Provision(args) => {
			args.apply(&mut config.artifacts);
			provision(config).await
		}
		Commands::Status(args) => {
			args.apply(&mut config.artifacts);
			print!("{}", output::artifact_status(&config.artifacts));
			Ok(())
		}
	}
}

/// Defaults, or the given JSON file layered over them.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<HarnessConfig> {
	match path {
		Some(path) => HarnessConfig::from_file(path).with_context(|| format!("failed to load config from {}", path.display())),
		None => Ok(HarnessConfig::default()),
	}
}

async fn run(config: HarnessConfig) -> anyhow::Result<()> {
	config.validate()?;
	info!(target = "wd", hub = %config.hub_url(), "starting scenario");

	let harness = Harness::new(config);
	let report = harness.run().await?;

	let verdict = report.verify(&harness.config().script.expected);
	output::print_report(&report, verdict.is_ok());
	Ok(verdict?)
}

async fn provision(config: HarnessConfig) -> anyhow::Result<()> {
	let harness = Harness::new(config);
	let provision = harness.prepare().await?;
	println!("{}", output::provision_summary(provision));
	print!("{}", output::artifact_status(&harness.config().artifacts));
	Ok(())
}
