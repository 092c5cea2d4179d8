//! Human-readable output. Logs go to stderr; results go to stdout.

use std::io::{self, Write};

use wd::runtime::{ArtifactPaths, Provision};
use wd::{Error, ScenarioReport};

use crate::styles;

pub fn artifact_status(paths: &ArtifactPaths) -> String {
	let status = paths.check();
	format!(
		"selenium jar  {}  {}\ngeckodriver   {}  {}\n",
		styles::presence(status.selenium_jar),
		paths.selenium_jar.display(),
		styles::presence(status.geckodriver),
		paths.geckodriver.display(),
	)
}

pub fn provision_summary(provision: Provision) -> &'static str {
	match provision {
		Provision::AlreadyPresent => "artifacts already present",
		Provision::Provisioned => "artifacts provisioned",
	}
}

/// Prints the normalized scenario output followed by the verdict.
pub fn print_report(report: &ScenarioReport, passed: bool) {
	let mut out = io::stdout().lock();
	let _ = write!(out, "{}", report.display);
	if !report.display.ends_with('\n') {
		let _ = writeln!(out);
	}
	let verdict = if passed { styles::pass() } else { styles::fail() };
	let _ = writeln!(out, "{verdict}");
}

pub fn print_error_stderr(err: &anyhow::Error) {
	match err.downcast_ref::<Error>() {
		Some(Error::OutputMismatch { expected, actual }) => {
			eprintln!("{} output mismatch", styles::fail());
			eprintln!("  expected: {expected:?}");
			eprintln!("  actual:   {actual:?}");
		}
		_ => eprintln!("{} {err:#}", styles::fail()),
	}
}
