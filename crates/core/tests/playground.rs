//! Live scenario against the Go playground.
//!
//! Needs Java, Firefox, Xvfb, and network access. Missing artifacts are
//! downloaded into `./tmp` on first run.
//!
//! ```text
//! cargo test -p wd-rs --test playground -- --ignored
//! ```

use wd::{Harness, HarnessConfig};

#[tokio::test]
#[ignore = "launches Selenium and Firefox and needs network access"]
async fn should_execute_code_in_playground() -> wd::Result<()> {
	tracing_subscriber::fmt().with_writer(std::io::stderr).try_init().ok();

	let harness = Harness::new(HarnessConfig::default());
	let report = harness.run().await?;

	print!("{}", report.display);
	assert_eq!(report.raw, "Hello Selenium Go!\n\nProgram exited.");
	Ok(())
}
