//! The interaction script: type a program into a playground, run it, read
//! its output.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::poll::PollConfig;
use crate::report::ScenarioReport;
use crate::session::{Browser, PageElement};

/// Program typed into the playground editor.
pub const DEFAULT_PAYLOAD: &str = "
		package main
		import \"fmt\"

		func main() {
			fmt.Println(\"Hello Selenium Go!\")
		}";

/// Output the playground prints for [`DEFAULT_PAYLOAD`].
pub const DEFAULT_EXPECTED: &str = "Hello Selenium Go!\n\nProgram exited.";

/// Page, selectors, and literals for one scripted interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScriptConfig {
	/// Page to open.
	pub url: String,
	/// Editable region that receives the payload.
	pub input_selector: String,
	/// Text typed into the input.
	pub payload: String,
	/// Control that starts the run.
	pub trigger_selector: String,
	/// Region whose text is polled.
	pub output_selector: String,
	/// Output the run must produce.
	pub expected: String,
}

impl Default for ScriptConfig {
	fn default() -> Self {
		Self {
			url: "http://play.golang.org/?simple=1".to_string(),
			input_selector: "#code".to_string(),
			payload: DEFAULT_PAYLOAD.to_string(),
			trigger_selector: "#run".to_string(),
			output_selector: "#output".to_string(),
			expected: DEFAULT_EXPECTED.to_string(),
		}
	}
}

impl ScriptConfig {
	/// Runs the fixed sequence against `session`.
	///
	/// navigate → find input → clear → type → find trigger → click → find
	/// output → poll. The first failing step ends the script.
	pub async fn run<B>(&self, session: &B, poll: &PollConfig) -> Result<ScenarioReport>
	where
		B: Browser,
	{
		info!(target = "wd", url = %self.url, "navigate");
		session.goto(&self.url).await?;

		let input = session.find_css(&self.input_selector).await?;
		input.clear().await?;
		input.send_keys(&self.payload).await?;

		let trigger = session.find_css(&self.trigger_selector).await?;
		trigger.click().await?;

		let output = session.find_css(&self.output_selector).await?;
		let settled = poll.settle(&output).await?;

		let report = ScenarioReport::new(settled.text, settled.sleeps);
		info!(target = "wd", sleeps = report.sleeps, output = %report.display, "scenario output");
		Ok(report)
	}
}
