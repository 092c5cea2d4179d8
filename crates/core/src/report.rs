//! Scenario outcome and the final assertion.

use serde::Serialize;

use crate::error::{Error, Result};

/// Text produced by a scenario run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReport {
	/// Output exactly as read from the page. Verification uses this.
	pub raw: String,
	/// Output with blank lines collapsed, for display only.
	pub display: String,
	/// Poll intervals slept before the output settled.
	pub sleeps: u32,
}

impl ScenarioReport {
	pub fn new(raw: String, sleeps: u32) -> Self {
		let display = normalize_for_display(&raw);
		Self { raw, display, sleeps }
	}

	/// Checks the raw output against `expected`.
	///
	/// # Errors
	///
	/// Returns [`Error::OutputMismatch`] unless the raw output equals
	/// `expected` exactly.
	pub fn verify(&self, expected: &str) -> Result<()> {
		if self.raw == expected {
			return Ok(());
		}
		Err(Error::OutputMismatch {
			expected: expected.to_string(),
			actual: self.raw.clone(),
		})
	}
}

/// Collapses every `"\n\n"` into `"\n"`.
pub fn normalize_for_display(text: &str) -> String {
	text.replace("\n\n", "\n")
}

#[cfg(test)]
mod tests {
	use super::*;

	const OUTPUT: &str = "Hello Selenium Go!\n\nProgram exited.";

	#[test]
	fn display_collapses_blank_lines() {
		assert_eq!(normalize_for_display(OUTPUT), "Hello Selenium Go!\nProgram exited.");
		// Non-overlapping replacement: three newlines become two.
		assert_eq!(normalize_for_display("a\n\n\nb"), "a\n\nb");
		assert_eq!(normalize_for_display("a\nb"), "a\nb");
	}

	#[test]
	fn verify_accepts_only_exact_raw_output() {
		let report = ScenarioReport::new(OUTPUT.to_string(), 2);

		assert!(report.verify(OUTPUT).is_ok());
		assert!(report.verify("Hello Selenium Go!\nProgram exited.").unwrap_err().is_mismatch());
		assert!(report.verify("Hello Selenium Go!").is_err());
		assert!(report.verify("").is_err());
	}

	#[test]
	fn normalization_leaves_raw_untouched() {
		let report = ScenarioReport::new(OUTPUT.to_string(), 0);

		assert_eq!(report.raw, OUTPUT);
		assert_eq!(report.display, "Hello Selenium Go!\nProgram exited.");
		assert_ne!(report.raw, report.display);

		match report.verify(&report.display) {
			Err(Error::OutputMismatch { expected, actual }) => {
				assert_eq!(expected, report.display);
				assert_eq!(actual, OUTPUT);
			}
			other => panic!("normalized text must not verify: {other:?}"),
		}
	}
}
