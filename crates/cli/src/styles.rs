//! Terminal styling for help text and run summaries.

use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use colored::{ColoredString, Colorize};

/// Help styling in the cargo palette: green bold headers, cyan literals.
pub fn cli_styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Green.on_default().bold())
		.usage(AnsiColor::Green.on_default().bold())
		.literal(AnsiColor::Cyan.on_default())
		.placeholder(AnsiColor::Cyan.on_default())
		.valid(AnsiColor::Cyan.on_default())
}

/// `present` in green or `missing` in red.
pub fn presence(exists: bool) -> ColoredString {
	if exists { "present".green() } else { "missing".red() }
}

pub fn pass() -> ColoredString {
	"PASS".green().bold()
}

pub fn fail() -> ColoredString {
	"FAIL".red().bold()
}
