//! Xvfb virtual display for running the browser without a real X server.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// How long to wait for Xvfb to report its display number.
const DISPLAY_READY_TIMEOUT: Duration = Duration::from_secs(30);

/// Default screen geometry passed to Xvfb.
pub const DEFAULT_SCREEN: &str = "1024x768x24";

/// A running Xvfb process and the display it serves.
#[derive(Debug)]
pub struct FrameBuffer {
	process: Child,
	display: String,
}

impl FrameBuffer {
	/// Starts Xvfb and waits for it to announce its display.
	///
	/// Xvfb picks a free display itself and writes the number to the file
	/// descriptor given by `-displayfd`; stdout is used here.
	///
	/// # Errors
	///
	/// Returns [`Error::FrameBuffer`] if Xvfb cannot be spawned, exits before
	/// reporting a display, or does not report one in time.
	pub async fn start(program: &str, screen: &str) -> Result<Self> {
		let mut child = Command::new(program)
			.args(["-displayfd", "1", "-screen", "0", screen, "-nolisten", "tcp"])
			.stdin(Stdio::null())
			.stdout(Stdio::piped())
			.stderr(Stdio::null())
			.kill_on_drop(true)
			.spawn()
			.map_err(|e| Error::FrameBuffer(format!("failed to spawn {program}: {e}")))?;

		let stdout = child
			.stdout
			.take()
			.ok_or_else(|| Error::FrameBuffer("stdout not captured".to_string()))?;
		let mut lines = BufReader::new(stdout).lines();

		let line = match tokio::time::timeout(DISPLAY_READY_TIMEOUT, lines.next_line()).await {
			Ok(Ok(Some(line))) => line,
			Ok(Ok(None)) => return Err(Error::FrameBuffer(format!("{program} exited before reporting a display"))),
			Ok(Err(e)) => return Err(Error::FrameBuffer(format!("failed to read display number: {e}"))),
			Err(_) => {
				let _ = child.start_kill();
				return Err(Error::FrameBuffer(format!(
					"no display reported within {}s",
					DISPLAY_READY_TIMEOUT.as_secs()
				)));
			}
		};

		let display_name = parse_display(&line).ok_or_else(|| Error::FrameBuffer(format!("unexpected display number: {line:?}")))?;
		info!(target = "wd", display = %display_name, "virtual display started");

		Ok(Self {
			process: child,
			display: display_name,
		})
	}

	/// Value suitable for the `DISPLAY` environment variable, e.g. `:99`.
	pub fn display(&self) -> &str {
		&self.display
	}

	/// Stops Xvfb and reaps it.
	pub async fn stop(mut self) -> Result<()> {
		debug!(target = "wd", display = %self.display, "stopping virtual display");
		self.process
			.kill()
			.await
			.map_err(|source| Error::Stop { what: "virtual display", source })?;
		Ok(())
	}
}

fn parse_display(line: &str) -> Option<String> {
	let number: u32 = line.trim().parse().ok()?;
	Some(format!(":{number}"))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_display_number() {
		assert_eq!(parse_display("99\n").as_deref(), Some(":99"));
		assert_eq!(parse_display(" 0 ").as_deref(), Some(":0"));
		assert_eq!(parse_display("not a number"), None);
		assert_eq!(parse_display(""), None);
	}

	#[tokio::test]
	async fn missing_xvfb_is_reported() {
		let err = FrameBuffer::start("wd-no-such-xvfb", DEFAULT_SCREEN).await.unwrap_err();
		assert!(matches!(err, Error::FrameBuffer(ref msg) if msg.contains("wd-no-such-xvfb")));
	}

	#[cfg(unix)]
	#[tokio::test]
	async fn program_that_exits_silently_is_reported() {
		// `true` ignores its arguments and exits without printing a display.
		let err = FrameBuffer::start("true", DEFAULT_SCREEN).await.unwrap_err();
		assert!(matches!(err, Error::FrameBuffer(ref msg) if msg.contains("exited before")));
	}

	#[cfg(unix)]
	#[tokio::test]
	async fn reported_display_is_exposed_until_stop() {
		use std::os::unix::fs::PermissionsExt;

		let temp = tempfile::TempDir::new().unwrap();
		let xvfb = temp.path().join("Xvfb");
		std::fs::write(&xvfb, "#!/bin/sh\necho 42\nexec sleep 30\n").unwrap();
		std::fs::set_permissions(&xvfb, std::fs::Permissions::from_mode(0o755)).unwrap();

		let frame_buffer = FrameBuffer::start(xvfb.to_str().unwrap(), DEFAULT_SCREEN).await.unwrap();

		assert_eq!(frame_buffer.display(), ":42");
		frame_buffer.stop().await.unwrap();
	}
}
