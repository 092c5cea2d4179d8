//! Seams between the harness and a WebDriver client.
//!
//! The harness only needs a handful of operations: navigate, locate by CSS
//! selector, and four element interactions. [`crate::remote`] implements them
//! on top of `fantoccini`; tests implement them with scripted fakes.

use async_trait::async_trait;

use crate::config::Capabilities;
use crate::error::Result;

/// An element located on the current page.
///
/// Handles are only valid for the page they were found on.
#[async_trait]
pub trait PageElement: Send + Sync {
	/// Clears an editable element.
	async fn clear(&self) -> Result<()>;

	/// Types `text` into the element.
	async fn send_keys(&self, text: &str) -> Result<()>;

	/// Clicks the element.
	async fn click(&self) -> Result<()>;

	/// Reads the element's rendered text.
	async fn text(&self) -> Result<String>;
}

/// An open WebDriver session.
#[async_trait]
pub trait Browser: Send + Sync {
	type Element: PageElement;

	/// Navigates the session to `url`.
	async fn goto(&self, url: &str) -> Result<()>;

	/// Locates the first element matching a CSS selector.
	async fn find_css(&self, selector: &str) -> Result<Self::Element>;

	/// Ends the session and closes the browser.
	async fn quit(self) -> Result<()>;
}

/// Opens sessions against a WebDriver endpoint.
#[async_trait]
pub trait Connector: Send + Sync {
	type Session: Browser;

	/// Creates a session at `hub_url` requesting `capabilities`.
	async fn connect(&self, hub_url: &str, capabilities: &Capabilities) -> Result<Self::Session>;
}
