//! `fantoccini`-backed WebDriver session.

use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder, Locator};
use tracing::{debug, info};

use crate::config::Capabilities;
use crate::error::{Error, Result};
use crate::session::{Browser, Connector, PageElement};

/// Connects to a Selenium hub over HTTP.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoteConnector {
	/// Log every WebDriver command at debug level.
	pub wire_debug: bool,
}

impl RemoteConnector {
	pub fn new(wire_debug: bool) -> Self {
		Self { wire_debug }
	}
}

#[async_trait]
impl Connector for RemoteConnector {
	type Session = RemoteSession;

	async fn connect(&self, hub_url: &str, capabilities: &Capabilities) -> Result<RemoteSession> {
		info!(target = "wd", hub = hub_url, capabilities = %serde_json::Value::Object(capabilities.clone()), "opening session");

		let mut builder = ClientBuilder::native();
		builder.capabilities(capabilities.clone());
		let client = builder.connect(hub_url).await.map_err(|e| Error::NewSession {
			url: hub_url.to_string(),
			message: e.to_string(),
		})?;

		Ok(RemoteSession {
			client,
			wire_debug: self.wire_debug,
		})
	}
}

/// A live session on the Selenium server.
pub struct RemoteSession {
	client: Client,
	wire_debug: bool,
}

impl RemoteSession {
	fn trace(&self, op: &'static str, arg: &str) {
		if self.wire_debug {
			debug!(target = "wd", wire = true, op, arg, "webdriver command");
		}
	}
}

#[async_trait]
impl Browser for RemoteSession {
	type Element = RemoteElement;

	async fn goto(&self, url: &str) -> Result<()> {
		self.trace("goto", url);
		self.client.goto(url).await.map_err(|e| Error::command_on("goto", url, e))
	}

	async fn find_css(&self, selector: &str) -> Result<RemoteElement> {
		self.trace("find", selector);
		let element = self
			.client
			.find(Locator::Css(selector))
			.await
			.map_err(|e| Error::command_on("find", selector, e))?;

		Ok(RemoteElement {
			element,
			selector: selector.to_string(),
			wire_debug: self.wire_debug,
		})
	}

	async fn quit(self) -> Result<()> {
		self.trace("quit", "");
		self.client.close().await.map_err(|e| Error::command("quit", e))
	}
}

/// Element handle tied to the selector it was found by.
#[derive(Clone)]
pub struct RemoteElement {
	element: fantoccini::elements::Element,
	selector: String,
	wire_debug: bool,
}

impl RemoteElement {
	fn trace(&self, op: &'static str) {
		if self.wire_debug {
			debug!(target = "wd", wire = true, op, selector = %self.selector, "webdriver command");
		}
	}

	fn fail(&self, op: &'static str, err: fantoccini::error::CmdError) -> Error {
		Error::command_on(op, self.selector.clone(), err)
	}
}

#[async_trait]
impl PageElement for RemoteElement {
	async fn clear(&self) -> Result<()> {
		self.trace("clear");
		self.element.clear().await.map_err(|e| self.fail("clear", e))?;
		Ok(())
	}

	async fn send_keys(&self, text: &str) -> Result<()> {
		self.trace("send_keys");
		self.element.send_keys(text).await.map_err(|e| self.fail("send_keys", e))?;
		Ok(())
	}

	async fn click(&self) -> Result<()> {
		self.trace("click");
		self.element.click().await.map_err(|e| self.fail("click", e))?;
		Ok(())
	}

	async fn text(&self) -> Result<String> {
		self.trace("text");
		self.element.text().await.map_err(|e| self.fail("text", e))
	}
}
