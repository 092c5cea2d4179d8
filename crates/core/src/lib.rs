//! wd - Selenium-driven browser scenarios
//!
//! Provisions the Selenium server jar and GeckoDriver, launches the server,
//! opens a WebDriver session through `fantoccini`, runs a scripted interaction,
//! and waits for the page output to settle.
//!
//! # Example
//!
//! ```ignore
//! use wd::{Harness, HarnessConfig};
//!
//! let harness = Harness::new(HarnessConfig::default());
//! let report = harness.run_and_verify().await?;
//! println!("{}", report.display);
//! ```

pub mod config;
pub mod error;
pub mod harness;
pub mod poll;
pub mod remote;
pub mod report;
pub mod script;
pub mod session;

pub use config::{Capabilities, HarnessConfig, default_capabilities};
pub use error::{Error, Result};
pub use harness::{Harness, SeleniumLauncher, ServerHandle, ServerLauncher};
pub use poll::{PollConfig, SENTINEL, Stabilized};
pub use remote::{RemoteConnector, RemoteElement, RemoteSession};
pub use report::{ScenarioReport, normalize_for_display};
pub use script::ScriptConfig;
pub use session::{Browser, Connector, PageElement};
pub use wd_runtime as runtime;
