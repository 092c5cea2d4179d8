//! Selenium runtime - artifacts, provisioning, and server lifecycle
//!
//! This crate owns everything that happens outside the WebDriver session:
//!
//! - **Artifacts**: checking that the Selenium jar and GeckoDriver exist
//! - **Provisioning**: running a setup command or downloading release builds
//! - **Display**: an Xvfb virtual display for headless hosts
//! - **Server**: launching the Selenium server and waiting for its hub

pub mod artifacts;
pub mod display;
pub mod error;
pub mod fetch;
pub mod provision;
pub mod server;

pub use artifacts::{ArtifactPaths, ArtifactStatus};
pub use display::FrameBuffer;
pub use error::{Error, Result};
pub use fetch::ReleaseFetcher;
pub use provision::{Provision, ProvisionConfig, Provisioner, SetupCommand, ensure_artifacts};
pub use server::{OutputSink, SeleniumServer, ServerConfig};
