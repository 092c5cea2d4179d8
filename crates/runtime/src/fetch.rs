//! Direct download of the Selenium server jar and GeckoDriver release builds.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::artifacts::ArtifactPaths;
use crate::error::{Error, Result};
use crate::provision::Provisioner;

/// Selenium standalone server version to download
pub const SELENIUM_VERSION: &str = "3.141.59";

/// GitHub release download base for Selenium
const SELENIUM_BASE_URL: &str = "https://github.com/SeleniumHQ/selenium/releases/download";

/// GitHub release download base for GeckoDriver
const GECKODRIVER_BASE_URL: &str = "https://github.com/mozilla/geckodriver/releases/download";

/// GitHub API endpoint describing the newest GeckoDriver release
const GECKODRIVER_LATEST_URL: &str = "https://api.github.com/repos/mozilla/geckodriver/releases/latest";

/// Version keyword that resolves to the newest GeckoDriver release.
pub const LATEST: &str = "latest";

/// Downloads release builds of both artifacts over HTTPS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReleaseFetcher {
	/// Selenium standalone server version.
	pub selenium_version: String,
	/// GeckoDriver release tag (`v0.34.0`) or `latest`.
	pub geckodriver_version: String,
	/// Full jar URL, overriding the one derived from `selenium_version`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub selenium_url: Option<String>,
}

impl Default for ReleaseFetcher {
	fn default() -> Self {
		Self {
			selenium_version: SELENIUM_VERSION.to_string(),
			geckodriver_version: LATEST.to_string(),
			selenium_url: None,
		}
	}
}

impl ReleaseFetcher {
	/// URL of the Selenium standalone server jar.
	pub fn selenium_jar_url(&self) -> String {
		if let Some(url) = &self.selenium_url {
			return url.clone();
		}
		let v = &self.selenium_version;
		format!("{SELENIUM_BASE_URL}/selenium-{v}/selenium-server-standalone-{v}.jar")
	}

	/// Resolves `latest` into a concrete GeckoDriver tag.
	async fn geckodriver_tag(&self, client: &reqwest::Client) -> Result<String> {
		if self.geckodriver_version != LATEST {
			return Ok(self.geckodriver_version.clone());
		}

		let body = download(client, GECKODRIVER_LATEST_URL).await?;
		release_tag(&body)
	}
}

/// Extracts `tag_name` from a GitHub release document.
fn release_tag(body: &[u8]) -> Result<String> {
	#[derive(Deserialize)]
	struct Release {
		tag_name: String,
	}

	let release: Release = serde_json::from_slice(body)?;
	Ok(release.tag_name)
}

#[async_trait]
impl Provisioner for ReleaseFetcher {
	async fn provision(&self, paths: &ArtifactPaths) -> Result<()> {
		let client = reqwest::Client::builder()
			.user_agent(concat!("wd-rs/", env!("CARGO_PKG_VERSION")))
			.build()
			.map_err(|e| Error::download(GECKODRIVER_LATEST_URL, e))?;

		if !paths.selenium_jar.exists() {
			let url = self.selenium_jar_url();
			let bytes = download(&client, &url).await?;
			let target = paths.selenium_jar.clone();
			tokio::task::spawn_blocking(move || install(&target, &bytes, false))
				.await
				.map_err(io::Error::other)??;
		}

		if !paths.geckodriver.exists() {
			let platform = GeckoPlatform::detect()?;
			let tag = self.geckodriver_tag(&client).await?;
			let url = platform.archive_url(&tag);
			let bytes = download(&client, &url).await?;

			let target = paths.geckodriver.clone();
			tokio::task::spawn_blocking(move || extract_geckodriver(&url, platform, &bytes, &target))
				.await
				.map_err(io::Error::other)??;
		}

		Ok(())
	}
}

async fn download(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
	info!(target = "wd", url, "downloading");
	let response = client
		.get(url)
		.send()
		.await
		.and_then(|r| r.error_for_status())
		.map_err(|e| Error::download(url, e))?;
	let bytes = response.bytes().await.map_err(|e| Error::download(url, e))?;
	info!(target = "wd", url, bytes = bytes.len(), "downloaded");
	Ok(bytes.to_vec())
}

/// Writes `contents` to `<target>.part`, then renames it over `target`.
/// `target` only ever exists with its full contents and mode.
fn install(target: &Path, contents: &[u8], executable: bool) -> Result<()> {
	if let Some(parent) = target.parent() {
		std::fs::create_dir_all(parent)?;
	}

	let partial = partial_path(target);
	let written = write_partial(&partial, contents, executable).and_then(|()| std::fs::rename(&partial, target));
	if let Err(e) = written {
		let _ = std::fs::remove_file(&partial);
		return Err(e.into());
	}
	Ok(())
}

fn write_partial(partial: &Path, contents: &[u8], executable: bool) -> io::Result<()> {
	std::fs::write(partial, contents)?;

	#[cfg(unix)]
	if executable {
		use std::os::unix::fs::PermissionsExt;

		std::fs::set_permissions(partial, std::fs::Permissions::from_mode(0o755))?;
	}
	#[cfg(not(unix))]
	let _ = executable;

	Ok(())
}

fn partial_path(target: &Path) -> PathBuf {
	let mut name = target.file_name().map(|n| n.to_os_string()).unwrap_or_default();
	name.push(".part");
	target.with_file_name(name)
}

/// GeckoDriver release build flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeckoPlatform {
	Linux64,
	LinuxAarch64,
	Macos,
	MacosAarch64,
	Win64,
	WinAarch64,
}

impl GeckoPlatform {
	/// Detect the current platform
	pub fn detect() -> Result<Self> {
		Self::from_parts(std::env::consts::OS, std::env::consts::ARCH)
	}

	fn from_parts(os: &'static str, arch: &'static str) -> Result<Self> {
		match (os, arch) {
			("linux", "x86_64") => Ok(Self::Linux64),
			("linux", "aarch64") => Ok(Self::LinuxAarch64),
			("macos", "x86_64") => Ok(Self::Macos),
			("macos", "aarch64") => Ok(Self::MacosAarch64),
			("windows", "x86_64") => Ok(Self::Win64),
			("windows", "aarch64") => Ok(Self::WinAarch64),
			_ => Err(Error::UnsupportedPlatform { os, arch }),
		}
	}

	fn suffix(self) -> &'static str {
		match self {
			Self::Linux64 => "linux64.tar.gz",
			Self::LinuxAarch64 => "linux-aarch64.tar.gz",
			Self::Macos => "macos.tar.gz",
			Self::MacosAarch64 => "macos-aarch64.tar.gz",
			Self::Win64 => "win64.zip",
			Self::WinAarch64 => "win-aarch64.zip",
		}
	}

	fn is_zip(self) -> bool {
		matches!(self, Self::Win64 | Self::WinAarch64)
	}

	fn binary_name(self) -> &'static str {
		if self.is_zip() { "geckodriver.exe" } else { "geckodriver" }
	}

	/// Release archive URL for a tag such as `v0.34.0`.
	pub fn archive_url(self, tag: &str) -> String {
		format!("{GECKODRIVER_BASE_URL}/{tag}/geckodriver-{tag}-{}", self.suffix())
	}
}

/// Pulls the driver binary out of a release archive and marks it executable.
fn extract_geckodriver(url: &str, platform: GeckoPlatform, bytes: &[u8], target: &Path) -> Result<()> {
	let binary = platform.binary_name();
	let contents = if platform.is_zip() {
		read_zip_entry(bytes, binary)?
	} else {
		read_tar_gz_entry(bytes, binary)?
	};
	let contents = contents.ok_or_else(|| Error::ArchiveEntryMissing {
		url: url.to_string(),
		entry: binary.to_string(),
	})?;

	install(target, &contents, true)?;

	info!(target = "wd", path = %target.display(), "extracted geckodriver");
	Ok(())
}

fn read_tar_gz_entry(bytes: &[u8], name: &str) -> Result<Option<Vec<u8>>> {
	let gz = flate2::read::GzDecoder::new(io::Cursor::new(bytes));
	let mut archive = tar::Archive::new(gz);

	for entry in archive.entries()? {
		let mut entry = entry?;
		let path: PathBuf = entry.path()?.into_owned();
		if path.file_name().and_then(|n| n.to_str()) == Some(name) {
			let mut buf = Vec::new();
			entry.read_to_end(&mut buf)?;
			return Ok(Some(buf));
		}
	}
	Ok(None)
}

fn read_zip_entry(bytes: &[u8], name: &str) -> Result<Option<Vec<u8>>> {
	let mut archive = zip::ZipArchive::new(io::Cursor::new(bytes)).map_err(io::Error::other)?;
	let mut file = match archive.by_name(name) {
		Ok(file) => file,
		Err(zip::result::ZipError::FileNotFound) => return Ok(None),
		Err(e) => return Err(io::Error::other(e).into()),
	};
	let mut buf = Vec::new();
	file.read_to_end(&mut buf)?;
	Ok(Some(buf))
}
