use anyhow::Context;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracklog::{AnalyzerOptions, ReportOptions, SourceMode};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
	pub archive: ArchiveConfig,
	pub cache: CacheConfig,
	pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
	pub dir: PathBuf,
}

impl Default for ArchiveConfig {
	fn default() -> Self {
		Self { dir: PathBuf::from("archive") }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
	pub enabled: bool,
	pub path: PathBuf,
}

impl Default for CacheConfig {
	fn default() -> Self {
		Self { enabled: false, path: PathBuf::from("save/points.json") }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
	pub top_n: usize,
	pub echo_first: usize,
	pub histogram_bins: usize,
	pub histogram_bin_width: f64,
	pub histogram_bar_width: usize,
}

impl Default for ReportConfig {
	fn default() -> Self {
		let defaults = ReportOptions::default();
		Self {
			top_n: defaults.top_n,
			echo_first: defaults.echo_first,
			histogram_bins: defaults.histogram_bins,
			histogram_bin_width: defaults.histogram_bin_width,
			histogram_bar_width: defaults.histogram_bar_width,
		}
	}
}

impl Config {
	/// Reads `path`, or falls back to defaults when the file does not exist.
	pub fn load(path: &str) -> anyhow::Result<Self> {
		let config = match fs::read_to_string(path) {
			Ok(content) => Self::parse(&content)?,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
			Err(e) => return Err(e).context(format!("Failed to read config file: {path}")),
		};

		config.validate()?;

		Ok(config)
	}

	pub fn parse(content: &str) -> anyhow::Result<Self> {
		toml::from_str(content).context("Failed to parse config file")
	}

	fn validate(&self) -> anyhow::Result<()> {
		if self.archive.dir.as_os_str().is_empty() {
			anyhow::bail!("archive.dir must not be empty");
		}

		if self.cache.enabled && self.cache.path.as_os_str().is_empty() {
			anyhow::bail!("cache.path must be set when the cache is enabled");
		}

		if self.report.top_n == 0 {
			anyhow::bail!("report.top_n must be greater than 0");
		}

		if self.report.histogram_bins == 0 {
			anyhow::bail!("report.histogram_bins must be greater than 0");
		}

		if !self.report.histogram_bin_width.is_finite() || self.report.histogram_bin_width <= 0.0 {
			anyhow::bail!("report.histogram_bin_width must be positive");
		}

		if self.report.histogram_bar_width == 0 {
			anyhow::bail!("report.histogram_bar_width must be greater than 0");
		}

		Ok(())
	}

	pub fn analyzer_options(&self) -> AnalyzerOptions {
		let source = if self.cache.enabled {
			SourceMode::Cached { dir: self.archive.dir.clone(), cache_path: self.cache.path.clone() }
		} else {
			SourceMode::Live { dir: self.archive.dir.clone() }
		};

		AnalyzerOptions {
			source,
			report: ReportOptions {
				top_n: self.report.top_n,
				echo_first: self.report.echo_first,
				histogram_bins: self.report.histogram_bins,
				histogram_bin_width: self.report.histogram_bin_width,
				histogram_bar_width: self.report.histogram_bar_width,
			},
		}
	}
}
