use std::io;

use anyhow::Context;
use tracing::{error, info};
use tracklog::Analyzer;

use crate::config::Config;

mod config;

fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt()
		.with_writer(io::stderr)
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
		)
		.init();

	let config_path = std::env::args().nth(1).unwrap_or_else(|| String::from("config.toml"));
	let config = Config::load(&config_path).context("Failed to load configuration")?;
	info!(dir = %config.archive.dir.display(), cache = config.cache.enabled, "✅ Configuration loaded");

	let analyzer = match Analyzer::new(&config.analyzer_options()) {
		Ok(analyzer) => analyzer,
		Err(e) if e.is_configuration() => {
			error!("Please verify archive.dir in {config_path} points at a directory of numbered .gpx files");
			return Err(e).context("Invalid track archive");
		},
		Err(e) => return Err(e).context("Failed to open track archive"),
	};

	let stdout = io::stdout();
	let summary = analyzer.run(&mut stdout.lock()).context("Trip analysis failed")?;
	info!(points = summary.points, aggregators = summary.aggregators, "✅ Trip analysis complete");

	Ok(())
}
