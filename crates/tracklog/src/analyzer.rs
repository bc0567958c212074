use std::io::Write;

use tracing::info;

use crate::{
	aggregators::{Aggregator, ReportOptions, registry},
	cache::{SourceMode, TrackSource},
	error::{Result, TrackError},
	point::Point,
};

#[derive(Debug, Clone)]
pub struct AnalyzerOptions {
	pub source: SourceMode,
	pub report: ReportOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
	pub points: usize,
	pub aggregators: usize,
}

/// Drives one pass of a point stream through every registered aggregator.
pub struct Analyzer<S = TrackSource> {
	source: S,
	aggregators: Vec<Box<dyn Aggregator>>,
}

impl Analyzer {
	pub fn new(options: &AnalyzerOptions) -> Result<Self> {
		let source = TrackSource::from_mode(&options.source)?;
		let aggregators = registry(&options.report);

		info!("Running aggregators:");
		for aggregator in &aggregators {
			info!(" - {}", aggregator.name());
		}

		Ok(Self::with_parts(source, aggregators))
	}
}

impl<S: Iterator<Item = Result<Point>>> Analyzer<S> {
	pub fn with_parts(source: S, aggregators: Vec<Box<dyn Aggregator>>) -> Self {
		Self { source, aggregators }
	}

	/// Feeds every point to every aggregator, then displays each one once.
	///
	/// Any ingestion error aborts the run before anything is displayed.
	pub fn run(mut self, out: &mut dyn Write) -> Result<RunSummary> {
		let mut points = 0;
		for point in self.source.by_ref() {
			let point = point?;
			for aggregator in &mut self.aggregators {
				aggregator.update(&point);
			}
			points += 1;
		}
		info!(points, "Point stream exhausted");

		for aggregator in &self.aggregators {
			aggregator.display(out).map_err(TrackError::Report)?;
		}
		out.flush().map_err(TrackError::Report)?;

		Ok(RunSummary { points, aggregators: self.aggregators.len() })
	}
}
