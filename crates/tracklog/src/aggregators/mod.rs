use std::io::{self, Write};

use crate::point::Point;

mod passthrough;
mod speed_histogram;
mod top_attributes;

pub use passthrough::PassthroughPrinter;
pub use speed_histogram::SpeedHistogram;
pub use top_attributes::{Field, TopAttributes};

/// A stateful observer fed every point of a run exactly once, in order.
///
/// `display` is called once after the last `update`; it is the only
/// end-of-stream signal an aggregator receives.
pub trait Aggregator {
	fn name(&self) -> &'static str;

	fn update(&mut self, point: &Point);

	fn display(&self, out: &mut dyn Write) -> io::Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
	pub top_n: usize,
	pub echo_first: usize,
	pub histogram_bins: usize,
	pub histogram_bin_width: f64,
	pub histogram_bar_width: usize,
}

impl Default for ReportOptions {
	fn default() -> Self {
		Self { top_n: 20, echo_first: 100, histogram_bins: 100, histogram_bin_width: 1.0, histogram_bar_width: 75 }
	}
}

/// Every aggregator a run uses, one instance each, in display order.
#[must_use]
pub fn registry(options: &ReportOptions) -> Vec<Box<dyn Aggregator>> {
	vec![
		Box::new(PassthroughPrinter::new(options.echo_first, io::stdout())),
		Box::new(SpeedHistogram::new(options.histogram_bins, options.histogram_bin_width, options.histogram_bar_width)),
		Box::new(TopAttributes::new(options.top_n)),
	]
}
