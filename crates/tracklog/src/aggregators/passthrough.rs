use std::io::{self, Stdout, Write};

use tracing::warn;

use crate::{aggregators::Aggregator, point::Point};

/// Echoes the first `limit` points as they arrive.
pub struct PassthroughPrinter<W: Write = Stdout> {
	limit: usize,
	seen: usize,
	sink: W,
}

impl<W: Write> PassthroughPrinter<W> {
	pub const fn new(limit: usize, sink: W) -> Self {
		Self { limit, seen: 0, sink }
	}

	pub fn into_inner(self) -> W {
		self.sink
	}

	fn echo(&mut self, point: &Point) -> io::Result<()> {
		if self.seen == 0 {
			writeln!(self.sink, "Print first {} points", self.limit)?;
		}

		if self.seen < self.limit {
			writeln!(self.sink, "{}", point.describe())?;
		} else if self.seen == self.limit {
			writeln!(self.sink)?;
		}

		Ok(())
	}
}

impl<W: Write> Aggregator for PassthroughPrinter<W> {
	fn name(&self) -> &'static str {
		"PassthroughPrinter"
	}

	fn update(&mut self, point: &Point) {
		if self.limit > 0
			&& self.seen <= self.limit
			&& let Err(e) = self.echo(point)
		{
			warn!(error = %e, "Failed to echo point");
		}
		self.seen += 1;
	}

	fn display(&self, _out: &mut dyn Write) -> io::Result<()> {
		Ok(())
	}
}
