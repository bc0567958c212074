use std::{
	collections::BTreeMap,
	io::{self, Write},
};

use ordered_float::OrderedFloat;

use crate::{
	aggregators::Aggregator,
	point::{MPS_TO_MPH, Point, round2},
};

/// Distribution of receiver-reported speeds.
///
/// Speeds are counted twice: into fixed-width bins by truncating division, and
/// exactly per distinct value. The bar chart is drawn from the exact counts.
#[derive(Debug, Clone)]
pub struct SpeedHistogram {
	bin_width: f64,
	bar_width: usize,
	bins: Vec<u64>,
	counts: BTreeMap<OrderedFloat<f64>, u64>,
	out_of_range: u64,
}

impl SpeedHistogram {
	#[must_use]
	pub fn new(bins: usize, bin_width: f64, bar_width: usize) -> Self {
		Self { bin_width, bar_width, bins: vec![0; bins], counts: BTreeMap::new(), out_of_range: 0 }
	}

	#[must_use]
	pub fn bins(&self) -> &[u64] {
		&self.bins
	}

	pub fn counts(&self) -> impl Iterator<Item = (f64, u64)> + '_ {
		self.counts.iter().map(|(speed, count)| (speed.into_inner(), *count))
	}

	/// Samples whose bin index fell outside the bin array.
	#[must_use]
	pub const fn out_of_range(&self) -> u64 {
		self.out_of_range
	}

	#[must_use]
	pub fn total(&self) -> u64 {
		self.counts.values().sum()
	}

	fn bin_index(&self, speed: f64) -> Option<usize> {
		let index = (speed / self.bin_width).trunc();
		(index >= 0.0 && index < self.bins.len() as f64).then_some(index as usize)
	}
}

impl Aggregator for SpeedHistogram {
	fn name(&self) -> &'static str {
		"SpeedHistogram"
	}

	fn update(&mut self, point: &Point) {
		let Some(speed) = point.speed.filter(|s| s.is_finite()) else {
			return;
		};

		match self.bin_index(speed) {
			Some(index) => self.bins[index] += 1,
			None => self.out_of_range += 1,
		}

		*self.counts.entry(OrderedFloat(speed)).or_insert(0) += 1;
	}

	fn display(&self, out: &mut dyn Write) -> io::Result<()> {
		writeln!(out, "\n\nSpeed histogram:")?;
		writeln!(out, " total sample points= {}", self.bins.iter().sum::<u64>())?;
		if self.out_of_range > 0 {
			writeln!(out, " outside binned range= {}", self.out_of_range)?;
		}

		let Some(max_count) = self.counts.values().copied().max() else {
			writeln!(out, " no reported speeds\n")?;
			return Ok(());
		};

		writeln!(out, "upper_bound      frequency")?;
		for (speed, count) in self.counts() {
			let label = round2(speed * MPS_TO_MPH).to_string();
			let bar = "#".repeat((count as usize * self.bar_width) / max_count as usize);
			writeln!(out, "{label:<7}{bar}   {count}")?;
		}

		writeln!(out)
	}
}
