use std::io::{self, Write};

use crate::{
	aggregators::Aggregator,
	point::{MPS_TO_MPH, Point},
};

/// Numeric point attributes the extrema tracker ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
	DerivedSpeed,
	Speed,
	DerivedAcceleration,
	Distance,
	Elevation,
}

impl Field {
	pub const ALL: [Self; 5] = [Self::DerivedSpeed, Self::Speed, Self::DerivedAcceleration, Self::Distance, Self::Elevation];

	#[must_use]
	pub const fn name(self) -> &'static str {
		match self {
			Self::DerivedSpeed => "speed_calc",
			Self::Speed => "speed",
			Self::DerivedAcceleration => "acceleration_calc",
			Self::Distance => "dist",
			Self::Elevation => "elevation",
		}
	}

	#[must_use]
	pub const fn value(self, point: &Point) -> Option<f64> {
		match self {
			Self::DerivedSpeed => point.derived_speed,
			Self::Speed => point.speed,
			Self::DerivedAcceleration => point.derived_acceleration,
			Self::Distance => point.distance,
			Self::Elevation => Some(point.elevation()),
		}
	}

	/// Velocities are shown in mph.
	#[must_use]
	pub fn is_velocity(self) -> bool {
		self.name().contains("speed")
	}
}

#[derive(Debug, Clone, Copy)]
enum Rank {
	Highest,
	Lowest,
}

impl Rank {
	fn beats(self, candidate: f64, held: f64) -> bool {
		match self {
			Self::Highest => candidate > held,
			Self::Lowest => candidate < held,
		}
	}
}

/// Bounded list of the best `capacity` points for one field, best first.
#[derive(Debug, Clone)]
struct Ranking {
	rank: Rank,
	capacity: usize,
	entries: Vec<(f64, Point)>,
}

impl Ranking {
	fn new(rank: Rank, capacity: usize) -> Self {
		Self { rank, capacity, entries: Vec::with_capacity(capacity) }
	}

	fn offer(&mut self, value: f64, point: &Point) {
		if self.capacity == 0 {
			return;
		}

		if self.entries.len() == self.capacity
			&& let Some((worst, _)) = self.entries.last()
			&& !self.rank.beats(value, *worst)
		{
			return;
		}

		// equal values keep arrival order
		let at = self.entries.partition_point(|(held, _)| !self.rank.beats(value, *held));
		self.entries.insert(at, (value, point.clone()));
		self.entries.truncate(self.capacity);
	}
}

#[derive(Debug, Clone)]
struct FieldExtrema {
	field: Field,
	top: Ranking,
	low: Ranking,
}

/// Keeps the `n` highest and `n` lowest points seen for each [`Field`].
#[derive(Debug, Clone)]
pub struct TopAttributes {
	n: usize,
	fields: Vec<FieldExtrema>,
}

impl TopAttributes {
	#[must_use]
	pub fn new(n: usize) -> Self {
		Self::with_fields(n, &Field::ALL)
	}

	#[must_use]
	pub fn with_fields(n: usize, fields: &[Field]) -> Self {
		let fields = fields
			.iter()
			.map(|&field| FieldExtrema { field, top: Ranking::new(Rank::Highest, n), low: Ranking::new(Rank::Lowest, n) })
			.collect();
		Self { n, fields }
	}

	fn extrema(&self, field: Field) -> Option<&FieldExtrema> {
		self.fields.iter().find(|e| e.field == field)
	}

	/// Retained highest points for `field`, highest first.
	pub fn top(&self, field: Field) -> impl Iterator<Item = &Point> {
		self.extrema(field).into_iter().flat_map(|e| e.top.entries.iter().map(|(_, p)| p))
	}

	/// Retained lowest points for `field`, lowest first.
	pub fn lowest(&self, field: Field) -> impl Iterator<Item = &Point> {
		self.extrema(field).into_iter().flat_map(|e| e.low.entries.iter().map(|(_, p)| p))
	}

	#[must_use]
	pub fn top_values(&self, field: Field) -> Vec<f64> {
		self.extrema(field).map(|e| e.top.entries.iter().map(|(v, _)| *v).collect()).unwrap_or_default()
	}

	#[must_use]
	pub fn lowest_values(&self, field: Field) -> Vec<f64> {
		self.extrema(field).map(|e| e.low.entries.iter().map(|(v, _)| *v).collect()).unwrap_or_default()
	}

	fn write_entry(out: &mut dyn Write, field: Field, value: f64, point: &Point) -> io::Result<()> {
		let shown = if field.is_velocity() { value * MPS_TO_MPH } else { value };
		writeln!(out, "{}", point.describe())?;
		writeln!(out, "  {}: {shown}", field.name())
	}
}

impl Aggregator for TopAttributes {
	fn name(&self) -> &'static str {
		"TopAttributes"
	}

	fn update(&mut self, point: &Point) {
		for extrema in &mut self.fields {
			let Some(value) = extrema.field.value(point).filter(|v| v.is_finite()) else {
				continue;
			};
			extrema.top.offer(value, point);
			extrema.low.offer(value, point);
		}
	}

	fn display(&self, out: &mut dyn Write) -> io::Result<()> {
		writeln!(out, "-- Display of the highest//lowest of ... --")?;
		let names: Vec<_> = self.fields.iter().map(|e| e.field.name()).collect();
		writeln!(out, "    {}", names.join(" "))?;

		for extrema in &self.fields {
			writeln!(out, "\nTop {} reached:", self.n)?;
			for (value, point) in &extrema.top.entries {
				Self::write_entry(out, extrema.field, *value, point)?;
			}

			writeln!(out, "\nLowest {} reached", self.n)?;
			for (value, point) in &extrema.low.entries {
				Self::write_entry(out, extrema.field, *value, point)?;
			}
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::point::tests::sample;

	fn at_elevation(secs: i64, ele: f64) -> Point {
		Point::new(sample(secs, 40.0, -75.0, ele), None, None).unwrap()
	}

	fn with_speed(secs: i64, speed: Option<f64>) -> Point {
		let mut s = sample(secs, 40.0, -75.0, 0.0);
		s.speed = speed;
		Point::new(s, None, None).unwrap()
	}

	#[test]
	fn keeps_n_highest_and_lowest() {
		let mut tracker = TopAttributes::with_fields(3, &[Field::Elevation]);
		for (i, ele) in [5.0, 1.0, 9.0, 3.0, 7.0].into_iter().enumerate() {
			tracker.update(&at_elevation(i as i64, ele));
		}

		assert_eq!(tracker.top_values(Field::Elevation), [9.0, 7.0, 5.0]);
		assert_eq!(tracker.lowest_values(Field::Elevation), [1.0, 3.0, 5.0]);
	}

	#[test]
	fn holds_fewer_than_n_until_saturated() {
		let mut tracker = TopAttributes::new(20);
		tracker.update(&at_elevation(0, 4.0));
		tracker.update(&at_elevation(1, 2.0));

		assert_eq!(tracker.top_values(Field::Elevation), [4.0, 2.0]);
		assert_eq!(tracker.lowest_values(Field::Elevation), [2.0, 4.0]);
	}

	#[test]
	fn skips_absent_values() {
		let mut tracker = TopAttributes::new(5);
		tracker.update(&with_speed(0, None));
		tracker.update(&with_speed(1, Some(3.0)));

		assert_eq!(tracker.top_values(Field::Speed), [3.0]);
		assert!(tracker.top_values(Field::DerivedSpeed).is_empty());
		assert!(tracker.top_values(Field::DerivedAcceleration).is_empty());
		assert_eq!(tracker.top_values(Field::Elevation).len(), 2);
	}

	#[test]
	fn ties_do_not_displace_earlier_points() {
		let mut tracker = TopAttributes::with_fields(1, &[Field::Elevation]);
		tracker.update(&at_elevation(0, 5.0));
		tracker.update(&at_elevation(1, 5.0));

		let kept: Vec<_> = tracker.top(Field::Elevation).collect();
		assert_eq!(kept.len(), 1);
		assert_eq!(kept[0].timestamp, at_elevation(0, 5.0).timestamp);
	}

	#[test]
	fn retained_points_are_independent_copies() {
		let mut tracker = TopAttributes::with_fields(2, &[Field::Elevation]);
		let mut point = at_elevation(0, 10.0);
		tracker.update(&point);

		point.position.elevation = -1.0;
		assert_eq!(tracker.top(Field::Elevation).next().unwrap().elevation(), 10.0);
	}

	#[test]
	fn display_converts_only_velocities() {
		let mut tracker = TopAttributes::with_fields(1, &[Field::Speed, Field::Elevation]);
		tracker.update(&with_speed(0, Some(10.0)));

		let mut out = Vec::new();
		tracker.display(&mut out).unwrap();
		let text = String::from_utf8(out).unwrap();

		assert!(text.starts_with("-- Display of the highest//lowest of ... --\n    speed elevation\n"));
		assert!(text.contains(&format!("  speed: {}\n", 10.0 * MPS_TO_MPH)));
		assert!(text.contains("  elevation: 0\n"));
		assert_eq!(text.matches("Top 1 reached:").count(), 2);
	}
}
