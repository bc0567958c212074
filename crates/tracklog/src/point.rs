use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
	coordinate::Coordinate,
	error::{Result, TrackError},
	extractor::RecordExtractor,
};

/// Factor converting meters per second into miles per hour, used only for display.
pub const MPS_TO_MPH: f64 = 2.236_94;

const COMPASS: [&str; 4] = ["N", "E", "S", "W"];
const COMPASS_BLENDED: [&str; 4] = ["NW", "EN", "SE", "WS"];

/// Raw values read from a single record, before any lookback is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
	pub timestamp: DateTime<Utc>,
	pub speed: Option<f64>,
	pub course: Option<f64>,
	pub position: Coordinate,
}

impl Sample {
	pub fn from_record<E: RecordExtractor + ?Sized>(extractor: &E, record: &str) -> Result<Self> {
		let time = extractor.field(record, "time").ok_or(TrackError::MissingField("time"))?;
		let timestamp = DateTime::parse_from_rfc3339(time)
			.map_err(|e| TrackError::InvalidField { field: "time", value: time.to_string(), reason: e.to_string() })?
			.with_timezone(&Utc);

		let speed = optional_number(extractor, record, "speed")?;
		let course = optional_number(extractor, record, "course")?;

		let latitude = required_number(extractor, record, "lat")?;
		let longitude = required_number(extractor, record, "lon")?;
		let elevation = required_number(extractor, record, "ele")?;

		Ok(Self { timestamp, speed, course, position: Coordinate::new(latitude, longitude, elevation) })
	}
}

fn parse_number(field: &'static str, raw: &str) -> Result<f64> {
	let value = raw
		.parse::<f64>()
		.map_err(|e| TrackError::InvalidField { field, value: raw.to_string(), reason: e.to_string() })?;

	if !value.is_finite() {
		return Err(TrackError::InvalidField { field, value: raw.to_string(), reason: String::from("not finite") });
	}

	Ok(value)
}

fn required_number<E: RecordExtractor + ?Sized>(extractor: &E, record: &str, field: &'static str) -> Result<f64> {
	let raw = extractor.field(record, field).ok_or(TrackError::MissingField(field))?;
	parse_number(field, raw)
}

fn optional_number<E: RecordExtractor + ?Sized>(extractor: &E, record: &str, field: &'static str) -> Result<Option<f64>> {
	extractor.field(record, field).map(|raw| parse_number(field, raw)).transpose()
}

/// One track sample together with the kinematics derived from its predecessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
	pub timestamp: DateTime<Utc>,
	/// Speed reported by the receiver, m/s.
	pub speed: Option<f64>,
	/// Heading reported by the receiver, degrees.
	pub course: Option<f64>,
	pub position: Coordinate,
	/// Meters travelled since the previous point.
	pub distance: Option<f64>,
	/// Speed derived from `distance` over elapsed time, m/s.
	pub derived_speed: Option<f64>,
	/// m/s², centered on the previous point.
	pub derived_acceleration: Option<f64>,
}

impl Point {
	/// Builds a point from `sample` given the two previously produced points.
	///
	/// `last` is the immediate predecessor and `next_last` the one before it.
	/// Elapsed time to either of them must be strictly positive.
	pub fn new(sample: Sample, last: Option<&Self>, next_last: Option<&Self>) -> Result<Self> {
		let Sample { timestamp, speed, course, position } = sample;

		let mut point =
			Self { timestamp, speed, course, position, distance: None, derived_speed: None, derived_acceleration: None };

		let Some(last) = last else {
			return Ok(point);
		};

		let distance = position.distance(&last.position);
		let elapsed = elapsed_secs(last.timestamp, timestamp)?;
		let derived_speed = distance / elapsed;

		point.distance = Some(distance);
		point.derived_speed = Some(derived_speed);

		if let Some(next_last) = next_last
			&& let Some(previous_speed) = last.derived_speed
		{
			let half_interval = 0.5 * elapsed_secs(next_last.timestamp, timestamp)?;
			point.derived_acceleration = Some((derived_speed - previous_speed) / half_interval);
		}

		Ok(point)
	}

	pub fn from_record<E: RecordExtractor + ?Sized>(
		extractor: &E,
		record: &str,
		last: Option<&Self>,
		next_last: Option<&Self>,
	) -> Result<Self> {
		Self::new(Sample::from_record(extractor, record)?, last, next_last)
	}

	#[must_use]
	pub const fn elevation(&self) -> f64 {
		self.position.elevation
	}

	/// Coarse compass heading, or `"stationary"` when no course was reported.
	#[must_use]
	pub fn compass(&self) -> &'static str {
		self.course.map_or("stationary", compass_label)
	}

	/// Single-line description including the position.
	#[must_use]
	pub fn describe(&self) -> String {
		format!("{self}  {}", self.position)
	}
}

fn elapsed_secs(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<f64> {
	let elapsed_secs = (to - from).num_milliseconds() as f64 / 1000.0;
	if elapsed_secs <= 0.0 {
		return Err(TrackError::NonIncreasingTime { previous: from, current: to, elapsed_secs });
	}
	Ok(elapsed_secs)
}

/// Maps a course onto a coarse compass label.
///
/// The circle is split into four 90° quadrants centered on N/E/S/W. The middle
/// third of a quadrant is the cardinal itself; both outer thirds are labelled
/// with the cardinal followed by the previous (counter-clockwise) one, e.g.
/// `NW`, `EN`. Boundaries belong to the sector above them.
#[must_use]
pub fn compass_label(course: f64) -> &'static str {
	let shifted = (course + 45.0).rem_euclid(360.0);
	let quadrant = ((shifted / 90.0) as usize).min(3);
	let within = shifted - quadrant as f64 * 90.0;

	if (30.0..60.0).contains(&within) { COMPASS[quadrant] } else { COMPASS_BLENDED[quadrant] }
}

impl fmt::Display for Point {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let time = self.timestamp.format("%Y-%m-%d %H:%M:%S");
		match self.speed {
			None => write!(f, "stopped at             {time}"),
			Some(speed) => {
				let mph = format!("{}", round2(speed * MPS_TO_MPH));
				write!(f, "moving {mph:<5} mph {:<2} at {time}", self.compass())
			},
		}
	}
}

pub(crate) fn round2(value: f64) -> f64 {
	(value * 100.0).round() / 100.0
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;
	use crate::extractor::GpxExtractor;
	use chrono::TimeZone;

	pub(crate) fn sample(secs: i64, lat: f64, lon: f64, ele: f64) -> Sample {
		Sample {
			timestamp: Utc.timestamp_opt(1_433_160_000 + secs, 0).unwrap(),
			speed: None,
			course: None,
			position: Coordinate::new(lat, lon, ele),
		}
	}

	fn approx(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-9
	}

	#[test]
	fn first_point_has_no_kinematics() {
		let p = Point::new(sample(0, 40.0, -75.0, 10.0), None, None).unwrap();
		assert!(p.distance.is_none());
		assert!(p.derived_speed.is_none());
		assert!(p.derived_acceleration.is_none());
	}

	#[test]
	fn second_point_derives_speed_only() {
		let a = Point::new(sample(0, 40.0, -75.0, 10.0), None, None).unwrap();
		let b_sample = sample(4, 40.0002, -75.0001, 11.0);
		let expected_dist = a.position.distance(&b_sample.position);

		let b = Point::new(b_sample, Some(&a), None).unwrap();

		assert!(approx(b.distance.unwrap(), expected_dist));
		assert!(approx(b.derived_speed.unwrap(), expected_dist / 4.0));
		assert!(b.derived_acceleration.is_none());
	}

	#[test]
	fn derived_speed_matches_straight_computation() {
		let a = Point::new(sample(0, 51.5, -0.12, 20.0), None, None).unwrap();
		let b = Point::new(sample(2, 51.5001, -0.1202, 21.0), Some(&a), None).unwrap();
		let c = Point::new(sample(5, 51.5003, -0.1203, 19.0), Some(&b), Some(&a)).unwrap();

		let straight = b.position.distance(&c.position) / 3.0;
		assert!(approx(c.derived_speed.unwrap(), straight));
	}

	#[test]
	fn acceleration_uses_half_interval_from_two_back() {
		let a = Point::new(sample(0, 40.0, -75.0, 10.0), None, None).unwrap();
		let b = Point::new(sample(2, 40.0001, -75.0, 10.0), Some(&a), None).unwrap();
		let c = Point::new(sample(6, 40.0003, -75.0, 10.0), Some(&b), Some(&a)).unwrap();

		let expected = (c.derived_speed.unwrap() - b.derived_speed.unwrap()) / (0.5 * 6.0);
		assert!(approx(c.derived_acceleration.unwrap(), expected));
	}

	#[test]
	fn acceleration_ignores_position_two_back() {
		let a = Point::new(sample(0, 40.0, -75.0, 10.0), None, None).unwrap();
		let b = Point::new(sample(3, 40.0002, -75.0, 10.0), Some(&a), None).unwrap();

		let mut moved_a = a.clone();
		moved_a.position = Coordinate::new(10.0, 10.0, 900.0);

		let c_sample = sample(7, 40.0005, -75.0001, 12.0);
		let c = Point::new(c_sample.clone(), Some(&b), Some(&a)).unwrap();
		let c_moved = Point::new(c_sample, Some(&b), Some(&moved_a)).unwrap();

		assert_eq!(c.derived_acceleration, c_moved.derived_acceleration);
	}

	#[test]
	fn rejects_non_increasing_time() {
		let a = Point::new(sample(10, 40.0, -75.0, 10.0), None, None).unwrap();

		let same = Point::new(sample(10, 40.0001, -75.0, 10.0), Some(&a), None);
		assert!(matches!(same, Err(TrackError::NonIncreasingTime { .. })));

		let earlier = Point::new(sample(5, 40.0001, -75.0, 10.0), Some(&a), None);
		assert!(matches!(earlier, Err(TrackError::NonIncreasingTime { .. })));
	}

	#[test]
	fn parses_record_fields() {
		let record = r#"<trkpt lat="40.5" lon="-75.25"><ele>12</ele><time>2015-06-01T12:00:00Z</time><speed>1.5</speed><course>270</course></trkpt>"#;
		let p = Point::from_record(&GpxExtractor, record, None, None).unwrap();

		assert_eq!(p.position, Coordinate::new(40.5, -75.25, 12.0));
		assert_eq!(p.speed, Some(1.5));
		assert_eq!(p.course, Some(270.0));
		assert_eq!(p.timestamp, Utc.with_ymd_and_hms(2015, 6, 1, 12, 0, 0).unwrap());
	}

	#[test]
	fn missing_required_field_fails() {
		let record = r#"<trkpt lat="40.5" lon="-75.25"><time>2015-06-01T12:00:00Z</time></trkpt>"#;
		let err = Point::from_record(&GpxExtractor, record, None, None).unwrap_err();
		assert!(matches!(err, TrackError::MissingField("ele")));
	}

	#[test]
	fn non_numeric_coordinate_fails() {
		let record = r#"<trkpt lat="north" lon="-75.25"><ele>1</ele><time>2015-06-01T12:00:00Z</time></trkpt>"#;
		let err = Point::from_record(&GpxExtractor, record, None, None).unwrap_err();
		assert!(matches!(err, TrackError::InvalidField { field: "lat", .. }));
	}

	#[test]
	fn compass_labels() {
		assert_eq!(compass_label(0.0), "N");
		assert_eq!(compass_label(30.0), "NW");
		assert_eq!(compass_label(60.0), "EN");
		assert_eq!(compass_label(90.0), "E");
		assert_eq!(compass_label(100.0), "E");
		assert_eq!(compass_label(120.0), "EN");
		assert_eq!(compass_label(150.0), "SE");
		assert_eq!(compass_label(180.0), "S");
		assert_eq!(compass_label(225.0), "WS");
		assert_eq!(compass_label(270.0), "W");
		assert_eq!(compass_label(340.0), "NW");
		assert_eq!(compass_label(-20.0), "NW");
		assert_eq!(compass_label(360.0), "N");
	}

	#[test]
	fn compass_boundaries_close_on_lower_edge() {
		// course 15 sits exactly at 60° into the north quadrant
		assert_eq!(compass_label(15.0), "NW");
		// course -15 sits exactly at 30° into the north quadrant
		assert_eq!(compass_label(-15.0), "N");
		// course 45 starts the east quadrant
		assert_eq!(compass_label(45.0), "EN");
	}

	#[test]
	fn stationary_without_course() {
		let p = Point::new(sample(0, 1.0, 1.0, 1.0), None, None).unwrap();
		assert_eq!(p.compass(), "stationary");
	}

	#[test]
	fn display_formats() {
		let mut s = sample(0, 40.5, -75.25, 12.0);
		let stopped = Point::new(s.clone(), None, None).unwrap();
		assert_eq!(stopped.to_string(), "stopped at             2015-06-01 12:00:00");

		s.speed = Some(10.0);
		s.course = Some(90.0);
		let moving = Point::new(s, None, None).unwrap();
		assert_eq!(moving.to_string(), "moving 22.37 mph E  at 2015-06-01 12:00:00");
		assert!(moving.describe().ends_with("(40.5,-75.25           el:12    )"));
	}
}
