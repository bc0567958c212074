use std::fmt;

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the distance approximation, in meters.
pub const EARTH_RADIUS_M: f64 = 6_367_000.0;

/// A geodesic position: degrees for latitude/longitude, meters for elevation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
	pub latitude: f64,
	pub longitude: f64,
	pub elevation: f64,
}

impl Coordinate {
	#[must_use]
	pub const fn new(latitude: f64, longitude: f64, elevation: f64) -> Self {
		Self { latitude, longitude, elevation }
	}

	/// Straight-line distance in meters, elevation included as a third axis.
	///
	/// Uses an equirectangular projection with the longitude scale taken at the
	/// midpoint latitude. Accurate for the tens of meters between consecutive
	/// track samples; it degrades over long separations and does not handle
	/// crossing the antimeridian.
	#[must_use]
	pub fn distance(&self, other: &Self) -> f64 {
		let d_lon = other.longitude - self.longitude;
		let d_lat = other.latitude - self.latitude;
		let d_ele = other.elevation - self.elevation;

		let lat_mid = d_lat.mul_add(0.5, self.latitude);

		let dx = EARTH_RADIUS_M * d_lon.to_radians() * lat_mid.to_radians().cos();
		let dy = EARTH_RADIUS_M * d_lat.to_radians();

		d_ele.mul_add(d_ele, dx.mul_add(dx, dy * dy)).sqrt()
	}
}

impl fmt::Display for Coordinate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let lat_lon = format!("{},{}", self.latitude, self.longitude);
		let elevation = self.elevation.to_string();
		write!(f, "({lat_lon:<21} el:{elevation:<6})")
	}
}
