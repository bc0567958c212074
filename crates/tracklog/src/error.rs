use std::path::PathBuf;

use chrono::{DateTime, Utc};

pub type Result<T> = std::result::Result<T, TrackError>;

#[derive(Debug, thiserror::Error)]
pub enum TrackError {
	#[error("failed to read archive directory {}: {source}", path.display())]
	UnreadableDirectory { path: PathBuf, source: std::io::Error },
	#[error("no .gpx files found in archive directory {}", .0.display())]
	EmptyArchive(PathBuf),
	#[error("track file name is not numeric: {0}")]
	InvalidFileName(String),
	#[error("failed to read track file {}: {source}", path.display())]
	UnreadableFile { path: PathBuf, source: std::io::Error },

	#[error("record is missing required field `{0}`")]
	MissingField(&'static str),
	#[error("record field `{field}` has invalid value {value:?}: {reason}")]
	InvalidField { field: &'static str, value: String, reason: String },

	#[error("non-positive elapsed time ({elapsed_secs}s) between {previous} and {current}")]
	NonIncreasingTime { previous: DateTime<Utc>, current: DateTime<Utc>, elapsed_secs: f64 },

	#[error("failed to access point cache {}: {source}", path.display())]
	CacheIo { path: PathBuf, source: std::io::Error },
	#[error("point cache {} is corrupt: {source}", path.display())]
	CacheFormat { path: PathBuf, source: serde_json::Error },

	#[error("failed to write report: {0}")]
	Report(#[source] std::io::Error),
}

impl TrackError {
	/// Fatal setup problems, as opposed to failures inside the point stream.
	#[must_use]
	pub const fn is_configuration(&self) -> bool {
		matches!(
			self,
			Self::UnreadableDirectory { .. } | Self::EmptyArchive(_) | Self::InvalidFileName(_) | Self::UnreadableFile { .. }
		)
	}
}
