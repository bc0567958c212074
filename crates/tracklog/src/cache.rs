use std::{
	fs,
	path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::{
	archive::Archive,
	error::{Result, TrackError},
	point::Point,
};

/// JSON snapshot of a fully parsed archive.
pub struct PointCache;

impl PointCache {
	pub fn load(path: &Path) -> Result<Vec<Point>> {
		let content =
			fs::read_to_string(path).map_err(|source| TrackError::CacheIo { path: path.to_path_buf(), source })?;

		let points: Vec<Point> = serde_json::from_str(&content)
			.map_err(|source| TrackError::CacheFormat { path: path.to_path_buf(), source })?;

		info!(path = %path.display(), points = points.len(), "Rehydrated points from cache");
		Ok(points)
	}

	pub fn store(path: &Path, points: &[Point]) -> Result<()> {
		let io_err = |source| TrackError::CacheIo { path: path.to_path_buf(), source };

		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(io_err)?;
		}

		let content =
			serde_json::to_string(points).map_err(|source| TrackError::CacheFormat { path: path.to_path_buf(), source })?;
		fs::write(path, content).map_err(io_err)?;

		info!(path = %path.display(), points = points.len(), "Stored points in cache");
		Ok(())
	}
}

/// Where the analyzer's points come from.
#[derive(Debug, Clone)]
pub enum SourceMode {
	/// Parse the archive directory on every run.
	Live { dir: PathBuf },
	/// Replay a cached snapshot, creating it from `dir` when it does not exist yet.
	Cached { dir: PathBuf, cache_path: PathBuf },
}

/// A point stream, either parsed lazily or replayed from a snapshot.
pub enum TrackSource {
	Live(Archive),
	Cached(std::vec::IntoIter<Point>),
}

impl TrackSource {
	pub fn live(dir: impl Into<PathBuf>) -> Result<Self> {
		Ok(Self::Live(Archive::open(dir)?))
	}

	pub fn rehydrate(cache_path: &Path) -> Result<Self> {
		Ok(Self::Cached(PointCache::load(cache_path)?.into_iter()))
	}

	/// Parses the whole archive, stores it at `cache_path` and replays it.
	pub fn parse_and_store(dir: impl Into<PathBuf>, cache_path: &Path) -> Result<Self> {
		let points = Archive::open(dir)?.collect::<Result<Vec<_>>>()?;
		PointCache::store(cache_path, &points)?;
		Ok(Self::Cached(points.into_iter()))
	}

	pub fn from_mode(mode: &SourceMode) -> Result<Self> {
		match mode {
			SourceMode::Live { dir } => Self::live(dir),
			SourceMode::Cached { dir, cache_path } => {
				if cache_path.is_file() {
					debug!(path = %cache_path.display(), "Point cache hit");
					Self::rehydrate(cache_path)
				} else {
					debug!(path = %cache_path.display(), "Point cache miss");
					Self::parse_and_store(dir, cache_path)
				}
			},
		}
	}
}

impl Iterator for TrackSource {
	type Item = Result<Point>;

	fn next(&mut self) -> Option<Self::Item> {
		match self {
			Self::Live(archive) => archive.next(),
			Self::Cached(points) => points.next().map(Ok),
		}
	}
}
