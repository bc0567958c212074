use std::{
	fmt, fs,
	iter::FusedIterator,
	path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::{
	error::{Result, TrackError},
	extractor::{GpxExtractor, RecordExtractor},
	point::Point,
};

const TRACK_EXTENSION: &str = "gpx";

/// Lazily walks a directory of track files and yields points in order.
///
/// Files are visited by the number in their file stem (`2.gpx` before `10.gpx`).
/// Records are pulled one at a time and every point is built against the two
/// points produced before it, across file boundaries. The first error ends the
/// stream.
pub struct Archive<E = GpxExtractor> {
	dir: PathBuf,
	extractor: E,
	files: Vec<PathBuf>,
	next_file: usize,
	records: std::vec::IntoIter<String>,
	last: Option<Point>,
	next_last: Option<Point>,
	finished: bool,
}

impl Archive {
	pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
		Self::with_extractor(dir, GpxExtractor)
	}
}

impl<E: RecordExtractor> Archive<E> {
	pub fn with_extractor(dir: impl Into<PathBuf>, extractor: E) -> Result<Self> {
		let dir = dir.into();
		let files = ordered_track_files(&dir)?;
		info!(dir = %dir.display(), files = files.len(), "Opened track archive");

		Ok(Self {
			dir,
			extractor,
			files,
			next_file: 0,
			records: Vec::new().into_iter(),
			last: None,
			next_last: None,
			finished: false,
		})
	}

	fn load_records(&self, path: &Path) -> Result<Vec<String>> {
		let text =
			fs::read_to_string(path).map_err(|source| TrackError::UnreadableFile { path: path.to_path_buf(), source })?;

		let records: Vec<String> = self.extractor.records(&text).into_iter().map(str::to_string).collect();
		info!(file = %path.display(), records = records.len(), "Loaded track file");

		Ok(records)
	}

	fn next_record(&mut self) -> Option<Result<String>> {
		loop {
			if let Some(record) = self.records.next() {
				return Some(Ok(record));
			}

			let path = self.files.get(self.next_file)?.clone();
			self.next_file += 1;

			match self.load_records(&path) {
				Ok(records) => self.records = records.into_iter(),
				Err(e) => return Some(Err(e)),
			}
		}
	}
}

impl<E: RecordExtractor> Iterator for Archive<E> {
	type Item = Result<Point>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.finished {
			return None;
		}

		let record = match self.next_record() {
			Some(Ok(record)) => record,
			Some(Err(e)) => {
				self.finished = true;
				return Some(Err(e));
			},
			None => {
				debug!(dir = %self.dir.display(), "Track archive exhausted");
				self.finished = true;
				return None;
			},
		};

		match Point::from_record(&self.extractor, &record, self.last.as_ref(), self.next_last.as_ref()) {
			Ok(point) => {
				self.next_last = self.last.replace(point.clone());
				Some(Ok(point))
			},
			Err(e) => {
				self.finished = true;
				Some(Err(e))
			},
		}
	}
}

impl<E: RecordExtractor> FusedIterator for Archive<E> {}

impl<E> fmt::Display for Archive<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "gpx archive with {} files", self.files.len())
	}
}

/// Lists `*.gpx` files in `dir`, sorted by the number in their stem.
pub fn ordered_track_files(dir: &Path) -> Result<Vec<PathBuf>> {
	let unreadable = |source| TrackError::UnreadableDirectory { path: dir.to_path_buf(), source };

	let mut numbered = Vec::new();
	for entry in fs::read_dir(dir).map_err(unreadable)? {
		let path = entry.map_err(unreadable)?.path();
		if path.extension().and_then(|ext| ext.to_str()) != Some(TRACK_EXTENSION) || !path.is_file() {
			continue;
		}

		let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
		let number = stem.parse::<f64>().ok().filter(|n| n.is_finite()).ok_or_else(|| {
			TrackError::InvalidFileName(path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default())
		})?;

		numbered.push((number, path));
	}

	if numbered.is_empty() {
		return Err(TrackError::EmptyArchive(dir.to_path_buf()));
	}

	numbered.sort_by(|a, b| a.0.total_cmp(&b.0));
	Ok(numbered.into_iter().map(|(_, path)| path).collect())
}
