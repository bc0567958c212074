//! Trip statistics over a directory of GPS track logs.
//!
//! Track files are read lazily into a stream of [`Point`]s carrying derived
//! distance, speed and acceleration, and the stream is fanned out once to a
//! fixed set of [`Aggregator`]s that print summaries at the end of the run.

pub mod aggregators;
mod analyzer;
mod archive;
mod cache;
mod coordinate;
mod error;
mod extractor;
mod point;

pub use aggregators::{Aggregator, Field, PassthroughPrinter, ReportOptions, SpeedHistogram, TopAttributes};
pub use analyzer::{Analyzer, AnalyzerOptions, RunSummary};
pub use archive::{Archive, ordered_track_files};
pub use cache::{PointCache, SourceMode, TrackSource};
pub use coordinate::{Coordinate, EARTH_RADIUS_M};
pub use error::{Result, TrackError};
pub use extractor::{GpxExtractor, RecordExtractor};
pub use point::{MPS_TO_MPH, Point, Sample, compass_label};
