//! Errors surfaced by the distance field engine and grid loading
//!

use thiserror::Error;

/// Failures when building or refreshing a [crate::prelude::DijkstraMap]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DistanceFieldError {
	/// `rescan` was asked to refresh a frontier that was never built
	#[error("distances must be calculated before they can be rescanned")]
	NotScanned,
	/// The distance and cost grids disagree on their dimensions
	#[error("distance grid is {distance_width}x{distance_height} but cost grid is {cost_width}x{cost_height}")]
	SizeMismatch {
		/// Columns in the distance grid
		distance_width: usize,
		/// Rows in the distance grid
		distance_height: usize,
		/// Columns in the cost grid
		cost_width: usize,
		/// Rows in the cost grid
		cost_height: usize,
	},
	/// A grid with no cells cannot hold a field
	#[error("cannot build a distance field over an empty grid")]
	EmptyGrid,
}

/// Failures when reading a [crate::prelude::Grid] from disk
#[derive(Error, Debug)]
pub enum GridLoadError {
	/// The file could not be opened
	#[error("failed opening grid file: {0}")]
	Io(#[from] std::io::Error),
	/// The `ron` document did not describe a grid
	#[cfg(feature = "ron")]
	#[error("failed deserializing grid: {0}")]
	Ron(#[from] ron::error::SpannedError),
	/// The CSV document could not be read
	#[cfg(feature = "csv")]
	#[error("failed reading csv grid: {0}")]
	Csv(#[from] csv::Error),
	/// A CSV field was not an integer cost
	#[error("row {row}, column {column}: `{value}` is not a valid cost")]
	InvalidValue {
		/// Row of the offending value
		row: usize,
		/// Column of the offending value
		column: usize,
		/// The raw text
		value: String,
	},
	/// The declared dimensions do not match the number of stored cells
	#[error("grid declares {width}x{height} but holds {cells} cells")]
	BadShape {
		/// Declared columns
		width: usize,
		/// Declared rows
		height: usize,
		/// Cells actually present
		cells: usize,
	},
	/// Rows of a CSV grid had different lengths
	#[error("row {row} has {found} columns, expected {expected}")]
	RaggedRow {
		/// Row that broke the shape
		row: usize,
		/// Column count of the first row
		expected: usize,
		/// Column count of the offending row
		found: usize,
	},
}
