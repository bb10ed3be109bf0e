//! A [Grid] is a fixed size `width x height` 2D container addressed by `(x, y)` where `(0, 0)`
//! is the top-left cell, `x` grows to the east and `y` grows to the south.
//!
//! Coordinates are signed so that callers can freely look around the edges of a map. Reading
//! outside of the grid yields `None` (or a caller supplied default) and writing outside of the
//! grid does nothing, walking off the edge of a map is a normal occurrence for field-of-view and
//! path calculations rather than an error.
//!
//! ```text
//!   x →
//! y  ___________________
//! ↓ |0,0|1,0|2,0|3,0|4,0|
//!   |0,1|1,1|2,1|3,1|4,1|
//!   |0,2|1,2|2,2|3,2|4,2|
//!   |___|___|___|___|___|
//! ```
//!
//! Grids are expected to be reused frame to frame, see [pool::GridPool].
//!

pub mod pool;
pub mod utilities;

#[cfg(any(feature = "ron", feature = "csv"))]
use crate::error::GridLoadError;

/// Fixed size 2D container stored row by row in a flat array
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
	/// Number of columns
	width: usize,
	/// Number of rows
	height: usize,
	/// Cell values, index is `x + y * width`
	cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
	/// Create a new instance of [Grid] with every cell set to `value`
	pub fn new(width: usize, height: usize, value: T) -> Self {
		Grid {
			width,
			height,
			cells: vec![value; width * height],
		}
	}
	/// Create a new instance of [Grid] where each cell is produced by `f(x, y)`
	pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(i32, i32) -> T) -> Self {
		let mut cells = Vec::with_capacity(width * height);
		for y in 0..height {
			for x in 0..width {
				cells.push(f(x as i32, y as i32));
			}
		}
		Grid {
			width,
			height,
			cells,
		}
	}
	/// Set every cell to `value`
	pub fn fill(&mut self, value: T) {
		self.cells.fill(value);
	}
	/// Reshape the grid to `width x height` with every cell set to `value`. The backing storage
	/// is kept, a grid only allocates when it needs to grow beyond its previous capacity
	pub fn resize(&mut self, width: usize, height: usize, value: T) {
		self.width = width;
		self.height = height;
		self.cells.clear();
		self.cells.resize(width * height, value);
	}
	/// Get a copy of a cell or `default` when `(x, y)` lies outside of the grid
	pub fn get_or(&self, x: i32, y: i32, default: T) -> T {
		self.get(x, y).cloned().unwrap_or(default)
	}
}

impl<T> Grid<T> {
	/// Number of columns
	pub fn get_width(&self) -> usize {
		self.width
	}
	/// Number of rows
	pub fn get_height(&self) -> usize {
		self.height
	}
	/// Get the `(width, height)` tuple
	pub fn get_size(&self) -> (usize, usize) {
		(self.width, self.height)
	}
	/// Get a reference to the flat cell array, stored row by row
	pub fn get_cells(&self) -> &[T] {
		&self.cells
	}
	/// Whether `(x, y)` lies inside the grid
	pub fn has_xy(&self, x: i32, y: i32) -> bool {
		x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
	}
	/// Whether `(x, y)` lies on the outermost ring of cells
	pub fn is_boundary_xy(&self, x: i32, y: i32) -> bool {
		self.has_xy(x, y)
			&& (x == 0 || y == 0 || x as usize == self.width - 1 || y as usize == self.height - 1)
	}
	/// Flat array index of `(x, y)`, [None] if outside of the grid
	fn index(&self, x: i32, y: i32) -> Option<usize> {
		if self.has_xy(x, y) {
			Some(x as usize + y as usize * self.width)
		} else {
			None
		}
	}
	/// Get a reference to a cell, [None] if `(x, y)` lies outside of the grid
	pub fn get(&self, x: i32, y: i32) -> Option<&T> {
		self.index(x, y).map(|i| &self.cells[i])
	}
	/// Get a mutable reference to a cell, [None] if `(x, y)` lies outside of the grid
	pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut T> {
		self.index(x, y).map(|i| &mut self.cells[i])
	}
	/// Set a cell to a value. Writing outside of the grid is a no-op and returns `false`
	pub fn set(&mut self, x: i32, y: i32, value: T) -> bool {
		match self.index(x, y) {
			Some(i) => {
				self.cells[i] = value;
				true
			}
			None => false,
		}
	}
	/// Replace each cell with the result of `f(x, y)`
	pub fn fill_with(&mut self, mut f: impl FnMut(i32, i32) -> T) {
		let width = self.width;
		for (i, cell) in self.cells.iter_mut().enumerate() {
			*cell = f((i % width) as i32, (i / width) as i32);
		}
	}
	/// Replace each cell with the result of `f(current, x, y)`
	pub fn update(&mut self, mut f: impl FnMut(&T, i32, i32) -> T) {
		let width = self.width;
		for (i, cell) in self.cells.iter_mut().enumerate() {
			*cell = f(cell, (i % width) as i32, (i / width) as i32);
		}
	}
	/// Visit each cell with its coordinates
	pub fn for_each(&self, mut f: impl FnMut(&T, i32, i32)) {
		for (i, cell) in self.cells.iter().enumerate() {
			f(cell, (i % self.width) as i32, (i / self.width) as i32);
		}
	}
	/// Visit each cell mutably with its coordinates
	pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut T, i32, i32)) {
		let width = self.width;
		for (i, cell) in self.cells.iter_mut().enumerate() {
			f(cell, (i % width) as i32, (i / width) as i32);
		}
	}
	/// Whether the declared dimensions agree with the stored cells, a deserialized grid may not
	#[cfg(any(feature = "ron", feature = "csv"))]
	fn validate_shape(self) -> Result<Self, GridLoadError> {
		if self.cells.len() != self.width * self.height {
			return Err(GridLoadError::BadShape {
				width: self.width,
				height: self.height,
				cells: self.cells.len(),
			});
		}
		Ok(self)
	}
}

#[cfg(feature = "ron")]
impl<T: serde::de::DeserializeOwned> Grid<T> {
	/// From a `ron` file generate the [Grid]
	pub fn from_ron(path: &str) -> Result<Self, GridLoadError> {
		let file = std::fs::File::open(path)?;
		let grid: Grid<T> = ron::de::from_reader(file)?;
		bevy::log::debug!("Loaded {}x{} grid from {}", grid.width, grid.height, path);
		grid.validate_shape()
	}
}

#[cfg(feature = "csv")]
impl Grid<i32> {
	/// From a headerless CSV file generate a cost [Grid], each record is a row of the map
	pub fn from_csv(path: &str) -> Result<Self, GridLoadError> {
		let data = std::fs::File::open(path)?;
		let mut rdr = csv::ReaderBuilder::new()
			.has_headers(false)
			.from_reader(data);
		let mut cells = Vec::new();
		let mut width = 0;
		let mut height = 0;
		for (row, record) in rdr.records().enumerate() {
			let record = record?;
			if row == 0 {
				width = record.len();
			} else if record.len() != width {
				return Err(GridLoadError::RaggedRow {
					row,
					expected: width,
					found: record.len(),
				});
			}
			for (column, value) in record.iter().enumerate() {
				let cost = value
					.trim()
					.parse::<i32>()
					.map_err(|_| GridLoadError::InvalidValue {
						row,
						column,
						value: value.to_string(),
					})?;
				cells.push(cost);
			}
			height += 1;
		}
		bevy::log::debug!("Loaded {}x{} cost grid from {}", width, height, path);
		Grid {
			width,
			height,
			cells,
		}
		.validate_shape()
	}
}
