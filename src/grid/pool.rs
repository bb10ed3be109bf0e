//! Grids tend to be needed once per turn/frame for scratch work (temporary cost and distance
//! grids when finding a path for instance). Rather than allocating afresh each time a
//! [GridPool] hands out previously freed grids.
//!
//! Freeing a grid moves it into the pool, its contents are unspecified until it is handed out
//! again by [GridPool::alloc] which always refills it.
//!

use bevy::log::trace;

use super::Grid;

/// A free-list of [Grid]s available for reuse
#[derive(Debug)]
pub struct GridPool<T> {
	/// Grids which have been freed and can be handed out again
	free: Vec<Grid<T>>,
}

impl<T> Default for GridPool<T> {
	fn default() -> Self {
		GridPool { free: Vec::new() }
	}
}

impl<T: Clone> GridPool<T> {
	/// Create a new, empty, instance of [GridPool]
	pub fn new() -> Self {
		GridPool::default()
	}
	/// Hand out a `width x height` grid with every cell set to `value`. A freed grid of the same
	/// dimensions is preferred, otherwise any freed grid is reshaped, otherwise a new one is made
	pub fn alloc(&mut self, width: usize, height: usize, value: T) -> Grid<T> {
		if let Some(i) = self
			.free
			.iter()
			.position(|g| g.get_size() == (width, height))
		{
			let mut grid = self.free.swap_remove(i);
			grid.fill(value);
			return grid;
		}
		match self.free.pop() {
			Some(mut grid) => {
				trace!(
					"Reshaping pooled grid {:?} to ({}, {})",
					grid.get_size(),
					width,
					height
				);
				grid.resize(width, height, value);
				grid
			}
			None => Grid::new(width, height, value),
		}
	}
	/// Return a grid to the pool
	pub fn free(&mut self, grid: Grid<T>) {
		self.free.push(grid);
	}
	/// Number of grids waiting to be reused
	pub fn len(&self) -> usize {
		self.free.len()
	}
	/// Whether there are no grids waiting to be reused
	pub fn is_empty(&self) -> bool {
		self.free.is_empty()
	}
}
