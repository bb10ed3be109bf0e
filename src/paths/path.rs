//! Walking a distance field downhill.
//!
//! From any cell the next step toward the goal is the neighbour offering the biggest drop in
//! distance. Repeating that until no neighbour is lower produces a path:
//!
//! ```text
//!  ___________________
//! |    |    |    |    |
//! | G  | ←1 | ←2 | ←3 |
//! |____|____|____|____|
//! |    |    |    |    |
//! | ↑1 | ## | ## | ↑4 |
//! |____|____|____|____|
//! ```
//!
//! Callers can veto individual steps with an `is_blocked(nx, ny, x, y, distances)` predicate,
//! typically to route around other actors without rebuilding the field.
//!

use bevy::log::trace;

use crate::{error::DistanceFieldError, paths::dijkstra::ceiling, prelude::*};

/// The direction of the steepest descent from `(x, y)` not vetoed by `is_blocked`. Neighbours
/// are examined in [Ordinal] scan order and only a strictly bigger drop replaces the current
/// choice, so ties go to the first examined. [None] when no neighbour is lower
pub fn next_step(
	distances: &Grid<f32>,
	x: i32,
	y: i32,
	is_blocked: impl Fn(i32, i32, i32, i32, &Grid<f32>) -> bool,
	use_diagonals: bool,
) -> Option<Ordinal> {
	let here = *distances.get(x, y)?;
	let mut best = None;
	let mut best_drop = 0.0;
	for ordinal in Ordinal::directions(use_diagonals) {
		let (nx, ny) = ordinal.step_from(x, y);
		let Some(there) = distances.get(nx, ny) else {
			continue;
		};
		if *there < 0.0 {
			continue;
		}
		let descent = here - there;
		if descent > best_drop && !is_blocked(nx, ny, x, y, distances) {
			best = Some(*ordinal);
			best_drop = descent;
		}
	}
	best
}

/// The path from `(origin_x, origin_y)` down to a goal, excluding the origin itself. An origin
/// which is blocked or cannot reach a goal is first moved to [closest_valid_location], that cell
/// then leads the path. [None] when there is nowhere to go, which includes standing on a goal.
///
/// `max_distance` is the ceiling the field was built with, any distance at or above it cannot
/// reach a goal. A non-positive `max_distance` means [NO_PATH]
pub fn get_path(
	distances: &Grid<f32>,
	origin_x: i32,
	origin_y: i32,
	is_blocked: impl Fn(i32, i32, i32, i32, &Grid<f32>) -> bool,
	eight_ways: bool,
	max_distance: f32,
) -> Option<Vec<(i32, i32)>> {
	let mut path = Vec::new();
	let (mut x, mut y) = (origin_x, origin_y);
	let reachable = distances
		.get(x, y)
		.is_some_and(|d| is_reachable(*d, max_distance));
	if !reachable || is_blocked(x, y, x, y, distances) {
		let (cx, cy) = closest_valid_location(distances, x, y, &is_blocked, max_distance)?;
		trace!(
			"Path origin ({}, {}) relocated to ({}, {})",
			x,
			y,
			cx,
			cy
		);
		path.push((cx, cy));
		(x, y) = (cx, cy);
	}
	while let Some(ordinal) = next_step(distances, x, y, &is_blocked, eight_ways) {
		(x, y) = ordinal.step_from(x, y);
		path.push((x, y));
	}
	if path.is_empty() {
		None
	} else {
		Some(path)
	}
}

/// The unblocked cell nearest to `(x, y)`, by squared straight line distance, which can reach
/// a goal under the field's `max_distance`. Ties go to the cell with the lowest field distance
pub fn closest_valid_location(
	distances: &Grid<f32>,
	x: i32,
	y: i32,
	is_blocked: impl Fn(i32, i32, i32, i32, &Grid<f32>) -> bool,
	max_distance: f32,
) -> Option<(i32, i32)> {
	let mut best: Option<((i32, f32), (i32, i32))> = None;
	distances.for_each(|d, cx, cy| {
		if !is_reachable(*d, max_distance) || is_blocked(cx, cy, cx, cy, distances) {
			return;
		}
		let key = ((cx - x).pow(2) + (cy - y).pow(2), *d);
		let closer = best.is_none_or(|(best_key, _)| {
			key.0 < best_key.0 || (key.0 == best_key.0 && key.1 < best_key.1)
		});
		if closer {
			best = Some((key, (cx, cy)));
		}
	});
	best.map(|(_, cell)| cell)
}

/// Whether a field distance leads to a goal in a field built with `max_distance`
fn is_reachable(distance: f32, max_distance: f32) -> bool {
	(0.0..ceiling(max_distance)).contains(&distance)
}

/// Builds distance fields and paths from pooled scratch grids
#[derive(Debug, Default)]
pub struct Pathfinder {
	/// Context reused by every field
	dijkstra: DijkstraMap,
	/// Scratch cost grids
	costs: GridPool<i32>,
	/// Scratch distance grids
	distances: GridPool<f32>,
}

impl Pathfinder {
	/// Create a new instance of [Pathfinder]
	pub fn new() -> Self {
		Pathfinder::default()
	}
	/// Build a `width x height` distance field toward `goal` with costs from `cost_fn(x, y)`.
	/// The field is drawn from the pool, hand it back with [Pathfinder::recycle] once done
	pub fn distances_to(
		&mut self,
		width: usize,
		height: usize,
		goal: (i32, i32),
		cost_fn: impl FnMut(i32, i32) -> i32,
		eight_ways: bool,
	) -> Result<Grid<f32>, DistanceFieldError> {
		let mut costs = self.costs.alloc(width, height, PASSABLE);
		costs.fill_with(cost_fn);
		let mut distances = self.distances.alloc(width, height, NO_PATH);
		let result = self.dijkstra.calculate_distances(
			&mut distances,
			goal.0,
			goal.1,
			&costs,
			eight_ways,
			NO_PATH,
		);
		self.costs.free(costs);
		match result {
			Ok(()) => Ok(distances),
			Err(e) => {
				self.distances.free(distances);
				Err(e)
			}
		}
	}
	/// Return a field from [Pathfinder::distances_to] to the pool
	pub fn recycle(&mut self, distances: Grid<f32>) {
		self.distances.free(distances);
	}
	/// Query a path against a field from [Pathfinder::distances_to], see [get_path]
	pub fn get_path_from_field(
		&self,
		distances: &Grid<f32>,
		from: (i32, i32),
		is_blocked: impl Fn(i32, i32, i32, i32, &Grid<f32>) -> bool,
		eight_ways: bool,
	) -> Option<Vec<(i32, i32)>> {
		get_path(distances, from.0, from.1, is_blocked, eight_ways, NO_PATH)
	}
	/// Find the path from `from` to `to` over a `width x height` map costed by `cost_fn(x, y)`.
	/// The scratch grids are returned to the pools before returning
	#[allow(clippy::too_many_arguments)]
	pub fn get_path_between(
		&mut self,
		width: usize,
		height: usize,
		from: (i32, i32),
		to: (i32, i32),
		cost_fn: impl FnMut(i32, i32) -> i32,
		is_blocked: impl Fn(i32, i32, i32, i32, &Grid<f32>) -> bool,
		eight_ways: bool,
	) -> Result<Option<Vec<(i32, i32)>>, DistanceFieldError> {
		let distances = self.distances_to(width, height, to, cost_fn, eight_ways)?;
		let path = get_path(&distances, from.0, from.1, is_blocked, eight_ways, NO_PATH);
		self.recycle(distances);
		Ok(path)
	}
}

/// One-off [Pathfinder::get_path_between] with throwaway scratch grids
pub fn get_path_between(
	width: usize,
	height: usize,
	from: (i32, i32),
	to: (i32, i32),
	cost_fn: impl FnMut(i32, i32) -> i32,
	is_blocked: impl Fn(i32, i32, i32, i32, &Grid<f32>) -> bool,
	eight_ways: bool,
) -> Result<Option<Vec<(i32, i32)>>, DistanceFieldError> {
	Pathfinder::new().get_path_between(width, height, from, to, cost_fn, is_blocked, eight_ways)
}
