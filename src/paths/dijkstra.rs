//! A [DijkstraMap] turns a cost [Grid] into a distance [Grid]: every cell is given the cheapest
//! cost of travelling from it to the nearest goal.
//!
//! Costs are read per cell, stepping onto a cell costs its value. Negative costs are
//! impassable, [OBSTRUCTION] additionally stops diagonal steps squeezing past its corners:
//!
//! ```text
//!  _____________      _____________
//! |  G  |  #  |      |  G  |  x  |
//! |_____|_____|      |_____|_____|
//! |     |  ↖  |      |     |  ↖  |
//! |_____|_____|      |_____|_____|
//!  # = OBSTRUCTION    x = FORBIDDEN
//!  diagonal illegal   diagonal allowed
//! ```
//!
//! The frontier of cells waiting to be relaxed is a single doubly linked chain kept sorted by
//! distance, stored as an arena of `CostLink`s with a sentinel head in slot `0`. The head of the
//! chain is relaxed first and any neighbour whose distance improves is moved to its new place by
//! walking rightwards from the relaxing cell, improved neighbours tend to land close to it.
//!
//! The arena is laid out over the grid padded with a ring of [OBSTRUCTION] cells so the field
//! never propagates past the edges:
//!
//! ```text
//!  # # # # # #
//!  # . . . . #
//!  # . . . . #     4x3 grid, 6x5 arena frame (+1 sentinel slot)
//!  # . . . . #
//!  # # # # # #
//! ```
//!
//! A [DijkstraMap] is a reusable context, the arena grows to fit the largest grid it has seen
//! and is kept for later, smaller, grids.
//!

use bevy::log::{debug, error, trace, warn};

use crate::{error::DistanceFieldError, prelude::*};

/// Distance marking a cell that cannot reach any goal, also the default ceiling of a field
pub const NO_PATH: f32 = 30000.0;
/// Cost of an impassable cell
pub const FORBIDDEN: i32 = -1;
/// Cost of an impassable cell that also blocks diagonal steps around its corners
pub const OBSTRUCTION: i32 = -2;
/// Cost of a cell that can be crossed but is best avoided
pub const AVOIDED: i32 = 10;
/// Cost of an ordinary cell
pub const PASSABLE: i32 = 1;

/// A node of the arena, one per cell of the padded frame
#[derive(Debug, Clone, Copy)]
struct CostLink {
	/// Best known distance to a goal
	distance: f32,
	/// Cost of stepping onto the cell
	cost: i32,
	/// Slot of this node within the arena
	index: usize,
	/// Previous node in the frontier, [None] when not queued
	left: Option<usize>,
	/// Next node in the frontier
	right: Option<usize>,
}

impl Default for CostLink {
	fn default() -> Self {
		CostLink {
			distance: NO_PATH,
			cost: OBSTRUCTION,
			index: 0,
			left: None,
			right: None,
		}
	}
}

impl CostLink {
	/// Whether the node is queued in the frontier. The head has no left link so it never is
	fn is_queued(&self) -> bool {
		self.left.is_some()
	}
}

/// Reusable context for building distance fields
#[derive(Debug, Default)]
pub struct DijkstraMap {
	/// Columns of the padded frame
	width: usize,
	/// Rows of the padded frame
	height: usize,
	/// Sentinel head in slot `0` followed by the padded frame row by row
	links: Vec<CostLink>,
	/// Whether a field has been built, required before a rescan
	scanned: bool,
}

impl DijkstraMap {
	/// Create a new instance of [DijkstraMap] with an empty arena
	pub fn new() -> Self {
		DijkstraMap::default()
	}
	/// Whether a field has been built so that [DijkstraMap::rescan] can be used
	pub fn is_scanned(&self) -> bool {
		self.scanned
	}
	/// Number of nodes the arena holds, including the sentinel head
	pub fn get_capacity(&self) -> usize {
		self.links.len()
	}
	/// Build `distances` toward the single goal `(goal_x, goal_y)`. Cells unable to reach the
	/// goal are set to `max_distance`, a non-positive `max_distance` means [NO_PATH]
	pub fn calculate_distances(
		&mut self,
		distances: &mut Grid<f32>,
		goal_x: i32,
		goal_y: i32,
		costs: &Grid<i32>,
		eight_ways: bool,
		max_distance: f32,
	) -> Result<(), DistanceFieldError> {
		self.calculate_distances_to_goals(
			distances,
			&[(goal_x, goal_y)],
			costs,
			eight_ways,
			max_distance,
		)
	}
	/// Build `distances` toward the nearest of several goals. Goals outside of the grid are
	/// ignored
	pub fn calculate_distances_to_goals(
		&mut self,
		distances: &mut Grid<f32>,
		goals: &[(i32, i32)],
		costs: &Grid<i32>,
		eight_ways: bool,
		max_distance: f32,
	) -> Result<(), DistanceFieldError> {
		let max_distance = ceiling(max_distance);
		self.prepare(distances, costs)?;
		self.load(costs, |_, _| max_distance);
		let mut queued = Vec::with_capacity(goals.len());
		for (x, y) in goals.iter() {
			if !costs.has_xy(*x, *y) {
				warn!("Ignoring goal ({}, {}) outside of the grid", x, y);
				continue;
			}
			let i = self.slot(*x, *y);
			self.links[i].distance = 0.0;
			queued.push(i);
		}
		trace!(
			"Building {:?} distance field toward {} goals",
			costs.get_size(),
			queued.len()
		);
		self.queue_sorted(queued);
		self.relax_all(eight_ways);
		self.store(distances, max_distance);
		self.scanned = true;
		Ok(())
	}
	/// Rebuild `distances` from its current contents with a fresh cost grid. Any cell already
	/// holding a distance below `max_distance` seeds the frontier, so goals can be added by
	/// writing `0.0` into the grid. Distances can only shrink, raising costs does not lengthen
	/// an existing field. Impassable cells that are not goals lose their distance
	pub fn rescan(
		&mut self,
		distances: &mut Grid<f32>,
		costs: &Grid<i32>,
		eight_ways: bool,
		max_distance: f32,
	) -> Result<(), DistanceFieldError> {
		if !self.scanned {
			error!("A distance field must be calculated before it can be rescanned");
			return Err(DistanceFieldError::NotScanned);
		}
		let max_distance = ceiling(max_distance);
		self.prepare(distances, costs)?;
		self.load(costs, |x, y| {
			let distance = distances.get_or(x, y, max_distance);
			let cost = costs.get_or(x, y, OBSTRUCTION);
			if distance >= max_distance || (cost < 0 && distance > 0.0) {
				max_distance
			} else {
				distance
			}
		});
		let queued: Vec<usize> = (1..=self.width * self.height)
			.filter(|i| self.links[*i].distance < max_distance)
			.collect();
		debug!("Rescanning distance field from {} cells", queued.len());
		self.queue_sorted(queued);
		self.relax_all(eight_ways);
		self.store(distances, max_distance);
		Ok(())
	}
	/// Validate the grids and size the arena to fit them
	fn prepare(
		&mut self,
		distances: &Grid<f32>,
		costs: &Grid<i32>,
	) -> Result<(), DistanceFieldError> {
		if distances.get_size() != costs.get_size() {
			error!(
				"Distance grid {:?} does not match cost grid {:?}",
				distances.get_size(),
				costs.get_size()
			);
			return Err(DistanceFieldError::SizeMismatch {
				distance_width: distances.get_width(),
				distance_height: distances.get_height(),
				cost_width: costs.get_width(),
				cost_height: costs.get_height(),
			});
		}
		if costs.get_width() == 0 || costs.get_height() == 0 {
			error!("Cannot build a distance field over an empty grid");
			return Err(DistanceFieldError::EmptyGrid);
		}
		self.width = costs.get_width() + 2;
		self.height = costs.get_height() + 2;
		let required = self.width * self.height + 1;
		if required > self.links.len() {
			debug!(
				"Growing distance arena from {} to {} nodes",
				self.links.len(),
				required
			);
			self.links.resize(required, CostLink::default());
		}
		Ok(())
	}
	/// Reset every node of the frame from the cost grid, the padding ring is forced to
	/// [OBSTRUCTION]. `distance(x, y)` supplies the starting distance of grid cells
	fn load(&mut self, costs: &Grid<i32>, mut distance: impl FnMut(i32, i32) -> f32) {
		self.links[0] = CostLink::default();
		for py in 0..self.height {
			for px in 0..self.width {
				let index = 1 + px + py * self.width;
				let (x, y) = (px as i32 - 1, py as i32 - 1);
				let border = px == 0 || py == 0 || px == self.width - 1 || py == self.height - 1;
				self.links[index] = if border {
					CostLink {
						index,
						..Default::default()
					}
				} else {
					CostLink {
						distance: distance(x, y),
						cost: costs.get_or(x, y, OBSTRUCTION),
						index,
						left: None,
						right: None,
					}
				};
			}
		}
	}
	/// Arena slot of grid cell `(x, y)`
	fn slot(&self, x: i32, y: i32) -> usize {
		1 + (x + 1) as usize + (y + 1) as usize * self.width
	}
	/// Chain `queued` behind the head in ascending distance order
	fn queue_sorted(&mut self, mut queued: Vec<usize>) {
		queued.sort_by(|a, b| self.links[*a].distance.total_cmp(&self.links[*b].distance));
		let mut previous = 0;
		for i in queued {
			self.links[previous].right = Some(i);
			self.links[i].left = Some(previous);
			previous = i;
		}
		self.links[previous].right = None;
	}
	/// Remove a node from the frontier
	fn unlink(&mut self, i: usize) {
		let CostLink { left, right, .. } = self.links[i];
		if let Some(l) = left {
			self.links[l].right = right;
		}
		if let Some(r) = right {
			self.links[r].left = left;
		}
		self.links[i].left = None;
		self.links[i].right = None;
	}
	/// Place a node into the frontier walking rightwards from `from`, it lands after every
	/// node of an equal or smaller distance
	fn insert_from(&mut self, from: usize, i: usize) {
		let distance = self.links[i].distance;
		let mut previous = from;
		while let Some(next) = self.links[previous].right {
			if self.links[next].distance > distance {
				break;
			}
			previous = next;
		}
		let next = self.links[previous].right;
		self.links[i].left = Some(previous);
		self.links[i].right = next;
		if let Some(n) = next {
			self.links[n].left = Some(i);
		}
		self.links[previous].right = Some(i);
	}
	/// Relax the head of the frontier until the frontier is exhausted
	fn relax_all(&mut self, eight_ways: bool) {
		while let Some(current) = self.links[0].right {
			self.relax(current, eight_ways);
			self.unlink(current);
		}
	}
	/// Offer each neighbour of `current` a route through it
	fn relax(&mut self, current: usize, eight_ways: bool) {
		let width = self.width as i32;
		let node = self.links[current];
		let px = ((node.index - 1) % self.width) as i32;
		let py = ((node.index - 1) / self.width) as i32;
		for ordinal in Ordinal::directions(eight_ways) {
			let (nx, ny) = ordinal.step_from(px, py);
			if nx < 0 || ny < 0 || nx >= width || ny >= self.height as i32 {
				continue;
			}
			let n = 1 + (nx + ny * width) as usize;
			let cost = self.links[n].cost;
			if cost < 0 {
				continue;
			}
			let mut distance = node.distance + cost as f32;
			if ordinal.is_diagonal() {
				let flank_x = 1 + (nx + py * width) as usize;
				let flank_y = 1 + (px + ny * width) as usize;
				if self.links[flank_x].cost == OBSTRUCTION || self.links[flank_y].cost == OBSTRUCTION
				{
					continue;
				}
				distance += DIAGONAL_SURCHARGE;
			}
			if distance < self.links[n].distance {
				self.links[n].distance = distance;
				if self.links[n].is_queued() {
					self.unlink(n);
				}
				self.insert_from(current, n);
			}
		}
	}
	/// Copy the frame back into `distances`, unresolved cells hold `max_distance`
	fn store(&self, distances: &mut Grid<f32>, max_distance: f32) {
		let width = self.width;
		distances.fill_with(|x, y| {
			let i = 1 + (x + 1) as usize + (y + 1) as usize * width;
			self.links[i].distance.min(max_distance)
		});
	}
}

/// A non-positive ceiling falls back to [NO_PATH]
pub(crate) fn ceiling(max_distance: f32) -> f32 {
	if max_distance <= 0.0 {
		NO_PATH
	} else {
		max_distance
	}
}
