//! Recursive shadowcasting field-of-view.
//!
//! The area around an origin is split into 8 octants. Each octant is scanned row by row moving
//! away from the origin while a cone, bounded by a `start_slope` and an `end_slope`, describes
//! what part of the row can still be seen:
//!
//! ```text
//!   start_slope = 1.0
//!        \
//!         \  . . . . . . .   row 4
//!          \ . . . . . .     row 3
//!           \. . # . .       row 2
//!            \ . . .         row 1
//!             @----------- end_slope = 0.0
//! ```
//!
//! When a blocking cell is met the cells before it in the row are still lit, the scan of the
//! deeper rows is forked with the cone as it stood before the blocker and the current cone has
//! its start slope narrowed past the blocker. A cone is abandoned once it collapses
//! (`start_slope < end_slope`) or its rows move beyond the radius.
//!
//! Cells on the seams between octants may be reported more than once, only the final set of
//! visible cells is meaningful.
//!
//! Unlike movement in a [crate::prelude::DijkstraMap] sight applies no corner rule, a cell can
//! be seen diagonally between two walls even though it cannot be walked to that way.
//!

use std::collections::HashSet;

use bevy::prelude::*;

use crate::prelude::*;

/// Metric radii are compared against the maximum radius with this much slack
const RADIUS_EPSILON: f32 = 1e-3;

/// How the distance of a cell from the origin is measured when deciding whether it is inside
/// the radius and how bright it is.
///
/// If the shape of what can be seen should agree with the shape of movement costs then the
/// metric should match the one implied by the distance field, which is [RadiusMetric::Octile]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Reflect)]
pub enum RadiusMetric {
	/// Orthogonal steps cost `1`, diagonal steps cost `1 + DIAGONAL_SURCHARGE`
	#[default]
	Octile,
	/// Straight line distance
	Euclidean,
	/// Diagonal steps cost the same as orthogonal ones, produces a square
	Chebyshev,
	/// No diagonal steps, produces a diamond
	Manhattan,
}

impl RadiusMetric {
	/// Measure the offset `(dx, dy)`
	pub fn radius(&self, dx: i32, dy: i32) -> f32 {
		let ax = dx.unsigned_abs() as f32;
		let ay = dy.unsigned_abs() as f32;
		match self {
			RadiusMetric::Octile => ax.max(ay) + DIAGONAL_SURCHARGE * ax.min(ay),
			RadiusMetric::Euclidean => ax.hypot(ay),
			RadiusMetric::Chebyshev => ax.max(ay),
			RadiusMetric::Manhattan => ax + ay,
		}
	}
}

/// Calculates which cells can be seen from an origin
pub struct ShadowcastFov<'a> {
	/// Whether a cell stops sight passing through it
	is_blocked: &'a dyn Fn(i32, i32) -> bool,
	/// Whether a cell exists at all, cells failing this are never reported and block sight
	has_xy: Option<&'a dyn Fn(i32, i32) -> bool>,
	/// Measures the radius of cells
	metric: RadiusMetric,
}

impl<'a> ShadowcastFov<'a> {
	/// Create a new instance of [ShadowcastFov] using the octile metric and no bounds
	pub fn new(is_blocked: &'a dyn Fn(i32, i32) -> bool) -> Self {
		ShadowcastFov {
			is_blocked,
			has_xy: None,
			metric: RadiusMetric::default(),
		}
	}
	/// Restrict the cells that can be reported
	pub fn with_has_xy(mut self, has_xy: &'a dyn Fn(i32, i32) -> bool) -> Self {
		self.has_xy = Some(has_xy);
		self
	}
	/// Use a different [RadiusMetric]
	pub fn with_metric(mut self, metric: RadiusMetric) -> Self {
		self.metric = metric;
		self
	}
	/// Get the [RadiusMetric] in use
	pub fn get_metric(&self) -> RadiusMetric {
		self.metric
	}
	/// Scan outwards from `(origin_x, origin_y)` calling `on_visible(x, y, brightness)` for each
	/// cell that can be seen within `max_radius`. The origin is always reported with a
	/// brightness of `1.0`, brightness fades towards `0.0` at the edge of the radius
	pub fn calculate(
		&self,
		origin_x: i32,
		origin_y: i32,
		max_radius: u32,
		mut on_visible: impl FnMut(i32, i32, f32),
	) {
		on_visible(origin_x, origin_y, 1.0);
		if max_radius == 0 {
			return;
		}
		let mut scan = OctantScan {
			fov: self,
			origin_x,
			origin_y,
			max_radius,
			on_visible: &mut on_visible,
		};
		// each diagonal direction is the shared edge of two octants
		for ordinal in Ordinal::DIAGONALS {
			let (dx, dy) = ordinal.offset();
			scan.cast_light(1, 1.0, 0.0, [0, dx, dy, 0]);
			scan.cast_light(1, 1.0, 0.0, [dx, 0, 0, dy]);
		}
	}
	/// Collect the set of cells visible from `(origin_x, origin_y)`
	pub fn visible_cells(&self, origin_x: i32, origin_y: i32, max_radius: u32) -> HashSet<(i32, i32)> {
		let mut cells = HashSet::new();
		self.calculate(origin_x, origin_y, max_radius, |x, y, _| {
			cells.insert((x, y));
		});
		cells
	}
	/// Whether `(x, y)` can be reported
	fn in_bounds(&self, x: i32, y: i32) -> bool {
		self.has_xy.is_none_or(|has_xy| has_xy(x, y))
	}
}

/// Working state of one [ShadowcastFov::calculate] call
struct OctantScan<'s, 'a, F: FnMut(i32, i32, f32)> {
	/// Blocking and bounds rules
	fov: &'s ShadowcastFov<'a>,
	/// Column of the viewer
	origin_x: i32,
	/// Row of the viewer
	origin_y: i32,
	/// Furthest metric radius that can be seen
	max_radius: u32,
	/// Receives lit cells
	on_visible: &'s mut F,
}

impl<F: FnMut(i32, i32, f32)> OctantScan<'_, '_, F> {
	/// Scan the rows of one octant starting from `row`. `transform` is `[xx, xy, yx, yy]`, it
	/// maps the octant local `(dx, dy)` onto the map so that one routine serves every octant
	fn cast_light(&mut self, row: u32, mut start_slope: f32, end_slope: f32, transform: [i32; 4]) {
		if start_slope < end_slope {
			return;
		}
		let [xx, xy, yx, yy] = transform;
		let light_radius = self.max_radius as f32 + 1.0;
		let mut next_start_slope = start_slope;
		for distance in row..=self.max_radius {
			let mut blocked = false;
			let dy = -(distance as i32);
			for dx in dy..=0 {
				// slopes of the two cell corners bounding it within the cone
				let left_slope = (dx as f32 - 0.5) / (dy as f32 + 0.5);
				let right_slope = (dx as f32 + 0.5) / (dy as f32 - 0.5);
				if start_slope < right_slope {
					continue;
				} else if end_slope > left_slope {
					break;
				}
				let x = self.origin_x + dx * xx + dy * xy;
				let y = self.origin_y + dx * yx + dy * yy;
				let opaque = if self.fov.in_bounds(x, y) {
					let radius = self.fov.metric.radius(dx, dy);
					if radius <= self.max_radius as f32 + RADIUS_EPSILON {
						(self.on_visible)(x, y, 1.0 - radius / light_radius);
					}
					(self.fov.is_blocked)(x, y)
				} else {
					true
				};
				if blocked {
					if opaque {
						next_start_slope = right_slope;
						continue;
					}
					// out of the shadow, resume with the narrowed cone
					blocked = false;
					start_slope = next_start_slope;
				} else if opaque {
					blocked = true;
					next_start_slope = right_slope;
					self.cast_light(distance + 1, start_slope, left_slope, transform);
				}
			}
			if blocked {
				break;
			}
		}
	}
}
