//! Field-of-view calculation and per-cell visibility tracking.
//!
//! [shadowcast::ShadowcastFov] answers "which cells can be seen from here", it has no memory.
//! [tracker::VisibilityTracker] runs it every update over a [FovSite], keeps the history of each
//! cell and reports the cells whose visibility changed:
//!
//! ```text
//!  FovSite ──blocks_vision──► ShadowcastFov ──cells──► VisibilityTracker ──(x, y, bool)──► callback
//!     │                                                   ▲
//!     └──viewports / has_visible_light────────────────────┘
//! ```
//!

pub mod flags;
pub mod shadowcast;
pub mod tracker;

use crate::prelude::*;

/// An extra source of sight processed on every update, a scrying pool or a telepathic link
/// for instance
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
	/// Column the sight originates from
	pub x: i32,
	/// Row the sight originates from
	pub y: i32,
	/// Radius of the sight, `0` grants only the cell itself
	pub radius: u32,
	/// The kind of sight granted to each cell seen
	pub kind: VisibilityKind,
}

/// The map a [VisibilityTracker] works over
pub trait FovSite {
	/// Number of columns
	fn get_width(&self) -> usize;
	/// Number of rows
	fn get_height(&self) -> usize;
	/// Whether the cell stops sight passing through it
	fn blocks_vision(&self, x: i32, y: i32) -> bool;
	/// Report each [Viewport] active this update, there are none by default
	fn for_each_viewport(&self, _f: &mut dyn FnMut(Viewport)) {}
	/// Whether the cell is lit well enough to be seen, everything is lit by default
	fn has_visible_light(&self, _x: i32, _y: i32) -> bool {
		true
	}
}

impl<T: FovSite + ?Sized> FovSite for &T {
	fn get_width(&self) -> usize {
		(**self).get_width()
	}
	fn get_height(&self) -> usize {
		(**self).get_height()
	}
	fn blocks_vision(&self, x: i32, y: i32) -> bool {
		(**self).blocks_vision(x, y)
	}
	fn for_each_viewport(&self, f: &mut dyn FnMut(Viewport)) {
		(**self).for_each_viewport(f)
	}
	fn has_visible_light(&self, x: i32, y: i32) -> bool {
		(**self).has_visible_light(x, y)
	}
}

/// A grid of blockers is the simplest site, `true` stops sight
impl FovSite for Grid<bool> {
	fn get_width(&self) -> usize {
		Grid::get_width(self)
	}
	fn get_height(&self) -> usize {
		Grid::get_height(self)
	}
	fn blocks_vision(&self, x: i32, y: i32) -> bool {
		self.get_or(x, y, true)
	}
}

/// Something that sees, the tracker can follow one of these and update from its position
pub trait FovSubject {
	/// The `(x, y)` cell the subject stands in
	fn get_position(&self) -> (i32, i32);
	/// How far the subject can see
	fn get_vision_distance(&self) -> u32;
}
