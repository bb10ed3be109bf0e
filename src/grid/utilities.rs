//! Useful structures and tools shared by the visibility and path calculations
//!

use bevy::prelude::Reflect;

/// Extra cost of a diagonal step over an orthogonal one, `√2 - 1` to four decimal places. Shared
/// by the octile [crate::prelude::RadiusMetric] and diagonal relaxation in
/// [crate::prelude::DijkstraMap] so that sight and movement agree on distance
pub const DIAGONAL_SURCHARGE: f32 = 0.4142;

/// Convenience way of describing the 8 directions of movement (or sight) from a cell.
///
/// The declaration order is also the scan order used when examining neighbours, the four
/// orthogonal directions come first so that a 4-way scan is simply the first half of an 8-way
/// scan
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Reflect)]
pub enum Ordinal {
	North,
	East,
	South,
	West,
	NorthEast,
	SouthEast,
	SouthWest,
	NorthWest,
}

impl Ordinal {
	/// All directions in scan order
	pub const ALL: [Ordinal; 8] = [
		Ordinal::North,
		Ordinal::East,
		Ordinal::South,
		Ordinal::West,
		Ordinal::NorthEast,
		Ordinal::SouthEast,
		Ordinal::SouthWest,
		Ordinal::NorthWest,
	];
	/// The diagonal directions
	pub const DIAGONALS: [Ordinal; 4] = [
		Ordinal::NorthEast,
		Ordinal::SouthEast,
		Ordinal::SouthWest,
		Ordinal::NorthWest,
	];
	/// The directions examined for movement, the orthogonal 4 or all 8 when `eight_ways`
	pub fn directions(eight_ways: bool) -> &'static [Ordinal] {
		if eight_ways {
			&Ordinal::ALL
		} else {
			&Ordinal::ALL[..4]
		}
	}
	/// The `(dx, dy)` step of the direction, north is `-y`
	pub fn offset(&self) -> (i32, i32) {
		match self {
			Ordinal::North => (0, -1),
			Ordinal::East => (1, 0),
			Ordinal::South => (0, 1),
			Ordinal::West => (-1, 0),
			Ordinal::NorthEast => (1, -1),
			Ordinal::SouthEast => (1, 1),
			Ordinal::SouthWest => (-1, 1),
			Ordinal::NorthWest => (-1, -1),
		}
	}
	/// Whether the direction is one of the four diagonals
	pub fn is_diagonal(&self) -> bool {
		!matches!(
			self,
			Ordinal::North | Ordinal::East | Ordinal::South | Ordinal::West
		)
	}
	/// Step from `(x, y)` one cell in this direction
	pub fn step_from(&self, x: i32, y: i32) -> (i32, i32) {
		let (dx, dy) = self.offset();
		(x + dx, y + dy)
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn four_way_scan_is_orthogonal() {
		let result = Ordinal::directions(false);
		let actual = [Ordinal::North, Ordinal::East, Ordinal::South, Ordinal::West];
		assert_eq!(actual, result);
	}
	#[test]
	fn eight_way_scan_appends_diagonals() {
		let result = Ordinal::directions(true);
		assert_eq!(8, result.len());
		assert_eq!(Ordinal::DIAGONALS, &result[4..]);
		assert!(result[4..].iter().all(|o| o.is_diagonal()));
	}
	#[test]
	fn step_from_origin() {
		assert_eq!((4, 6), Ordinal::SouthWest.step_from(5, 5));
		assert_eq!((5, 4), Ordinal::North.step_from(5, 5));
	}
}
