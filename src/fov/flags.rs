//! The per-cell visibility state machine.
//!
//! Each cell tracks which kinds of sight reach it this tick (`current`) and which reached it on
//! the previous tick (`previous`), plus a handful of sticky markers. A tick is:
//!
//! 1. [CellVisibility::demote] - `current` is aged into `previous` and cleared
//! 2. the field-of-view passes set kinds in `current`
//! 3. [CellVisibility::promote] - light turns `IN_FOV` into `VISIBLE` and the `(current, previous)`
//!    pair is compared to find transitions
//!
//! For consumers that prefer a single integer per cell [CellVisibility::flags] packs the state
//! into [FovFlags] where every `WAS_*` bit is the previous value of its live partner.
//!

use bevy::prelude::*;
use bitflags::bitflags;

bitflags! {
	/// The kinds of sight that can reach a cell during a tick
	#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
	#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct VisibilityKindSet: u8 {
		/// Seen directly and lit
		const VISIBLE = 1 << 0;
		/// Seen through clairvoyance
		const CLAIRVOYANT = 1 << 1;
		/// Seen through telepathy
		const TELEPATHIC = 1 << 2;
		/// An actor in the cell has been detected
		const ACTOR_DETECTED = 1 << 3;
		/// An item in the cell has been detected
		const ITEM_DETECTED = 1 << 4;
		/// Within the line of sight of the followed subject, lit or not
		const IN_FOV = 1 << 5;
		/// Kinds that show the terrain of a cell
		const ANY_KIND_OF_VISIBLE = Self::VISIBLE.bits() | Self::CLAIRVOYANT.bits() | Self::TELEPATHIC.bits();
		/// Kinds that only reveal the contents of a cell
		const DETECTED = Self::ACTOR_DETECTED.bits() | Self::ITEM_DETECTED.bits();
		/// Kinds whose transitions are reported
		const SENSED = Self::ANY_KIND_OF_VISIBLE.bits() | Self::DETECTED.bits();
	}
}

bitflags! {
	/// Packed view of a [CellVisibility], one integer per cell
	#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
	#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct FovFlags: u32 {
		/// Seen directly and lit
		const VISIBLE = 1 << 0;
		/// Previous [FovFlags::VISIBLE]
		const WAS_VISIBLE = 1 << 1;
		/// Seen through clairvoyance
		const CLAIRVOYANT_VISIBLE = 1 << 2;
		/// Previous [FovFlags::CLAIRVOYANT_VISIBLE]
		const WAS_CLAIRVOYANT_VISIBLE = 1 << 3;
		/// Seen through telepathy
		const TELEPATHIC_VISIBLE = 1 << 4;
		/// Previous [FovFlags::TELEPATHIC_VISIBLE]
		const WAS_TELEPATHIC_VISIBLE = 1 << 5;
		/// An actor in the cell is detected
		const ACTOR_DETECTED = 1 << 6;
		/// Previous [FovFlags::ACTOR_DETECTED]
		const WAS_ACTOR_DETECTED = 1 << 7;
		/// An item in the cell is detected
		const ITEM_DETECTED = 1 << 8;
		/// Previous [FovFlags::ITEM_DETECTED]
		const WAS_ITEM_DETECTED = 1 << 9;
		/// Seen at some point
		const REVEALED = 1 << 10;
		/// Layout known through magic mapping
		const MAGIC_MAPPED = 1 << 11;
		/// In the line of sight of the viewer
		const IN_FOV = 1 << 12;
		/// Previous [FovFlags::IN_FOV]
		const WAS_IN_FOV = 1 << 13;
		/// Never goes dark
		const ALWAYS_VISIBLE = 1 << 14;
		/// Under the cursor
		const IS_CURSOR = 1 << 15;
		/// Highlighted
		const IS_HIGHLIGHTED = 1 << 16;
	}
}

/// `(live kind, live flag, previous flag)` pairings used to pack a cell
const PAIRS: [(VisibilityKindSet, FovFlags, FovFlags); 6] = [
	(VisibilityKindSet::VISIBLE, FovFlags::VISIBLE, FovFlags::WAS_VISIBLE),
	(
		VisibilityKindSet::CLAIRVOYANT,
		FovFlags::CLAIRVOYANT_VISIBLE,
		FovFlags::WAS_CLAIRVOYANT_VISIBLE,
	),
	(
		VisibilityKindSet::TELEPATHIC,
		FovFlags::TELEPATHIC_VISIBLE,
		FovFlags::WAS_TELEPATHIC_VISIBLE,
	),
	(
		VisibilityKindSet::ACTOR_DETECTED,
		FovFlags::ACTOR_DETECTED,
		FovFlags::WAS_ACTOR_DETECTED,
	),
	(
		VisibilityKindSet::ITEM_DETECTED,
		FovFlags::ITEM_DETECTED,
		FovFlags::WAS_ITEM_DETECTED,
	),
	(VisibilityKindSet::IN_FOV, FovFlags::IN_FOV, FovFlags::WAS_IN_FOV),
];

/// The kind of sight a [crate::prelude::Viewport] grants
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum VisibilityKind {
	/// Ordinary sight, does not need light
	#[default]
	Direct,
	/// Sight through clairvoyance
	Clairvoyant,
	/// Sight through telepathy
	Telepathic,
	/// Detection of actors
	ActorDetected,
	/// Detection of items
	ItemDetected,
}

impl VisibilityKind {
	/// The kind as a member of a [VisibilityKindSet]
	pub fn as_set(&self) -> VisibilityKindSet {
		match self {
			VisibilityKind::Direct => VisibilityKindSet::VISIBLE,
			VisibilityKind::Clairvoyant => VisibilityKindSet::CLAIRVOYANT,
			VisibilityKind::Telepathic => VisibilityKindSet::TELEPATHIC,
			VisibilityKind::ActorDetected => VisibilityKindSet::ACTOR_DETECTED,
			VisibilityKind::ItemDetected => VisibilityKindSet::ITEM_DETECTED,
		}
	}
}

/// Visibility state of a single cell
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CellVisibility {
	/// Kinds of sight reaching the cell this tick
	pub current: VisibilityKindSet,
	/// Kinds of sight that reached the cell on the previous tick
	pub previous: VisibilityKindSet,
	/// The cell has been seen at some point, cleared only by hiding the cell
	pub revealed: bool,
	/// The layout of the cell is known through magic mapping
	pub magic_mapped: bool,
	/// The cell never goes dark
	pub always_visible: bool,
	/// The cell is under the cursor
	pub cursor: bool,
	/// The cell is highlighted
	pub highlight: bool,
}

impl CellVisibility {
	/// Age the live kinds into `previous`. An always visible cell is immediately visible again
	pub fn demote(&mut self) {
		self.previous = self.current;
		self.current = VisibilityKindSet::empty();
		if self.always_visible {
			self.current.insert(VisibilityKindSet::VISIBLE);
		}
	}
	/// Finish a tick. A cell in the field of view becomes [VisibilityKindSet::VISIBLE] when it is
	/// lit. If any sensed kind differs from the previous tick `Some(sensed_now)` is returned,
	/// steady state returns [None]. A cell gaining a visible kind becomes revealed
	pub fn promote(&mut self, has_visible_light: bool) -> Option<bool> {
		if has_visible_light && self.current.contains(VisibilityKindSet::IN_FOV) {
			self.current.insert(VisibilityKindSet::VISIBLE);
		}
		let now = self.current & VisibilityKindSet::SENSED;
		let was = self.previous & VisibilityKindSet::SENSED;
		if now == was {
			return None;
		}
		let gained = now.difference(was);
		if gained.intersects(VisibilityKindSet::ANY_KIND_OF_VISIBLE) {
			self.revealed = true;
		}
		Some(!now.is_empty())
	}
	/// Whether the terrain of the cell can be seen by any means
	pub fn is_any_kind_of_visible(&self) -> bool {
		self.current
			.intersects(VisibilityKindSet::ANY_KIND_OF_VISIBLE)
	}
	/// Whether the terrain of the cell could be seen by any means last tick
	pub fn was_any_kind_of_visible(&self) -> bool {
		self.previous
			.intersects(VisibilityKindSet::ANY_KIND_OF_VISIBLE)
	}
	/// Whether anything is sensed in the cell
	pub fn is_sensed(&self) -> bool {
		self.current.intersects(VisibilityKindSet::SENSED)
	}
	/// Pack the state into [FovFlags]
	pub fn flags(&self) -> FovFlags {
		let mut flags = FovFlags::empty();
		for (kind, live, was) in PAIRS.iter() {
			flags.set(*live, self.current.contains(*kind));
			flags.set(*was, self.previous.contains(*kind));
		}
		flags.set(FovFlags::REVEALED, self.revealed);
		flags.set(FovFlags::MAGIC_MAPPED, self.magic_mapped);
		flags.set(FovFlags::ALWAYS_VISIBLE, self.always_visible);
		flags.set(FovFlags::IS_CURSOR, self.cursor);
		flags.set(FovFlags::IS_HIGHLIGHTED, self.highlight);
		flags
	}
	/// Unpack [FovFlags], the inverse of [CellVisibility::flags]
	pub fn from_flags(flags: FovFlags) -> Self {
		let mut cell = CellVisibility::default();
		for (kind, live, was) in PAIRS.iter() {
			cell.current.set(*kind, flags.contains(*live));
			cell.previous.set(*kind, flags.contains(*was));
		}
		cell.revealed = flags.contains(FovFlags::REVEALED);
		cell.magic_mapped = flags.contains(FovFlags::MAGIC_MAPPED);
		cell.always_visible = flags.contains(FovFlags::ALWAYS_VISIBLE);
		cell.cursor = flags.contains(FovFlags::IS_CURSOR);
		cell.highlight = flags.contains(FovFlags::IS_HIGHLIGHTED);
		cell
	}
}
