//! Tracks the visibility of every cell of a [FovSite] across updates.
//!
//! An update ages every cell, grants sight from each [Viewport] the site reports, casts the
//! field of view of the subject and then compares each cell against the previous update. Any
//! cell whose sensed kinds changed fires the change callback exactly once with whether anything
//! is now sensed in it, a steady cell fires nothing.
//!
//! Between updates the state can be edited directly (revealing, magic mapping, cursors...),
//! each edit fires the callback for the cells it touches.
//!

use bevy::log::{debug, trace};

use crate::prelude::*;

/// Receives `(x, y, sensed_now)` whenever the displayed state of a cell changes
pub type FovChangeCallback = Box<dyn FnMut(i32, i32, bool)>;

/// Initial state of every cell of a new [VisibilityTracker]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TrackerOptions {
	/// Every cell starts revealed
	pub revealed: bool,
	/// Every cell starts visible, this implies `always_visible`
	pub visible: bool,
	/// Every cell is permanently visible
	pub always_visible: bool,
}

/// Per-cell visibility over a [FovSite]
pub struct VisibilityTracker<S: FovSite> {
	/// The map being looked at
	site: S,
	/// State of each cell
	cells: Grid<CellVisibility>,
	/// How cell radii are measured for every cast
	metric: RadiusMetric,
	/// Whether anything changed during the last update or edit
	changed: bool,
	/// Notified of each cell change
	callback: Option<FovChangeCallback>,
	/// The subject [VisibilityTracker::update] looks through
	follow: Option<Box<dyn FovSubject>>,
}

impl<S: FovSite> VisibilityTracker<S> {
	/// Create a new instance of [VisibilityTracker] sized to the `site`
	pub fn new(site: S, options: TrackerOptions) -> Self {
		let cells = Grid::new(
			site.get_width(),
			site.get_height(),
			CellVisibility::default(),
		);
		let mut tracker = VisibilityTracker {
			site,
			cells,
			metric: RadiusMetric::default(),
			changed: true,
			callback: None,
			follow: None,
		};
		if options.revealed {
			tracker.cells.for_each_mut(|cell, _, _| cell.revealed = true);
		}
		if options.visible || options.always_visible {
			tracker.make_always_visible();
		}
		tracker
	}
	/// Notify `callback` of cell changes
	pub fn with_callback(mut self, callback: impl FnMut(i32, i32, bool) + 'static) -> Self {
		self.callback = Some(Box::new(callback));
		self
	}
	/// Measure radii with a different [RadiusMetric]
	pub fn with_metric(mut self, metric: RadiusMetric) -> Self {
		self.metric = metric;
		self
	}
	/// Replace the change callback, [None] removes it
	pub fn set_callback(&mut self, callback: Option<FovChangeCallback>) {
		self.callback = callback;
	}
	/// Follow a subject so that [VisibilityTracker::update] can be called without arguments
	pub fn set_follow(&mut self, subject: Option<Box<dyn FovSubject>>) {
		self.follow = subject;
	}
	/// Get a reference to the site
	pub fn get_site(&self) -> &S {
		&self.site
	}
	/// Get a mutable reference to the site, changes are picked up by the next update
	pub fn get_site_mut(&mut self) -> &mut S {
		&mut self.site
	}
	/// Get the [RadiusMetric] in use
	pub fn get_metric(&self) -> RadiusMetric {
		self.metric
	}
	/// Whether anything changed during the last update or edit
	pub fn is_changed(&self) -> bool {
		self.changed
	}
	/// Update from the followed subject. Without one nothing happens and `false` is returned
	pub fn update(&mut self) -> bool {
		let Some((x, y, radius)) = self.follow.as_ref().map(|subject| {
			let (x, y) = subject.get_position();
			(x, y, subject.get_vision_distance())
		}) else {
			trace!("No subject to follow, visibility left untouched");
			self.changed = false;
			return false;
		};
		self.update_at(x, y, Some(radius))
	}
	/// Update from the position and vision distance of `subject`
	pub fn update_for(&mut self, subject: &dyn FovSubject) -> bool {
		let (x, y) = subject.get_position();
		self.update_at(x, y, Some(subject.get_vision_distance()))
	}
	/// Update with the viewer at `(x, y)` seeing as far as `radius`, [None] sees across the
	/// whole site. Returns whether any cell changed
	pub fn update_at(&mut self, x: i32, y: i32, radius: Option<u32>) -> bool {
		self.changed = false;
		let (width, height) = self.cells.get_size();
		let radius = radius.unwrap_or((width + height) as u32);
		self.cells.for_each_mut(|cell, _, _| cell.demote());

		let VisibilityTracker {
			site,
			cells,
			metric,
			changed,
			callback,
			..
		} = self;
		let blocks = |bx: i32, by: i32| site.blocks_vision(bx, by);
		let has_xy = move |hx: i32, hy: i32| {
			hx >= 0 && hy >= 0 && (hx as usize) < width && (hy as usize) < height
		};
		let fov = ShadowcastFov::new(&blocks)
			.with_has_xy(&has_xy)
			.with_metric(*metric);

		let mut viewports = Vec::new();
		site.for_each_viewport(&mut |viewport| viewports.push(viewport));
		for viewport in viewports.iter() {
			let kind = viewport.kind.as_set();
			if viewport.radius == 0 {
				if let Some(cell) = cells.get_mut(viewport.x, viewport.y) {
					cell.current.insert(kind);
				}
				continue;
			}
			fov.calculate(viewport.x, viewport.y, viewport.radius, |vx, vy, _| {
				if let Some(cell) = cells.get_mut(vx, vy) {
					cell.current.insert(kind);
				}
			});
		}
		fov.calculate(x, y, radius, |vx, vy, _| {
			if let Some(cell) = cells.get_mut(vx, vy) {
				cell.current.insert(VisibilityKindSet::IN_FOV);
			}
		});

		let mut transitions = 0;
		cells.for_each_mut(|cell, cx, cy| {
			if let Some(sensed) = cell.promote(site.has_visible_light(cx, cy)) {
				*changed = true;
				transitions += 1;
				if let Some(callback) = callback.as_mut() {
					callback(cx, cy, sensed);
				}
			}
		});
		if transitions > 0 {
			debug!(
				"Visibility from ({}, {}) changed {} cells",
				x, y, transitions
			);
		}
		self.changed
	}
	/// Reveal the cells within `radius` of `(x, y)`, `0` reveals only the cell itself. When
	/// `make_visible_too` they are also visible until the next update
	pub fn reveal_cell(&mut self, x: i32, y: i32, radius: u32, make_visible_too: bool) {
		if !self.cells.has_xy(x, y) {
			return;
		}
		let mut touched = Vec::new();
		if radius == 0 {
			touched.push((x, y));
		} else {
			let (width, height) = self.cells.get_size();
			let site = &self.site;
			let blocks = |bx: i32, by: i32| site.blocks_vision(bx, by);
			let has_xy = move |hx: i32, hy: i32| {
				hx >= 0 && hy >= 0 && (hx as usize) < width && (hy as usize) < height
			};
			ShadowcastFov::new(&blocks)
				.with_has_xy(&has_xy)
				.with_metric(self.metric)
				.calculate(x, y, radius, |vx, vy, _| touched.push((vx, vy)));
			touched.sort_unstable();
			touched.dedup();
		}
		for (tx, ty) in touched {
			self.edit_cell(tx, ty, |cell| {
				cell.revealed = true;
				if make_visible_too {
					cell.current.insert(VisibilityKindSet::VISIBLE);
				}
			});
		}
	}
	/// Reveal the whole site
	pub fn reveal_all(&mut self, make_visible_too: bool) {
		self.edit_all(|cell| {
			cell.revealed = true;
			if make_visible_too {
				cell.current.insert(VisibilityKindSet::VISIBLE);
			}
		});
	}
	/// Forget a cell, it is no longer revealed, mapped or sensed in any way
	pub fn hide_cell(&mut self, x: i32, y: i32) {
		self.edit_cell(x, y, |cell| {
			cell.revealed = false;
			cell.magic_mapped = false;
			cell.always_visible = false;
			cell.demote();
		});
	}
	/// Mark the layout of a cell as known
	pub fn magic_map_cell(&mut self, x: i32, y: i32) {
		self.edit_cell(x, y, |cell| cell.magic_mapped = true);
	}
	/// Make a cell permanently visible
	pub fn make_cell_always_visible(&mut self, x: i32, y: i32) {
		self.edit_cell(x, y, make_always_visible);
	}
	/// Make every cell permanently visible
	pub fn make_always_visible(&mut self) {
		self.edit_all(make_always_visible);
	}
	/// Place the cursor on `(x, y)`. Unless `keep_existing` any other cursor cell is cleared
	pub fn set_cursor(&mut self, x: i32, y: i32, keep_existing: bool) {
		if !keep_existing {
			self.clear_cursor();
		}
		self.edit_cell(x, y, |cell| cell.cursor = true);
	}
	/// Remove the cursor from every cell
	pub fn clear_cursor(&mut self) {
		self.edit_where(|cell| cell.cursor, |cell| cell.cursor = false);
	}
	/// Remove the cursor from `(x, y)`
	pub fn clear_cursor_at(&mut self, x: i32, y: i32) {
		self.edit_cell(x, y, |cell| cell.cursor = false);
	}
	/// Highlight `(x, y)`. Unless `keep_existing` any other highlighted cell is cleared
	pub fn set_highlight(&mut self, x: i32, y: i32, keep_existing: bool) {
		if !keep_existing {
			self.clear_highlight();
		}
		self.edit_cell(x, y, |cell| cell.highlight = true);
	}
	/// Remove the highlight from every cell
	pub fn clear_highlight(&mut self) {
		self.edit_where(|cell| cell.highlight, |cell| cell.highlight = false);
	}
	/// Remove the highlight from `(x, y)`
	pub fn clear_highlight_at(&mut self, x: i32, y: i32) {
		self.edit_cell(x, y, |cell| cell.highlight = false);
	}
	/// Return every cell to its initial, unseen, state
	pub fn reset(&mut self) {
		self.edit_all(|cell| *cell = CellVisibility::default());
	}
	/// Apply `edit` to a cell and notify the callback if the cell changed, out of range cells
	/// are ignored
	fn edit_cell(&mut self, x: i32, y: i32, edit: impl FnOnce(&mut CellVisibility)) {
		let Some(cell) = self.cells.get_mut(x, y) else {
			return;
		};
		let before = *cell;
		edit(cell);
		if *cell == before {
			return;
		}
		let sensed = notify_state(cell);
		self.changed = true;
		if let Some(callback) = self.callback.as_mut() {
			callback(x, y, sensed);
		}
	}
	/// Apply `edit` to every cell and notify the callback for each that changed
	fn edit_all(&mut self, edit: impl FnMut(&mut CellVisibility)) {
		self.edit_where(|_| true, edit);
	}
	/// Apply `edit` to the cells passing `filter` and notify the callback for each that changed
	fn edit_where(
		&mut self,
		filter: impl Fn(&CellVisibility) -> bool,
		mut edit: impl FnMut(&mut CellVisibility),
	) {
		let VisibilityTracker {
			cells,
			changed,
			callback,
			..
		} = self;
		cells.for_each_mut(|cell, x, y| {
			if !filter(cell) {
				return;
			}
			let before = *cell;
			edit(cell);
			if *cell == before {
				return;
			}
			*changed = true;
			if let Some(callback) = callback.as_mut() {
				callback(x, y, notify_state(cell));
			}
		});
	}
	/// Get the state of a cell
	pub fn get_cell(&self, x: i32, y: i32) -> Option<&CellVisibility> {
		self.cells.get(x, y)
	}
	/// Get the state of every cell
	pub fn get_cells(&self) -> &Grid<CellVisibility> {
		&self.cells
	}
	/// Packed flags of a cell, empty when out of range
	pub fn flags(&self, x: i32, y: i32) -> FovFlags {
		self.cells
			.get(x, y)
			.map(|cell| cell.flags())
			.unwrap_or_default()
	}
	/// Whether `(x, y)` is in range and `test` holds for it
	fn check(&self, x: i32, y: i32, test: impl FnOnce(&CellVisibility) -> bool) -> bool {
		self.cells.get(x, y).is_some_and(test)
	}
	/// Whether the cell is seen directly or held visible
	pub fn is_visible(&self, x: i32, y: i32) -> bool {
		self.check(x, y, |c| c.current.contains(VisibilityKindSet::VISIBLE))
	}
	/// Whether the cell is seen by any means
	pub fn is_any_kind_of_visible(&self, x: i32, y: i32) -> bool {
		self.check(x, y, |c| c.is_any_kind_of_visible())
	}
	/// Whether the cell is seen through clairvoyance
	pub fn is_clairvoyant_visible(&self, x: i32, y: i32) -> bool {
		self.check(x, y, |c| c.current.contains(VisibilityKindSet::CLAIRVOYANT))
	}
	/// Whether the cell is seen through telepathy
	pub fn is_telepathic_visible(&self, x: i32, y: i32) -> bool {
		self.check(x, y, |c| c.current.contains(VisibilityKindSet::TELEPATHIC))
	}
	/// Whether the cell is in the line of sight of the viewer, lit or not
	pub fn is_in_fov(&self, x: i32, y: i32) -> bool {
		self.check(x, y, |c| c.current.contains(VisibilityKindSet::IN_FOV))
	}
	/// Whether the cell is both in the line of sight of the viewer and visible
	pub fn is_directly_visible(&self, x: i32, y: i32) -> bool {
		self.check(x, y, |c| {
			c.current
				.contains(VisibilityKindSet::VISIBLE | VisibilityKindSet::IN_FOV)
		})
	}
	/// Whether an actor in the cell is detected
	pub fn is_actor_detected(&self, x: i32, y: i32) -> bool {
		self.check(x, y, |c| {
			c.current.contains(VisibilityKindSet::ACTOR_DETECTED)
		})
	}
	/// Whether an item in the cell is detected
	pub fn is_item_detected(&self, x: i32, y: i32) -> bool {
		self.check(x, y, |c| {
			c.current.contains(VisibilityKindSet::ITEM_DETECTED)
		})
	}
	/// Whether the layout of the cell is known through magic mapping
	pub fn is_magic_mapped(&self, x: i32, y: i32) -> bool {
		self.check(x, y, |c| c.magic_mapped)
	}
	/// Whether the cell has ever been seen
	pub fn is_revealed(&self, x: i32, y: i32) -> bool {
		self.check(x, y, |c| c.revealed)
	}
	/// Whether the cursor is on the cell
	pub fn is_cursor(&self, x: i32, y: i32) -> bool {
		self.check(x, y, |c| c.cursor)
	}
	/// Whether the cell is highlighted
	pub fn is_highlighted(&self, x: i32, y: i32) -> bool {
		self.check(x, y, |c| c.highlight)
	}
	/// Whether the cell is permanently visible
	pub fn is_always_visible(&self, x: i32, y: i32) -> bool {
		self.check(x, y, |c| c.always_visible)
	}
	/// Whether the cell went from seen to unseen, or the reverse, during the last update
	pub fn fov_changed(&self, x: i32, y: i32) -> bool {
		self.check(x, y, |c| {
			c.is_any_kind_of_visible() != c.was_any_kind_of_visible()
		})
	}
}

/// Edit applied by the always visible operations
fn make_always_visible(cell: &mut CellVisibility) {
	cell.always_visible = true;
	cell.revealed = true;
	cell.current.insert(VisibilityKindSet::VISIBLE);
}

/// State reported to the callback after a direct edit, a magic mapped cell has something to
/// show even when nothing is sensed in it
fn notify_state(cell: &CellVisibility) -> bool {
	cell.is_sensed() || cell.magic_mapped
}

#[rustfmt::skip]
#[cfg(test)]
mod tests {
	use std::{cell::RefCell, rc::Rc};

	use super::*;

	/// Site built from rows of `#` (blocks vision) and `.` (open), `d` is open but dark
	struct TestSite {
		/// Cells which block vision
		walls: Grid<bool>,
		/// Cells without light
		dark: Grid<bool>,
		/// Extra sight sources
		viewports: Vec<Viewport>,
	}

	impl TestSite {
		/// Parse the rows
		fn new(rows: &[&str]) -> Self {
			let width = rows[0].len();
			let height = rows.len();
			let at = |x: i32, y: i32| rows[y as usize].as_bytes()[x as usize];
			TestSite {
				walls: Grid::from_fn(width, height, |x, y| at(x, y) == b'#'),
				dark: Grid::from_fn(width, height, |x, y| at(x, y) == b'd'),
				viewports: Vec::new(),
			}
		}
	}

	impl FovSite for TestSite {
		fn get_width(&self) -> usize {
			self.walls.get_width()
		}
		fn get_height(&self) -> usize {
			self.walls.get_height()
		}
		fn blocks_vision(&self, x: i32, y: i32) -> bool {
			self.walls.get_or(x, y, true)
		}
		fn for_each_viewport(&self, f: &mut dyn FnMut(Viewport)) {
			for viewport in self.viewports.iter() {
				f(*viewport);
			}
		}
		fn has_visible_light(&self, x: i32, y: i32) -> bool {
			!self.dark.get_or(x, y, false)
		}
	}

	/// Callback recording every call
	fn recorder() -> (Rc<RefCell<Vec<(i32, i32, bool)>>>, impl FnMut(i32, i32, bool)) {
		let calls = Rc::new(RefCell::new(Vec::new()));
		let sink = calls.clone();
		(calls, move |x, y, v| sink.borrow_mut().push((x, y, v)))
	}

	/// Subject standing still
	struct Watcher {
		/// Where it stands
		position: (i32, i32),
		/// How far it sees
		vision: u32,
	}

	impl FovSubject for Watcher {
		fn get_position(&self) -> (i32, i32) {
			self.position
		}
		fn get_vision_distance(&self) -> u32 {
			self.vision
		}
	}

	#[test]
	fn first_update_reveals_what_is_seen() {
		let site = TestSite::new(&[
			".....",
			".....",
			".....",
		]);
		let (calls, callback) = recorder();
		let mut tracker = VisibilityTracker::new(site, TrackerOptions::default()).with_callback(callback);
		assert!(tracker.update_at(2, 1, None));
		assert_eq!(15, calls.borrow().len());
		assert!(calls.borrow().iter().all(|(_, _, v)| *v));
		assert!(tracker.is_revealed(0, 0));
		assert!(tracker.is_directly_visible(4, 2));
	}
	#[test]
	fn steady_state_is_quiet() {
		let site = TestSite::new(&[
			".....",
			".....",
		]);
		let (calls, callback) = recorder();
		let mut tracker = VisibilityTracker::new(site, TrackerOptions::default()).with_callback(callback);
		tracker.update_at(0, 0, None);
		calls.borrow_mut().clear();
		assert!(!tracker.update_at(0, 0, None));
		assert!(!tracker.is_changed());
		assert!(calls.borrow().is_empty());
	}
	#[test]
	fn dark_cells_are_in_fov_but_not_visible() {
		let site = TestSite::new(&[
			"..d..",
		]);
		let mut tracker = VisibilityTracker::new(site, TrackerOptions::default());
		tracker.update_at(0, 0, None);
		assert!(tracker.is_in_fov(2, 0));
		assert!(!tracker.is_visible(2, 0));
		assert!(!tracker.is_revealed(2, 0));
		assert!(tracker.is_visible(4, 0));
	}
	#[test]
	fn moving_away_hides_and_remembers() {
		let site = TestSite::new(&[
			"..#..",
		]);
		let (calls, callback) = recorder();
		let mut tracker = VisibilityTracker::new(site, TrackerOptions::default()).with_callback(callback);
		tracker.update_at(0, 0, None);
		assert!(tracker.is_visible(1, 0));
		assert!(!tracker.is_visible(3, 0));
		calls.borrow_mut().clear();
		tracker.update_at(4, 0, None);
		assert!(!tracker.is_visible(0, 0));
		assert!(tracker.is_revealed(0, 0));
		assert!(tracker.fov_changed(0, 0));
		assert!(!tracker.fov_changed(2, 0));
		let calls = calls.borrow();
		assert!(calls.contains(&(0, 0, false)));
		assert!(calls.contains(&(3, 0, true)));
		assert!(!calls.iter().any(|(x, _, _)| *x == 2));
	}
	#[test]
	fn viewports_grant_their_kind() {
		let mut site = TestSite::new(&[
			".....#.....",
		]);
		site.viewports.push(Viewport { x: 9, y: 0, radius: 1, kind: VisibilityKind::Clairvoyant });
		site.viewports.push(Viewport { x: 6, y: 0, radius: 0, kind: VisibilityKind::ActorDetected });
		let mut tracker = VisibilityTracker::new(site, TrackerOptions::default());
		tracker.update_at(0, 0, Some(3));
		assert!(tracker.is_clairvoyant_visible(8, 0));
		assert!(tracker.is_clairvoyant_visible(10, 0));
		assert!(!tracker.is_clairvoyant_visible(7, 0));
		assert!(tracker.is_actor_detected(6, 0));
		assert!(!tracker.is_any_kind_of_visible(6, 0));
		assert!(tracker.is_revealed(9, 0));
		assert!(!tracker.is_revealed(6, 0));
		assert!(!tracker.is_visible(4, 0));
	}
	#[test]
	fn always_visible_cells_stay_visible() {
		let site = TestSite::new(&[
			"..#..",
		]);
		let mut tracker = VisibilityTracker::new(site, TrackerOptions::default());
		tracker.make_cell_always_visible(4, 0);
		tracker.update_at(0, 0, None);
		assert!(tracker.is_visible(4, 0));
		assert!(!tracker.is_in_fov(4, 0));
		assert!(!tracker.is_directly_visible(4, 0));
		assert!(tracker.flags(4, 0).contains(FovFlags::ALWAYS_VISIBLE | FovFlags::VISIBLE));
	}
	#[test]
	fn visible_option_makes_everything_visible() {
		let site = TestSite::new(&[
			"#####",
		]);
		let tracker = VisibilityTracker::new(site, TrackerOptions { visible: true, ..Default::default() });
		assert!(tracker.is_visible(3, 0));
		assert!(tracker.is_revealed(3, 0));
		assert!(tracker.is_always_visible(3, 0));
	}
	#[test]
	fn update_without_subject_does_nothing() {
		let site = TestSite::new(&["..."]);
		let mut tracker = VisibilityTracker::new(site, TrackerOptions::default());
		assert!(!tracker.update());
		assert!(!tracker.is_visible(0, 0));
		tracker.set_follow(Some(Box::new(Watcher { position: (0, 0), vision: 1 })));
		assert!(tracker.update());
		assert!(tracker.is_visible(1, 0));
		assert!(!tracker.is_visible(2, 0));
	}
	#[test]
	fn update_for_subject() {
		let site = TestSite::new(&["....."]);
		let mut tracker = VisibilityTracker::new(site, TrackerOptions::default());
		tracker.update_for(&Watcher { position: (4, 0), vision: 2 });
		assert!(tracker.is_visible(2, 0));
		assert!(!tracker.is_visible(1, 0));
	}
	#[test]
	fn reveal_single_cell() {
		let site = TestSite::new(&["....."]);
		let (calls, callback) = recorder();
		let mut tracker = VisibilityTracker::new(site, TrackerOptions::default()).with_callback(callback);
		tracker.reveal_cell(3, 0, 0, false);
		assert!(tracker.is_revealed(3, 0));
		assert!(!tracker.is_visible(3, 0));
		assert_eq!(vec![(3, 0, false)], *calls.borrow());
		tracker.reveal_cell(1, 0, 0, true);
		assert!(tracker.is_visible(1, 0));
		assert_eq!((1, 0, true), calls.borrow()[1]);
	}
	#[test]
	fn reveal_area_respects_walls() {
		let site = TestSite::new(&[".#..."]);
		let mut tracker = VisibilityTracker::new(site, TrackerOptions::default());
		tracker.reveal_cell(0, 0, 3, false);
		assert!(tracker.is_revealed(1, 0));
		assert!(!tracker.is_revealed(2, 0));
	}
	#[test]
	fn reveal_out_of_range_is_ignored() {
		let site = TestSite::new(&["..."]);
		let (calls, callback) = recorder();
		let mut tracker = VisibilityTracker::new(site, TrackerOptions::default()).with_callback(callback);
		tracker.reveal_cell(5, 5, 2, true);
		assert!(calls.borrow().is_empty());
		assert!(!tracker.is_revealed(5, 5));
	}
	#[test]
	fn hide_forgets_a_cell() {
		let site = TestSite::new(&["..."]);
		let (calls, callback) = recorder();
		let mut tracker = VisibilityTracker::new(site, TrackerOptions::default()).with_callback(callback);
		tracker.update_at(0, 0, None);
		tracker.magic_map_cell(2, 0);
		calls.borrow_mut().clear();
		tracker.hide_cell(2, 0);
		assert!(!tracker.is_visible(2, 0));
		assert!(!tracker.is_revealed(2, 0));
		assert!(!tracker.is_magic_mapped(2, 0));
		assert_eq!(vec![(2, 0, false)], *calls.borrow());
	}
	#[test]
	fn magic_mapping_notifies() {
		let site = TestSite::new(&["..."]);
		let (calls, callback) = recorder();
		let mut tracker = VisibilityTracker::new(site, TrackerOptions::default()).with_callback(callback);
		tracker.magic_map_cell(1, 0);
		assert!(tracker.is_magic_mapped(1, 0));
		assert!(!tracker.is_revealed(1, 0));
		assert_eq!(vec![(1, 0, true)], *calls.borrow());
	}
	#[test]
	fn cursor_moves() {
		let site = TestSite::new(&["....."]);
		let (calls, callback) = recorder();
		let mut tracker = VisibilityTracker::new(site, TrackerOptions::default()).with_callback(callback);
		tracker.set_cursor(1, 0, false);
		tracker.set_cursor(3, 0, false);
		assert!(!tracker.is_cursor(1, 0));
		assert!(tracker.is_cursor(3, 0));
		tracker.set_cursor(4, 0, true);
		assert!(tracker.is_cursor(3, 0));
		assert!(tracker.flags(4, 0).contains(FovFlags::IS_CURSOR));
		assert_eq!(4, calls.borrow().len());
		tracker.clear_cursor();
		assert!(!tracker.is_cursor(3, 0));
		assert!(!tracker.is_cursor(4, 0));
		assert_eq!(6, calls.borrow().len());
	}
	#[test]
	fn highlights() {
		let site = TestSite::new(&["....."]);
		let mut tracker = VisibilityTracker::new(site, TrackerOptions::default());
		tracker.set_highlight(0, 0, false);
		tracker.set_highlight(2, 0, true);
		assert!(tracker.is_highlighted(0, 0));
		tracker.clear_highlight_at(0, 0);
		assert!(!tracker.is_highlighted(0, 0));
		assert!(tracker.is_highlighted(2, 0));
		tracker.clear_highlight();
		assert!(!tracker.is_highlighted(2, 0));
	}
	#[test]
	fn edits_without_effect_are_quiet() {
		let site = TestSite::new(&[
			".....",
			".....",
			".....",
			".....",
			".....",
		]);
		let (calls, callback) = recorder();
		let mut tracker = VisibilityTracker::new(site, TrackerOptions::default()).with_callback(callback);
		tracker.update_at(2, 2, None);
		tracker.update_at(2, 2, None);
		calls.borrow_mut().clear();
		tracker.clear_cursor_at(1, 1);
		tracker.clear_highlight_at(1, 1);
		tracker.clear_cursor();
		assert!(calls.borrow().is_empty());
		assert!(!tracker.is_changed());
		tracker.magic_map_cell(3, 3);
		tracker.magic_map_cell(3, 3);
		assert_eq!(vec![(3, 3, true)], *calls.borrow());
		assert!(tracker.is_changed());
		calls.borrow_mut().clear();
		tracker.reset();
		assert_eq!(25, calls.borrow().len());
		assert!(calls.borrow().iter().all(|(_, _, v)| !*v));
		calls.borrow_mut().clear();
		tracker.reset();
		assert!(calls.borrow().is_empty());
	}
	#[test]
	fn clear_cursor_on_one_cell() {
		let site = TestSite::new(&["....."]);
		let (calls, callback) = recorder();
		let mut tracker = VisibilityTracker::new(site, TrackerOptions::default()).with_callback(callback);
		tracker.set_cursor(1, 0, false);
		tracker.set_cursor(3, 0, true);
		calls.borrow_mut().clear();
		tracker.clear_cursor_at(1, 0);
		assert!(!tracker.is_cursor(1, 0));
		assert!(tracker.is_cursor(3, 0));
		assert_eq!(vec![(1, 0, false)], *calls.borrow());
		tracker.clear_cursor_at(9, 9);
		assert_eq!(1, calls.borrow().len());
	}
	#[test]
	fn replace_the_callback() {
		let site = TestSite::new(&["..."]);
		let (first, callback) = recorder();
		let mut tracker = VisibilityTracker::new(site, TrackerOptions::default()).with_callback(callback);
		tracker.magic_map_cell(0, 0);
		let (second, callback) = recorder();
		tracker.set_callback(Some(Box::new(callback)));
		tracker.magic_map_cell(1, 0);
		assert_eq!(vec![(0, 0, true)], *first.borrow());
		assert_eq!(vec![(1, 0, true)], *second.borrow());
		tracker.set_callback(None);
		tracker.magic_map_cell(2, 0);
		assert!(tracker.is_magic_mapped(2, 0));
		assert_eq!(1, first.borrow().len());
		assert_eq!(1, second.borrow().len());
	}
	#[test]
	fn update_without_subject_clears_changed() {
		let site = TestSite::new(&["..."]);
		let mut tracker = VisibilityTracker::new(site, TrackerOptions::default());
		assert!(tracker.update_at(0, 0, None));
		assert!(tracker.is_changed());
		assert!(!tracker.update());
		assert!(!tracker.is_changed());
		assert!(tracker.is_visible(2, 0));
	}
	#[test]
	fn reset_forgets_everything() {
		let site = TestSite::new(&["..."]);
		let mut tracker = VisibilityTracker::new(site, TrackerOptions { revealed: true, ..Default::default() });
		assert!(tracker.is_revealed(2, 0));
		tracker.update_at(0, 0, None);
		tracker.reset();
		assert!(!tracker.is_revealed(2, 0));
		assert!(!tracker.is_visible(0, 0));
		assert!(tracker.is_changed());
	}
	#[test]
	fn reveal_all_cells() {
		let site = TestSite::new(&["#.#", "..."]);
		let mut tracker = VisibilityTracker::new(site, TrackerOptions::default());
		tracker.reveal_all(false);
		assert!(tracker.get_cells().get_cells().iter().all(|c| c.revealed));
		assert!(!tracker.is_visible(0, 0));
	}
	#[test]
	fn out_of_range_queries_are_false() {
		let site = TestSite::new(&["..."]);
		let mut tracker = VisibilityTracker::new(site, TrackerOptions { visible: true, ..Default::default() });
		tracker.update_at(0, 0, None);
		assert!(!tracker.is_visible(-1, 0));
		assert!(!tracker.is_revealed(3, 0));
		assert!(!tracker.is_in_fov(0, 1));
		assert_eq!(FovFlags::empty(), tracker.flags(9, 9));
		assert_eq!(None, tracker.get_cell(0, -1));
	}
}
