//! `use sightline_tiles::prelude::*;` to import common structures and methods
//!

#[doc(hidden)]
pub use crate::{
	error::*,
	fov::{flags::*, shadowcast::*, tracker::*, *},
	grid::{pool::*, utilities::*, *},
	paths::{dijkstra::*, path::*},
};
