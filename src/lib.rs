//! Field-of-view, visibility tracking and distance field pathing for tile grids
//!

pub mod error;
pub mod fov;
pub mod grid;
pub mod paths;

pub mod prelude;
