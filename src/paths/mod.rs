//! Distance fields and the paths walked down them.
//!
//! A field is built once per goal (or goal set) with a [dijkstra::DijkstraMap] and can then
//! answer any number of path queries cheaply through [path::get_path]. [path::Pathfinder]
//! bundles the two with pooled scratch grids for one-off queries.
//!
//! Movement costs and sight are configured separately. A field steps diagonally for
//! `1 + DIAGONAL_SURCHARGE`, which matches the default octile [crate::prelude::RadiusMetric] of
//! the field-of-view, and a field refuses to cut past the corner of an
//! [dijkstra::OBSTRUCTION] whereas sight may peek past it.
//!

pub mod dijkstra;
pub mod path;
