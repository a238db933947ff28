//! Spatial indexing for the force set.
//!
//! - `rtree`: rstar-backed broad phase for collision relaxation
//! - `quadtree`: Barnes-Hut tree for approximated many-body repulsion

pub mod quadtree;
mod rtree;

pub use quadtree::{MassPoint, Quadtree};
pub use rtree::{Body, CollisionIndex};
