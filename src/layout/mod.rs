//! Layout derivation: everything computed from the viewport and dataset
//! rather than integrated tick by tick.
//!
//! Statistics and adaptive parameters are recomputed on every viewport
//! change. Sector allocation and seeding run once per (re)initialization.

pub mod params;
pub mod sectors;
pub mod seed;
pub mod stats;

pub use params::{PhysicsParams, adapt_params};
pub use sectors::{Sector, SectorMap, allocate_sectors};
pub use seed::{SeedPoint, SeedRequest, seed_position};
pub use stats::{ViewportStats, compute_stats};
