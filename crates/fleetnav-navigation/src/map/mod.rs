//! Occupancy mapping.
//!
//! This module provides the binary obstacle grid, the morphology used to
//! denoise it, and the mapper that builds a global grid from per-region
//! point samples.

pub mod mapper;
pub mod morphology;
pub mod occupancy;
pub mod point_types;

pub use mapper::{MapLayers, RegionSamples, build_map};
pub use occupancy::{FREE, OCCUPIED, OccupancyGrid};
pub use point_types::GridPoint;
