#![warn(clippy::all)]

//! Core data structures for ground-cover classification of colored point clouds
//!
//! A [PointCloud](crate::cloud::PointCloud) stores positions, RGB colors, per-point
//! [state flags](crate::state::PointState) and any number of named scalar [layers](crate::layers::LayerStore).
//! Clouds live in a [Project](crate::project::Project), which resolves the targets of the classification methods
//! and keeps derived clouds attached to their source.

pub extern crate nalgebra;

/// The in-memory point cloud
pub mod cloud;
/// Error type of all groundcover crates
pub mod error;
/// Named per-point scalar layers
pub mod layers;
/// Useful mathematical tools when working with point cloud data
pub mod math;
/// Tree of clouds owned by a session
pub mod project;
/// Per-point state flags
pub mod state;

pub use error::{Error, Result};
