#![warn(clippy::all)]
//! Algorithms that classify colored point clouds into ground-cover categories.
//!
//! The central entry point is [`pipeline::detect_ground_cover`], which derives HSL, plane fit and height features,
//! classifies every point into snow, vegetation or road and estimates the area share of each category over a
//! simplified copy of the cloud. The color and intensity based selections work on their own.

// Estimation of the share of each ground-cover category over the visible points of a cloud.
pub mod area;
// Rule based classification of points into snow, vegetation and road.
pub mod classification;
// Selection of points by a range over their RGB color.
pub mod color_filter;
// Conversion of point colors into hue, saturation and lightness layers.
pub mod hsl;
// Grayscale intensity and the selection of points by the intensity of their k nearest neighbours.
pub mod intensity;
// Methods that run on the clouds of a project, with parameter validation before any mutation.
pub mod methods;
// The full ground-cover pipeline and the processor seam of the algorithms it calls.
pub mod pipeline;
// Residual of a least squares plane fit over the spherical neighbourhood of each point.
pub mod plane_fit;
// Homogeneous simplification that hides points closer than a minimal distance.
pub mod simplification;
// kd-tree backed nearest neighbour and radius queries.
pub mod spatial;
