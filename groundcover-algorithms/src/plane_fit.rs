// The covariance based plane fit follows the normal estimation of the PCL library (https://pointclouds.org/)
use groundcover_core::{
    cloud::PointCloud,
    nalgebra::{Matrix3, Vector3},
    Error, Result,
};
use log::debug;

use crate::spatial::SpatialIndex;

/// Per-point residual of the best-fit plane through the spherical neighbourhood of the point
pub const PLANE_FIT_ERROR_LAYER: &str = "plane_fitting_err";

/// Root mean square of the orthogonal distances of `points` to their best-fit (least squares) plane. This is the
/// square root of the smallest eigenvalue of the covariance matrix of the points. Fewer than 3 points do not define
/// a plane and have a residual of `0.0`.
///
/// # Examples
///
/// ```
/// # use groundcover_core::nalgebra::Vector3;
/// # use groundcover_algorithms::plane_fit::plane_fit_residual;
/// let flat = vec![
///     Vector3::new(0.0, 0.0, 1.0),
///     Vector3::new(1.0, 0.0, 1.0),
///     Vector3::new(0.0, 1.0, 1.0),
///     Vector3::new(1.0, 1.0, 1.0),
/// ];
/// assert!(plane_fit_residual(&flat) < 1e-9);
/// ```
pub fn plane_fit_residual(points: &[Vector3<f64>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let count = points.len() as f64;
    let centroid = points.iter().fold(Vector3::<f64>::zeros(), |sum, p| sum + p) / count;

    let mut covariance = Matrix3::<f64>::zeros();
    for point in points {
        let centered = point - centroid;
        covariance += centered * centered.transpose();
    }
    covariance /= count;

    let smallest_eigenvalue = covariance.symmetric_eigen().eigenvalues.min();
    // Rounding may push the eigenvalue of a perfect plane slightly below zero
    smallest_eigenvalue.max(0.0).sqrt()
}

/// Computes the plane fit residual of the neighbourhood within `radius` around every point of `cloud` and writes it
/// into the [`PLANE_FIT_ERROR_LAYER`]. The neighbourhood of a point includes the point itself.
pub fn compute_plane_fit_layer(cloud: &mut PointCloud, radius: f64) -> Result<()> {
    if radius <= 0.0 || !radius.is_finite() {
        return Err(Error::configuration(format!(
            "Plane fitting radius must be a positive number, got {}",
            radius
        )));
    }
    let index = SpatialIndex::build(cloud);
    let positions = cloud.positions();
    let mut neighbourhood = Vec::new();
    let residuals = positions
        .iter()
        .map(|center| {
            neighbourhood.clear();
            neighbourhood.extend(
                index
                    .within_radius(center, radius)
                    .into_iter()
                    .map(|neighbour| positions[neighbour]),
            );
            plane_fit_residual(&neighbourhood)
        })
        .collect::<Vec<_>>();

    debug!(
        "Computed plane fit residuals for {} points of '{}' with radius {}",
        residuals.len(),
        cloud.name(),
        radius
    );
    cloud.store_layer(PLANE_FIT_ERROR_LAYER, &residuals)?;
    Ok(())
}
