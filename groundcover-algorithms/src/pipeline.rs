use groundcover_core::{cloud::PointCloud, Error, Result};
use log::{debug, info};

use crate::{
    area::{estimate_areas, log_areas, AreaCounts, AreaRatios},
    classification::{classify_cloud, mean_height, ClassificationSummary, ClassificationThresholds},
    hsl::compute_hsl_layers,
    plane_fit::compute_plane_fit_layer,
    simplification::simplify_homogeneous,
};

/// Name of the simplified copy that [`detect_ground_cover`] creates
pub const SIMPLIFIED_CLOUD_NAME: &str = "Simplified cloud";

/// The point cloud algorithms the ground-cover pipeline depends on. All calls are synchronous and work in place
pub trait CloudProcessor {
    /// Hides points (clears their `Visible` flag) until the visible points have a quasi-uniform spacing of at least
    /// `min_distance`
    fn simplify(&self, cloud: &mut PointCloud, min_distance: f64) -> Result<()>;
    /// Writes the layers `H`, `S` and `L`
    fn color_to_hsl(&self, cloud: &mut PointCloud) -> Result<()>;
    /// Writes the layer `plane_fitting_err`
    fn plane_fit_residual(&self, cloud: &mut PointCloud, radius: f64) -> Result<()>;
}

/// [`CloudProcessor`] backed by the algorithms of this crate
#[derive(Debug, Default, Copy, Clone)]
pub struct NativeProcessor;

impl CloudProcessor for NativeProcessor {
    fn simplify(&self, cloud: &mut PointCloud, min_distance: f64) -> Result<()> {
        simplify_homogeneous(cloud, min_distance).map(|_| ())
    }

    fn color_to_hsl(&self, cloud: &mut PointCloud) -> Result<()> {
        compute_hsl_layers(cloud)
    }

    fn plane_fit_residual(&self, cloud: &mut PointCloud, radius: f64) -> Result<()> {
        compute_plane_fit_layer(cloud, radius)
    }
}

/// Parameters of [`detect_ground_cover`]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GroundCoverOptions {
    /// Minimal distance between the points of the simplified cloud
    pub min_distance: f64,
    /// Radius of the neighbourhood used for the plane fit residual
    pub plane_fit_radius: f64,
    pub thresholds: ClassificationThresholds,
}

impl Default for GroundCoverOptions {
    fn default() -> Self {
        Self {
            min_distance: 0.1,
            plane_fit_radius: 1.0,
            thresholds: Default::default(),
        }
    }
}

impl GroundCoverOptions {
    pub fn validate(&self) -> Result<()> {
        if self.min_distance <= 0.0 || !self.min_distance.is_finite() {
            return Err(Error::configuration(format!(
                "Minimal distance must be a positive number, got {}",
                self.min_distance
            )));
        }
        if self.plane_fit_radius <= 0.0 || !self.plane_fit_radius.is_finite() {
            return Err(Error::configuration(format!(
                "Plane fitting radius must be a positive number, got {}",
                self.plane_fit_radius
            )));
        }
        Ok(())
    }
}

/// Everything a ground-cover run produced besides the layers and flags it wrote into the source cloud
#[derive(Debug, Clone)]
pub struct GroundCoverRun {
    /// The classified, simplified copy of the source cloud
    pub simplified: PointCloud,
    pub mean_height: f64,
    /// Classification of the full resolution cloud
    pub full_summary: ClassificationSummary,
    /// Classification of the simplified cloud, hidden points included
    pub simplified_summary: ClassificationSummary,
    /// Visible point counts of the simplified cloud
    pub counts: AreaCounts,
    pub ratios: AreaRatios,
}

/// Classifies `cloud` into snow, vegetation and road and estimates the share of each category of the covered area.
///
/// A simplified copy of `cloud` is created and thinned out to `options.min_distance`, so that the area estimate
/// does not depend on the local point density. Both clouds receive the layers `H`, `S`, `L`, `plane_fitting_err`,
/// `z value` and `features` and the category flags. The road height rule of both clouds uses the mean height of
/// the full resolution cloud. Areas are estimated over the visible points of the simplified cloud.
///
/// Options are validated before anything is modified. A failing processor aborts the run; layers written up to
/// that point remain in `cloud`.
pub fn detect_ground_cover<P: CloudProcessor + ?Sized>(
    cloud: &mut PointCloud,
    processor: &P,
    options: &GroundCoverOptions,
) -> Result<GroundCoverRun> {
    options.validate()?;
    if cloud.is_empty() {
        return Err(Error::configuration(format!(
            "Cloud '{}' has no points",
            cloud.name()
        )));
    }

    let mut simplified = cloud.derive(SIMPLIFIED_CLOUD_NAME);
    debug!(
        "Simplifying '{}' with minimal distance {}",
        cloud.name(),
        options.min_distance
    );
    processor.simplify(&mut simplified, options.min_distance)?;

    debug!("Converting colors to HSL");
    processor.color_to_hsl(&mut simplified)?;
    processor.color_to_hsl(cloud)?;

    debug!(
        "Computing plane fit residuals with radius {}",
        options.plane_fit_radius
    );
    processor.plane_fit_residual(cloud, options.plane_fit_radius)?;
    processor.plane_fit_residual(&mut simplified, options.plane_fit_radius)?;

    let mean_height = mean_height(cloud)?;
    debug!("Mean height of '{}': {}", cloud.name(), mean_height);
    let full_summary = classify_cloud(cloud, mean_height, &options.thresholds)?;
    let simplified_summary = classify_cloud(&mut simplified, mean_height, &options.thresholds)?;

    let counts = estimate_areas(simplified.states());
    let ratios = counts.ratios();
    info!("Area estimation for '{}'", cloud.name());
    log_areas(&counts, &ratios);

    Ok(GroundCoverRun {
        simplified,
        mean_height,
        full_summary,
        simplified_summary,
        counts,
        ratios,
    })
}
