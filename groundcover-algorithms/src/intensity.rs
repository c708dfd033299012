use groundcover_core::{cloud::PointCloud, nalgebra::Vector3, state::PointFlag, Error, Result};
use log::{debug, info};
use rayon::prelude::*;

use crate::spatial::SpatialIndex;

/// Grayscale intensity of each point, the mean of its three color channels
pub const INTENSITY_LAYER: &str = "intensity";
/// Mean intensity over the k-neighbourhood of each point
pub const NEIGHBOURHOOD_INTENSITY_LAYER: &str = "neighbourhood intensity";

/// Parameters of the neighbourhood intensity selection
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntensityOptions {
    /// Number of nearest neighbours to inspect per point, the point itself included. Must be at least 3
    pub neighbours: usize,
    /// Exclusive lower bound of accepted neighbour intensities
    pub min: u8,
    /// Exclusive upper bound of accepted neighbour intensities
    pub max: u8,
}

impl Default for IntensityOptions {
    fn default() -> Self {
        Self {
            neighbours: 10,
            min: 0,
            max: 255,
        }
    }
}

impl IntensityOptions {
    pub fn validate(&self) -> Result<()> {
        if self.neighbours < 3 {
            return Err(Error::configuration(format!(
                "Number of neighbours must be at least 3, got {}",
                self.neighbours
            )));
        }
        Ok(())
    }

    fn accepts(&self, intensity: f64) -> bool {
        intensity > self.min as f64 && intensity < self.max as f64
    }
}

/// Grayscale intensity of a single color
pub fn intensity_of(color: &Vector3<u8>) -> f64 {
    (color.x as f64 + color.y as f64 + color.z as f64) / 3.0
}

/// Computes the intensity of every point and stores it in the [`INTENSITY_LAYER`]. Returns the computed values
pub fn compute_intensity_layer(cloud: &mut PointCloud) -> Result<Vec<f64>> {
    let intensities = cloud.colors().iter().map(intensity_of).collect::<Vec<_>>();
    cloud.store_layer(INTENSITY_LAYER, &intensities)?;
    Ok(intensities)
}

/// Result of evaluating the neighbourhood of one point
struct NeighbourhoodResult {
    selected: bool,
    mean_intensity: f64,
}

fn evaluate_neighbourhood(
    center: &Vector3<f64>,
    index: &SpatialIndex,
    intensities: &[f64],
    options: &IntensityOptions,
) -> NeighbourhoodResult {
    let neighbours = index.nearest_k(center, options.neighbours);
    let mut selected = false;
    let mut sum = 0.0;
    for &neighbour in &neighbours {
        let intensity = intensities[neighbour];
        sum += intensity;
        selected |= options.accepts(intensity);
    }
    let mean_intensity = if neighbours.is_empty() {
        0.0
    } else {
        sum / neighbours.len() as f64
    };
    NeighbourhoodResult {
        selected,
        mean_intensity,
    }
}

/// Validates the options and the index and computes the intensity layer. Returns `None` for an empty cloud
fn prepare(
    cloud: &mut PointCloud,
    index: &SpatialIndex,
    options: &IntensityOptions,
) -> Result<Option<Vec<f64>>> {
    options.validate()?;
    if index.len() != cloud.len() {
        return Err(Error::configuration(format!(
            "Spatial index holds {} points but cloud '{}' has {}",
            index.len(),
            cloud.name(),
            cloud.len()
        )));
    }
    if cloud.is_empty() {
        debug!("Cloud '{}' is empty, nothing to select", cloud.name());
        return Ok(None);
    }
    compute_intensity_layer(cloud).map(Some)
}

/// Writes the per-point results back into the cloud: the selection flags and the neighbourhood intensity layer
fn apply(cloud: &mut PointCloud, results: &[NeighbourhoodResult]) -> Result<usize> {
    let means = results.iter().map(|r| r.mean_intensity).collect::<Vec<_>>();
    cloud.store_layer(NEIGHBOURHOOD_INTENSITY_LAYER, &means)?;

    let mut selected_count = 0;
    for (state, result) in cloud.states_mut().iter_mut().zip(results) {
        state.set(PointFlag::Selected, result.selected);
        if result.selected {
            selected_count += 1;
        }
    }
    info!(
        "{} points with neighbourhood intensity in range were selected in '{}'",
        selected_count,
        cloud.name()
    );
    Ok(selected_count)
}

/// Selects every point of `cloud` that has at least one of its `options.neighbours` nearest neighbours (possibly
/// itself) with an intensity strictly between `options.min` and `options.max`. The `Selected` flag of all other
/// points is cleared, all other flags are kept. As a side product the layers [`INTENSITY_LAYER`] and
/// [`NEIGHBOURHOOD_INTENSITY_LAYER`] are written.
///
/// `index` must have been built from the positions of `cloud`. Returns the number of selected points.
///
/// # Examples
///
/// ```
/// # use groundcover_core::{cloud::PointCloud, nalgebra::Vector3, state::PointFlag};
/// # use groundcover_algorithms::{intensity::*, spatial::SpatialIndex};
/// let positions = (0..6).map(|i| Vector3::new(i as f64, 0.0, 0.0)).collect();
/// let colors = vec![
///     Vector3::new(10, 10, 10),
///     Vector3::new(10, 10, 10),
///     Vector3::new(10, 10, 10),
///     Vector3::new(200, 200, 200),
///     Vector3::new(200, 200, 200),
///     Vector3::new(200, 200, 200),
/// ];
/// let mut cloud = PointCloud::from_points("scan", positions, colors).unwrap();
/// let index = SpatialIndex::build(&cloud);
/// let options = IntensityOptions { neighbours: 3, min: 100, max: 255 };
///
/// let selected = select_by_neighbourhood_intensity(&mut cloud, &index, &options).unwrap();
/// assert_eq!(selected, 4);
/// assert_eq!(cloud.indices_with_flag(PointFlag::Selected), vec![2, 3, 4, 5]);
/// ```
pub fn select_by_neighbourhood_intensity(
    cloud: &mut PointCloud,
    index: &SpatialIndex,
    options: &IntensityOptions,
) -> Result<usize> {
    let intensities = match prepare(cloud, index, options)? {
        Some(intensities) => intensities,
        None => return Ok(0),
    };
    let results = cloud
        .positions()
        .iter()
        .map(|center| evaluate_neighbourhood(center, index, &intensities, options))
        .collect::<Vec<_>>();
    apply(cloud, &results)
}

/// Parallel version of [`select_by_neighbourhood_intensity`]. The neighbourhood queries run in parallel using the
/// [`rayon`] crate, the results are written back afterwards. Selection and layers are identical to the serial version
pub fn select_by_neighbourhood_intensity_par(
    cloud: &mut PointCloud,
    index: &SpatialIndex,
    options: &IntensityOptions,
) -> Result<usize> {
    let intensities = match prepare(cloud, index, options)? {
        Some(intensities) => intensities,
        None => return Ok(0),
    };
    let results = cloud
        .positions()
        .par_iter()
        .map(|center| evaluate_neighbourhood(center, index, &intensities, options))
        .collect::<Vec<_>>();
    apply(cloud, &results)
}
