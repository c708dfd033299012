use std::fmt;

use groundcover_core::{
    cloud::PointCloud,
    state::{PointFlag, PointState},
    Error, Result,
};
use log::{debug, info};

use crate::{
    hsl::{HUE_LAYER, LIGHTNESS_LAYER},
    plane_fit::PLANE_FIT_ERROR_LAYER,
};

/// Raw z coordinate of each point
pub const HEIGHT_LAYER: &str = "z value";
/// Combined ground-cover category of each point, see [`GroundCover::feature_value`]
pub const FEATURES_LAYER: &str = "features";

/// The ground-cover categories a point can be classified as
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GroundCover {
    Snow,
    Vegetation,
    Road,
    Unclassified,
}

impl GroundCover {
    /// The categories in descending priority
    pub const PRIORITY: [GroundCover; 3] = [GroundCover::Snow, GroundCover::Vegetation, GroundCover::Road];

    /// Value written to the [`FEATURES_LAYER`] for points of this category
    pub fn feature_value(self) -> f64 {
        match self {
            GroundCover::Snow => 300.0,
            GroundCover::Vegetation => 150.0,
            GroundCover::Road => 101.0,
            GroundCover::Unclassified => 0.0,
        }
    }

    /// The state flag that marks points of this category. Unclassified points carry no flag
    pub fn flag(self) -> Option<PointFlag> {
        match self {
            GroundCover::Snow => Some(PointFlag::Snow),
            GroundCover::Vegetation => Some(PointFlag::Vegetation),
            GroundCover::Road => Some(PointFlag::Road),
            GroundCover::Unclassified => None,
        }
    }

    /// The highest priority category whose flag is set on `state`
    pub fn of_state(state: &PointState) -> Self {
        Self::PRIORITY
            .iter()
            .copied()
            .find(|category| category.flag().map_or(false, |flag| state.is(flag)))
            .unwrap_or(GroundCover::Unclassified)
    }
}

impl fmt::Display for GroundCover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GroundCover::Snow => "snow",
            GroundCover::Vegetation => "vegetation",
            GroundCover::Road => "road",
            GroundCover::Unclassified => "unclassified",
        };
        f.write_str(name)
    }
}

/// The features of a single point that the classification rules look at
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointFeatures {
    /// Hue in degrees
    pub hue: f64,
    /// Lightness in `[0, 1]`
    pub lightness: f64,
    /// Raw z coordinate
    pub height: f64,
    pub plane_fit_error: f64,
}

/// Thresholds of the rule based classifier. The default values are the calibrated constants of the classifier
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClassificationThresholds {
    /// Points at least this light are snow
    pub snow_min_lightness: f64,
    /// Vegetation has a hue below this value
    pub vegetation_max_hue: f64,
    /// Roads have a hue of at least this value
    pub road_min_hue: f64,
    /// Inclusive lightness band shared by vegetation and roads
    pub min_lightness: f64,
    pub max_lightness: f64,
    /// Roads lie at most this far above the mean height of the cloud
    pub road_max_height_above_mean: f64,
    /// Roads are flat: their plane fit residual is below this value
    pub road_max_plane_fit_error: f64,
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self {
            snow_min_lightness: 0.7,
            vegetation_max_hue: 200.0,
            road_min_hue: 275.0,
            min_lightness: 0.2,
            max_lightness: 0.6,
            road_max_height_above_mean: 3.7,
            road_max_plane_fit_error: 0.065,
        }
    }
}

impl ClassificationThresholds {
    fn in_lightness_band(&self, lightness: f64) -> bool {
        lightness >= self.min_lightness && lightness <= self.max_lightness
    }

    pub fn is_snow(&self, point: &PointFeatures) -> bool {
        point.lightness >= self.snow_min_lightness
    }

    pub fn is_vegetation(&self, point: &PointFeatures) -> bool {
        point.hue < self.vegetation_max_hue && self.in_lightness_band(point.lightness)
    }

    pub fn is_road(&self, point: &PointFeatures, mean_height: f64) -> bool {
        point.hue >= self.road_min_hue
            && self.in_lightness_band(point.lightness)
            && point.height <= mean_height + self.road_max_height_above_mean
            && point.plane_fit_error < self.road_max_plane_fit_error
    }

    /// Evaluates all rules independently. Returns the matching categories in priority order, an empty result means
    /// the point is unclassified
    pub fn matching_categories(&self, point: &PointFeatures, mean_height: f64) -> Vec<GroundCover> {
        GroundCover::PRIORITY
            .iter()
            .copied()
            .filter(|category| match category {
                GroundCover::Snow => self.is_snow(point),
                GroundCover::Vegetation => self.is_vegetation(point),
                GroundCover::Road => self.is_road(point, mean_height),
                GroundCover::Unclassified => false,
            })
            .collect()
    }

    /// The category of a point with first-match priority snow, vegetation, road
    pub fn classify(&self, point: &PointFeatures, mean_height: f64) -> GroundCover {
        self.matching_categories(point, mean_height)
            .first()
            .copied()
            .unwrap_or(GroundCover::Unclassified)
    }
}

/// Number of points of one cloud per category. A point matching several rules counts once per matched rule,
/// `unclassified` counts the points that matched no rule
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ClassificationSummary {
    pub snow: usize,
    pub vegetation: usize,
    pub road: usize,
    pub unclassified: usize,
}

impl ClassificationSummary {
    pub fn count(&self, category: GroundCover) -> usize {
        match category {
            GroundCover::Snow => self.snow,
            GroundCover::Vegetation => self.vegetation,
            GroundCover::Road => self.road,
            GroundCover::Unclassified => self.unclassified,
        }
    }

    fn add(&mut self, category: GroundCover) {
        match category {
            GroundCover::Snow => self.snow += 1,
            GroundCover::Vegetation => self.vegetation += 1,
            GroundCover::Road => self.road += 1,
            GroundCover::Unclassified => self.unclassified += 1,
        }
    }
}

/// Arithmetic mean of the z coordinates of all points of `cloud`
pub fn mean_height(cloud: &PointCloud) -> Result<f64> {
    if cloud.is_empty() {
        return Err(Error::configuration(format!(
            "Mean height of the empty cloud '{}' is undefined",
            cloud.name()
        )));
    }
    let sum: f64 = cloud.positions().iter().map(|position| position.z).sum();
    Ok(sum / cloud.len() as f64)
}

/// Classifies every point of `cloud` into snow, vegetation and road using the layers `H`, `L` and
/// `plane_fitting_err`, which must exist. Every matched category sets its flag on the point. Category flags that
/// were set before are never cleared. Writes the raw heights to the [`HEIGHT_LAYER`] and, derived from the flags the
/// point carries afterwards, its combined category to the [`FEATURES_LAYER`].
///
/// `mean_height` is the reference for the road height rule. Pass the mean height of the full resolution cloud when
/// classifying a simplified copy of it.
pub fn classify_cloud(
    cloud: &mut PointCloud,
    mean_height: f64,
    thresholds: &ClassificationThresholds,
) -> Result<ClassificationSummary> {
    let hues = cloud.read_layer(HUE_LAYER)?.to_vec();
    let lightnesses = cloud.read_layer(LIGHTNESS_LAYER)?.to_vec();
    let plane_fit_errors = cloud.read_layer(PLANE_FIT_ERROR_LAYER)?.to_vec();
    let heights = cloud
        .positions()
        .iter()
        .map(|position| position.z)
        .collect::<Vec<_>>();
    cloud.store_layer(HEIGHT_LAYER, &heights)?;

    let mut summary = ClassificationSummary::default();
    let mut states = cloud.states().to_vec();
    let mut features = Vec::with_capacity(states.len());
    for (index, state) in states.iter_mut().enumerate() {
        let point = PointFeatures {
            hue: hues[index],
            lightness: lightnesses[index],
            height: heights[index],
            plane_fit_error: plane_fit_errors[index],
        };
        let categories = thresholds.matching_categories(&point, mean_height);
        for category in &categories {
            if let Some(flag) = category.flag() {
                state.insert(flag);
            }
            summary.add(*category);
        }
        if categories.is_empty() {
            summary.add(GroundCover::Unclassified);
        }
        features.push(GroundCover::of_state(state).feature_value());
    }

    cloud.store_layer(FEATURES_LAYER, &features)?;
    cloud.set_states(&states)?;

    debug!(
        "Classified '{}' against mean height {:.3}: {:?}",
        cloud.name(),
        mean_height,
        summary
    );
    info!(
        "'{}': {} snow, {} vegetation, {} road, {} unclassified points",
        cloud.name(),
        summary.snow,
        summary.vegetation,
        summary.road,
        summary.unclassified
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use groundcover_core::nalgebra::Vector3;

    fn features(hue: f64, lightness: f64, height: f64, plane_fit_error: f64) -> PointFeatures {
        PointFeatures {
            hue,
            lightness,
            height,
            plane_fit_error,
        }
    }

    #[test]
    fn test_rules() {
        let thresholds = ClassificationThresholds::default();
        let mean = 10.0;

        for hue in [0.0, 150.0, 280.0].iter() {
            for error in [0.0, 1.0].iter() {
                assert_eq!(
                    thresholds.classify(&features(*hue, 0.75, mean, *error), mean),
                    GroundCover::Snow
                );
            }
        }
        assert_eq!(
            thresholds.classify(&features(190.0, 0.4, mean, 1.0), mean),
            GroundCover::Vegetation
        );
        assert_eq!(
            thresholds.classify(&features(280.0, 0.45, mean + 1.0, 0.05), mean),
            GroundCover::Road
        );
        assert_eq!(
            thresholds.classify(&features(280.0, 0.45, mean + 1.0, 0.07), mean),
            GroundCover::Unclassified
        );
        assert_eq!(
            thresholds.classify(&features(280.0, 0.45, mean + 4.0, 0.05), mean),
            GroundCover::Unclassified
        );
        assert_eq!(
            thresholds.classify(&features(230.0, 0.45, mean, 0.0), mean),
            GroundCover::Unclassified
        );
    }

    #[test]
    fn test_lightness_band_is_inclusive() {
        let thresholds = ClassificationThresholds::default();
        assert!(thresholds.is_vegetation(&features(100.0, 0.2, 0.0, 0.0)));
        assert!(thresholds.is_vegetation(&features(100.0, 0.6, 0.0, 0.0)));
        assert!(!thresholds.is_vegetation(&features(100.0, 0.19, 0.0, 0.0)));
        assert!(thresholds.is_road(&features(275.0, 0.6, 3.7, 0.0), 0.0));
    }

    #[test]
    fn test_snow_wins_over_vegetation() {
        let thresholds = ClassificationThresholds {
            max_lightness: 0.8,
            ..Default::default()
        };
        let point = features(150.0, 0.7, 0.0, 0.0);
        assert_eq!(
            thresholds.matching_categories(&point, 0.0),
            vec![GroundCover::Snow, GroundCover::Vegetation]
        );
        assert_eq!(thresholds.classify(&point, 0.0), GroundCover::Snow);
    }

    #[test]
    fn test_mean_height() {
        let cloud = PointCloud::from_points(
            "heights",
            vec![Vector3::new(0.0, 0.0, 1.0), Vector3::new(5.0, 5.0, 4.0)],
            vec![Vector3::new(0, 0, 0); 2],
        )
        .unwrap();
        assert_approx_eq!(mean_height(&cloud).unwrap(), 2.5);
        assert!(mean_height(&PointCloud::new("empty"))
            .unwrap_err()
            .is_configuration());
    }

    fn layered_cloud(hue: &[f64], lightness: &[f64], error: &[f64]) -> PointCloud {
        let positions = (0..hue.len())
            .map(|i| Vector3::new(i as f64, 0.0, i as f64))
            .collect();
        let mut cloud =
            PointCloud::from_points("layers", positions, vec![Vector3::new(0, 0, 0); hue.len()])
                .unwrap();
        cloud.store_layer(HUE_LAYER, hue).unwrap();
        cloud.store_layer(LIGHTNESS_LAYER, lightness).unwrap();
        cloud.store_layer(PLANE_FIT_ERROR_LAYER, error).unwrap();
        cloud
    }

    #[test]
    fn test_classify_cloud() {
        // The thresholds are widened so that point 1 matches snow and vegetation at the same time
        let thresholds = ClassificationThresholds {
            max_lightness: 0.8,
            ..Default::default()
        };
        let mut cloud = layered_cloud(
            &[10.0, 150.0, 100.0, 300.0, 240.0],
            &[0.9, 0.7, 0.4, 0.5, 0.5],
            &[0.0, 0.0, 0.0, 0.01, 0.0],
        );
        let summary = classify_cloud(&mut cloud, 2.0, &thresholds).unwrap();

        assert_eq!(
            cloud.read_layer(FEATURES_LAYER).unwrap(),
            &[300.0, 300.0, 150.0, 101.0, 0.0]
        );
        assert_eq!(
            cloud.read_layer(HEIGHT_LAYER).unwrap(),
            &[0.0, 1.0, 2.0, 3.0, 4.0]
        );
        assert!(cloud.states()[1].snow() && cloud.states()[1].vegetation());
        assert!(cloud.states()[3].road());
        assert!(!cloud.states()[4].is_classified());
        assert_eq!(
            summary,
            ClassificationSummary {
                snow: 2,
                vegetation: 2,
                road: 1,
                unclassified: 1
            }
        );
    }

    #[test]
    fn test_flags_are_never_cleared() {
        let mut cloud = layered_cloud(&[240.0], &[0.1], &[0.0]);
        cloud.states_mut()[0].insert(PointFlag::Road);
        let summary = classify_cloud(&mut cloud, 0.0, &Default::default()).unwrap();
        assert_eq!(summary.unclassified, 1);
        assert!(cloud.states()[0].road());
        assert_eq!(cloud.read_layer(FEATURES_LAYER).unwrap(), &[101.0]);
    }

    #[test]
    fn test_features_follow_accumulated_flags() {
        let mut cloud = layered_cloud(&[300.0], &[0.5], &[0.05]);
        classify_cloud(&mut cloud, 0.0, &Default::default()).unwrap();
        assert_eq!(cloud.read_layer(FEATURES_LAYER).unwrap(), &[101.0]);

        let strict = ClassificationThresholds {
            road_max_plane_fit_error: 0.01,
            ..Default::default()
        };
        let summary = classify_cloud(&mut cloud, 0.0, &strict).unwrap();
        assert_eq!(summary.road, 0);
        assert!(cloud.states()[0].road());
        assert_eq!(cloud.read_layer(FEATURES_LAYER).unwrap(), &[101.0]);
        assert_eq!(crate::area::estimate_areas(cloud.states()).road, 1);
    }

    #[test]
    fn test_category_of_state() {
        let mut state = PointState::default();
        assert_eq!(GroundCover::of_state(&state), GroundCover::Unclassified);
        state.insert(PointFlag::Road);
        assert_eq!(GroundCover::of_state(&state), GroundCover::Road);
        state.insert(PointFlag::Snow);
        assert_eq!(GroundCover::of_state(&state), GroundCover::Snow);
    }

    #[test]
    fn test_missing_layer() {
        let mut cloud = layered_cloud(&[0.0], &[0.5], &[0.0]);
        let mut bare = cloud.derive("bare");
        bare.store_layer(HUE_LAYER, &[0.0]).unwrap();
        bare.store_layer(LIGHTNESS_LAYER, &[0.5]).unwrap();
        assert_eq!(
            classify_cloud(&mut bare, 0.0, &Default::default()),
            Err(Error::MissingLayer(PLANE_FIT_ERROR_LAYER.into()))
        );
        assert!(bare.read_layer(FEATURES_LAYER).is_err());
        assert!(classify_cloud(&mut cloud, 0.0, &Default::default()).is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_thresholds_from_json() {
        let thresholds: ClassificationThresholds =
            serde_json::from_str(r#"{ "snow_min_lightness": 0.8, "road_max_plane_fit_error": 0.1 }"#)
                .unwrap();
        assert_eq!(thresholds.snow_min_lightness, 0.8);
        assert_eq!(thresholds.road_max_plane_fit_error, 0.1);
        assert_eq!(thresholds.vegetation_max_hue, 200.0);
        assert_eq!(thresholds.road_max_height_above_mean, 3.7);
    }
}
