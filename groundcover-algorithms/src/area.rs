use groundcover_core::{state::PointState, Error, Result};
use log::{info, warn};

use crate::classification::GroundCover;

/// Point counts over the visible points of a (simplified) cloud
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct AreaCounts {
    pub visible: usize,
    pub snow: usize,
    pub vegetation: usize,
    pub road: usize,
    /// Visible points without any category flag
    pub unclassified: usize,
}

/// Share of each category among the visible points, in percent
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct AreaRatios {
    pub snow: f64,
    pub vegetation: f64,
    pub road: f64,
    pub unclassified: f64,
}

impl AreaRatios {
    pub fn ratio(&self, category: GroundCover) -> f64 {
        match category {
            GroundCover::Snow => self.snow,
            GroundCover::Vegetation => self.vegetation,
            GroundCover::Road => self.road,
            GroundCover::Unclassified => self.unclassified,
        }
    }
}

impl AreaCounts {
    pub fn count(&self, category: GroundCover) -> usize {
        match category {
            GroundCover::Snow => self.snow,
            GroundCover::Vegetation => self.vegetation,
            GroundCover::Road => self.road,
            GroundCover::Unclassified => self.unclassified,
        }
    }

    /// Percentages of each category among the visible points. Zero visible points give `0.0` for every category
    pub fn ratios(&self) -> AreaRatios {
        match self.checked_ratios() {
            Ok(ratios) => ratios,
            Err(_) => {
                warn!("No visible points to estimate areas from, reporting 0% for every category");
                AreaRatios::default()
            }
        }
    }

    /// Like [`ratios`](AreaCounts::ratios), but zero visible points are an `Error::DivisionUndefined`
    pub fn checked_ratios(&self) -> Result<AreaRatios> {
        if self.visible == 0 {
            return Err(Error::DivisionUndefined(
                "area ratios of a cloud without visible points",
            ));
        }
        let total = self.visible as f64;
        let percent = |count: usize| count as f64 / total * 100.0;
        Ok(AreaRatios {
            snow: percent(self.snow),
            vegetation: percent(self.vegetation),
            road: percent(self.road),
            unclassified: percent(self.unclassified),
        })
    }
}

/// Counts the visible points and, among those, the points of each category. A point with several category flags
/// counts towards each of them, a point without any counts as unclassified
///
/// # Examples
///
/// ```
/// # use groundcover_core::state::{PointFlag, PointState};
/// # use groundcover_algorithms::area::estimate_areas;
/// let mut snow = PointState::default();
/// snow.insert(PointFlag::Snow);
/// let mut hidden_road = PointState::default();
/// hidden_road.insert(PointFlag::Road);
/// hidden_road.remove(PointFlag::Visible);
///
/// let counts = estimate_areas(&[snow, PointState::default(), hidden_road]);
/// assert_eq!(counts.visible, 2);
/// assert_eq!(counts.snow, 1);
/// assert_eq!(counts.road, 0);
/// assert_eq!(counts.ratios().snow, 50.0);
/// ```
pub fn estimate_areas(states: &[PointState]) -> AreaCounts {
    let mut counts = AreaCounts::default();
    for state in states.iter().filter(|state| state.visible()) {
        counts.visible += 1;
        if state.snow() {
            counts.snow += 1;
        }
        if state.vegetation() {
            counts.vegetation += 1;
        }
        if state.road() {
            counts.road += 1;
        }
        if !state.is_classified() {
            counts.unclassified += 1;
        }
    }
    counts
}

/// Logs the counts and percentages of an area estimation
pub fn log_areas(counts: &AreaCounts, ratios: &AreaRatios) {
    info!("Number of visible points: {}", counts.visible);
    info!(
        "Snow: {} points, {:.2}% of the area",
        counts.snow, ratios.snow
    );
    info!(
        "Vegetation: {} points, {:.2}% of the area",
        counts.vegetation, ratios.vegetation
    );
    info!(
        "Road: {} points, {:.2}% of the area",
        counts.road, ratios.road
    );
    info!(
        "Unclassified: {} points, {:.2}% of the area",
        counts.unclassified, ratios.unclassified
    );
}
