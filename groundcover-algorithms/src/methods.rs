//! Methods that run on the clouds of a [`Project`]. Each method carries its parameters and a target cloud, checks
//! both in [`validate`](ColorFilterMethod::validate) without touching the project and applies itself in `run`.

use groundcover_core::{
    project::{CloudId, Project},
    Error, Result,
};
use log::info;

use crate::{
    area::{AreaCounts, AreaRatios},
    color_filter::{select_by_color, ColorRange},
    intensity::{select_by_neighbourhood_intensity, IntensityOptions},
    pipeline::{detect_ground_cover, CloudProcessor, GroundCoverOptions, NativeProcessor},
    spatial::SpatialIndex,
};

/// Selects (and optionally deletes) the points of the target cloud whose color lies within a range
#[derive(Debug, Clone, Default)]
pub struct ColorFilterMethod {
    pub target: Option<CloudId>,
    pub range: ColorRange,
    pub delete_points: bool,
}

impl ColorFilterMethod {
    pub fn validate(&self, project: &Project) -> Result<()> {
        project.resolve(self.target).map(|_| ())
    }

    /// Returns the number of matched points
    pub fn run(&self, project: &mut Project) -> Result<usize> {
        let cloud = project.resolve_mut(self.target)?;
        Ok(select_by_color(cloud, &self.range, self.delete_points))
    }
}

/// Selects the points of the target cloud that have a neighbour with an intensity in range
#[derive(Debug, Clone, Default)]
pub struct IntensitySelectionMethod {
    pub target: Option<CloudId>,
    pub options: IntensityOptions,
}

impl IntensitySelectionMethod {
    pub fn validate(&self, project: &Project) -> Result<()> {
        project.resolve(self.target)?;
        self.options.validate()
    }

    /// Returns the number of selected points
    pub fn run(&self, project: &mut Project) -> Result<usize> {
        self.validate(project)?;
        let cloud = project.resolve_mut(self.target)?;
        let index = SpatialIndex::build(cloud);
        select_by_neighbourhood_intensity(cloud, &index, &self.options)
    }
}

/// Outcome of an [`AreasDetectionMethod`] run
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AreasReport {
    /// The simplified cloud, attached as a child of the target
    pub simplified: CloudId,
    pub counts: AreaCounts,
    pub ratios: AreaRatios,
}

/// Classifies the target cloud into snow, vegetation and road and estimates the area of each category. The
/// simplified cloud the estimate is based on stays in the project as a child of the target.
pub struct AreasDetectionMethod<P: CloudProcessor = NativeProcessor> {
    pub target: Option<CloudId>,
    pub options: GroundCoverOptions,
    pub processor: P,
}

impl Default for AreasDetectionMethod<NativeProcessor> {
    fn default() -> Self {
        Self {
            target: None,
            options: Default::default(),
            processor: NativeProcessor,
        }
    }
}

impl<P: CloudProcessor> AreasDetectionMethod<P> {
    pub fn validate(&self, project: &Project) -> Result<()> {
        project.resolve(self.target)?;
        self.options.validate()
    }

    pub fn run(&self, project: &mut Project) -> Result<AreasReport> {
        self.validate(project)?;
        let target = self
            .target
            .ok_or_else(|| Error::configuration("You must define the target cloud"))?;
        let run = detect_ground_cover(project.cloud_mut(target)?, &self.processor, &self.options)?;
        let simplified = project.attach_child(target, run.simplified)?;
        info!(
            "Attached '{}' below '{}'",
            project.cloud(simplified)?.name(),
            project.cloud(target)?.name()
        );
        Ok(AreasReport {
            simplified,
            counts: run.counts,
            ratios: run.ratios,
        })
    }
}
