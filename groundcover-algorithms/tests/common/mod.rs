use std::cell::RefCell;

use groundcover_algorithms::{
    hsl::compute_hsl_layers,
    pipeline::CloudProcessor,
    plane_fit::PLANE_FIT_ERROR_LAYER,
};
use groundcover_core::{cloud::PointCloud, nalgebra::Vector3, state::PointFlag, Error, Result};

pub const SNOW_WHITE: Vector3<u8> = Vector3::new(250, 250, 250);
pub const GRASS_GREEN: Vector3<u8> = Vector3::new(40, 140, 40);
pub const ASPHALT_PURPLE: Vector3<u8> = Vector3::new(140, 60, 160);
pub const SHADOW_BLACK: Vector3<u8> = Vector3::new(20, 20, 20);

/// What the simplification of a [`ScriptedProcessor`] does
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Simplification {
    KeepAll,
    HideAll,
}

/// Processor with deterministic behaviour: real HSL conversion, a constant plane fit residual and a scripted
/// simplification. Records every call as `"<step>:<cloud name>"`
pub struct ScriptedProcessor {
    pub simplification: Simplification,
    pub plane_fit_error: f64,
    pub fail_plane_fit: bool,
    pub calls: RefCell<Vec<String>>,
}

impl ScriptedProcessor {
    pub fn new(plane_fit_error: f64) -> Self {
        Self {
            simplification: Simplification::KeepAll,
            plane_fit_error,
            fail_plane_fit: false,
            calls: RefCell::new(vec![]),
        }
    }

    fn record(&self, step: &str, cloud: &PointCloud) {
        self.calls
            .borrow_mut()
            .push(format!("{}:{}", step, cloud.name()));
    }
}

impl CloudProcessor for ScriptedProcessor {
    fn simplify(&self, cloud: &mut PointCloud, _min_distance: f64) -> Result<()> {
        self.record("simplify", cloud);
        if self.simplification == Simplification::HideAll {
            for state in cloud.states_mut() {
                state.remove(PointFlag::Visible);
            }
        }
        Ok(())
    }

    fn color_to_hsl(&self, cloud: &mut PointCloud) -> Result<()> {
        self.record("hsl", cloud);
        compute_hsl_layers(cloud)
    }

    fn plane_fit_residual(&self, cloud: &mut PointCloud, _radius: f64) -> Result<()> {
        self.record("plane_fit", cloud);
        if self.fail_plane_fit {
            return Err(Error::configuration("plane fitting is unavailable"));
        }
        let residuals = vec![self.plane_fit_error; cloud.len()];
        cloud.store_layer(PLANE_FIT_ERROR_LAYER, &residuals)?;
        Ok(())
    }
}

/// One point per color, spaced 10 units apart along the x axis at height 0
pub fn spaced_cloud(name: &str, colors: &[Vector3<u8>]) -> PointCloud {
    let positions = (0..colors.len())
        .map(|i| Vector3::new(i as f64 * 10.0, 0.0, 0.0))
        .collect();
    PointCloud::from_points(name, positions, colors.to_vec()).unwrap()
}

/// A flat `size` x `size` grid with the given spacing, origin and color
pub fn flat_patch(
    size: usize,
    spacing: f64,
    origin: Vector3<f64>,
    color: Vector3<u8>,
) -> (Vec<Vector3<f64>>, Vec<Vector3<u8>>) {
    let mut positions = vec![];
    for x in 0..size {
        for y in 0..size {
            positions.push(origin + Vector3::new(x as f64 * spacing, y as f64 * spacing, 0.0));
        }
    }
    let colors = vec![color; positions.len()];
    (positions, colors)
}
