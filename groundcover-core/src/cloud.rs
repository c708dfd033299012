use nalgebra::Vector3;

use crate::{
    error::{Error, Result},
    layers::{LayerId, LayerStore},
    math::AABB,
    state::{PointFlag, PointState},
};

/// An ordered, mutable collection of colored points sharing one coordinate frame. Every point has a position, an
/// RGB color, a [`PointState`] and one value in each of the named layers of the cloud.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    name: String,
    positions: Vec<Vector3<f64>>,
    colors: Vec<Vector3<u8>>,
    states: Vec<PointState>,
    layers: LayerStore,
}

impl PointCloud {
    /// Creates an empty cloud
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            positions: vec![],
            colors: vec![],
            states: vec![],
            layers: LayerStore::new(0),
        }
    }

    /// Creates a cloud from matching position and color sequences. All points start with the default state
    pub fn from_points(
        name: &str,
        positions: Vec<Vector3<f64>>,
        colors: Vec<Vector3<u8>>,
    ) -> Result<Self> {
        if positions.len() != colors.len() {
            return Err(Error::configuration(format!(
                "Cloud '{}' got {} positions but {} colors",
                name,
                positions.len(),
                colors.len()
            )));
        }
        let count = positions.len();
        Ok(Self {
            name: name.to_string(),
            positions,
            colors,
            states: vec![PointState::default(); count],
            layers: LayerStore::new(count),
        })
    }

    /// Creates a fresh cloud seeded with the positions and colors of this cloud. States start at their default and
    /// no layer is carried over
    pub fn derive(&self, name: &str) -> Self {
        let mut derived = Self::new(name);
        let range = derived.alloc_points(self.len());
        derived.positions[range.clone()].copy_from_slice(&self.positions);
        derived.colors[range].copy_from_slice(&self.colors);
        derived
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Appends `count` points at the origin, colored black, in the default state. Returns the index range of the
    /// new points
    pub fn alloc_points(&mut self, count: usize) -> std::ops::Range<usize> {
        let start = self.len();
        let end = start + count;
        self.positions.resize(end, Vector3::zeros());
        self.colors.resize(end, Vector3::zeros());
        self.states.resize(end, PointState::default());
        self.layers.resize(end);
        start..end
    }

    pub fn positions(&self) -> &[Vector3<f64>] {
        &self.positions
    }

    pub fn colors(&self) -> &[Vector3<u8>] {
        &self.colors
    }

    pub fn states(&self) -> &[PointState] {
        &self.states
    }

    pub fn states_mut(&mut self) -> &mut [PointState] {
        &mut self.states
    }

    pub fn set_positions(&mut self, positions: &[Vector3<f64>]) -> Result<()> {
        self.check_len("positions", positions.len())?;
        self.positions.copy_from_slice(positions);
        Ok(())
    }

    pub fn set_colors(&mut self, colors: &[Vector3<u8>]) -> Result<()> {
        self.check_len("colors", colors.len())?;
        self.colors.copy_from_slice(colors);
        Ok(())
    }

    /// Writes back a full set of point states, e.g. after they were modified on a copy
    pub fn set_states(&mut self, states: &[PointState]) -> Result<()> {
        self.check_len("states", states.len())?;
        self.states.copy_from_slice(states);
        Ok(())
    }

    /// Number of points that carry the given flag
    pub fn count_flag(&self, flag: PointFlag) -> usize {
        self.states.iter().filter(|state| state.is(flag)).count()
    }

    /// Indices of all points that carry the given flag
    pub fn indices_with_flag(&self, flag: PointFlag) -> Vec<usize> {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, state)| state.is(flag))
            .map(|(index, _)| index)
            .collect()
    }

    /// Bounding box of all positions, or `None` for an empty cloud
    pub fn bounds(&self) -> Option<AABB> {
        AABB::from_positions(self.positions.iter())
    }

    pub fn layers(&self) -> &LayerStore {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut LayerStore {
        &mut self.layers
    }

    /// Shorthand for [`LayerStore::ensure_layer`]
    pub fn ensure_layer(&mut self, name: &str) -> LayerId {
        self.layers.ensure_layer(name)
    }

    /// Shorthand for [`LayerStore::read_layer`]
    pub fn read_layer(&self, name: &str) -> Result<&[f64]> {
        self.layers.read_layer(name)
    }

    /// Shorthand for [`LayerStore::write_layer`]
    pub fn write_layer(&mut self, id: LayerId, values: &[f64]) -> Result<()> {
        self.layers.write_layer(id, values)
    }

    /// Shorthand for [`LayerStore::store_layer`]
    pub fn store_layer(&mut self, name: &str, values: &[f64]) -> Result<LayerId> {
        self.layers.store_layer(name, values)
    }

    fn check_len(&self, what: &str, actual: usize) -> Result<()> {
        if actual != self.len() {
            return Err(Error::configuration(format!(
                "Cloud '{}' has {} points, got {} {}",
                self.name,
                self.len(),
                actual,
                what
            )));
        }
        Ok(())
    }
}
