use crate::error::{Error, Result};

/// Handle to a layer inside a [`LayerStore`]. Handles stay valid for the lifetime of the store, layers are never
/// removed
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(usize);

/// A named scalar attribute holding one `f64` per point of a cloud
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    name: String,
    default_value: f64,
    values: Vec<f64>,
}

impl Layer {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_value(&self) -> f64 {
        self.default_value
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Named per-point layers of a single cloud. Names are unique: asking for an existing name returns the existing
/// layer. Every layer always holds exactly `point_count` values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerStore {
    layers: Vec<Layer>,
    point_count: usize,
}

impl LayerStore {
    pub fn new(point_count: usize) -> Self {
        Self {
            layers: vec![],
            point_count,
        }
    }

    /// Number of values every layer holds
    pub fn point_count(&self) -> usize {
        self.point_count
    }

    /// Number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Looks up the layer with the given `name`
    pub fn find_layer(&self, name: &str) -> Option<LayerId> {
        self.layers
            .iter()
            .position(|layer| layer.name == name)
            .map(LayerId)
    }

    /// Returns the layer with the given `name`, creating it with default value `0.0` if it does not exist yet
    pub fn ensure_layer(&mut self, name: &str) -> LayerId {
        self.ensure_layer_with_default(name, 0.0)
    }

    /// Like [`ensure_layer`](LayerStore::ensure_layer), but a newly created layer is filled with `default_value`.
    /// The default of an existing layer is left untouched.
    pub fn ensure_layer_with_default(&mut self, name: &str, default_value: f64) -> LayerId {
        if let Some(id) = self.find_layer(name) {
            return id;
        }
        self.layers.push(Layer {
            name: name.to_string(),
            default_value,
            values: vec![default_value; self.point_count],
        });
        LayerId(self.layers.len() - 1)
    }

    pub fn layer(&self, id: LayerId) -> Result<&Layer> {
        self.layers
            .get(id.0)
            .ok_or_else(|| Error::configuration(format!("Unknown layer handle {}", id.0)))
    }

    /// Returns the values of the layer with the given `name`
    pub fn read_layer(&self, name: &str) -> Result<&[f64]> {
        self.find_layer(name)
            .map(|id| self.layers[id.0].values.as_slice())
            .ok_or_else(|| Error::MissingLayer(name.to_string()))
    }

    /// Returns the values of the layer `id`
    pub fn values(&self, id: LayerId) -> Result<&[f64]> {
        self.layer(id).map(Layer::values)
    }

    /// Overwrites all values of the layer `id`. The length of `values` must match the point count, otherwise the
    /// layer is left unchanged and an `Error::LayerLength` is returned.
    pub fn write_layer(&mut self, id: LayerId, values: &[f64]) -> Result<()> {
        let point_count = self.point_count;
        let layer = self
            .layers
            .get_mut(id.0)
            .ok_or_else(|| Error::configuration(format!("Unknown layer handle {}", id.0)))?;
        if values.len() != point_count {
            return Err(Error::LayerLength {
                layer: layer.name.clone(),
                expected: point_count,
                actual: values.len(),
            });
        }
        layer.values.copy_from_slice(values);
        Ok(())
    }

    /// Creates (or reuses) the layer `name` and writes `values` into it
    pub fn store_layer(&mut self, name: &str, values: &[f64]) -> Result<LayerId> {
        if values.len() != self.point_count {
            return Err(Error::LayerLength {
                layer: name.to_string(),
                expected: self.point_count,
                actual: values.len(),
            });
        }
        let id = self.ensure_layer(name);
        self.write_layer(id, values)?;
        Ok(id)
    }

    /// Iterates over all layers in creation order
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    /// Changes the number of points. New points receive the default value of each layer
    pub(crate) fn resize(&mut self, point_count: usize) {
        for layer in &mut self.layers {
            layer.values.resize(point_count, layer.default_value);
        }
        self.point_count = point_count;
    }
}
