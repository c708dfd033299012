use crate::{
    cloud::PointCloud,
    error::{Error, Result},
};

/// Identifies a cloud inside a [`Project`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CloudId(usize);

impl CloudId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct CloudNode {
    parent: Option<CloudId>,
    cloud: PointCloud,
}

/// Owns all clouds of a session as a tree: root clouds are added by the user, derived clouds (e.g. a simplified
/// copy) are attached as children of the cloud they were made from. Clouds outlive the runs that created them.
#[derive(Debug, Clone, Default)]
pub struct Project {
    nodes: Vec<CloudNode>,
}

impl Project {
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a root cloud
    pub fn add_cloud(&mut self, cloud: PointCloud) -> CloudId {
        self.nodes.push(CloudNode {
            parent: None,
            cloud,
        });
        CloudId(self.nodes.len() - 1)
    }

    /// Attaches `cloud` as a child of `parent`
    pub fn attach_child(&mut self, parent: CloudId, cloud: PointCloud) -> Result<CloudId> {
        self.cloud(parent)?;
        self.nodes.push(CloudNode {
            parent: Some(parent),
            cloud,
        });
        Ok(CloudId(self.nodes.len() - 1))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn cloud(&self, id: CloudId) -> Result<&PointCloud> {
        self.nodes
            .get(id.0)
            .map(|node| &node.cloud)
            .ok_or_else(|| Error::configuration(format!("No cloud with id {}", id.0)))
    }

    pub fn cloud_mut(&mut self, id: CloudId) -> Result<&mut PointCloud> {
        self.nodes
            .get_mut(id.0)
            .map(|node| &mut node.cloud)
            .ok_or_else(|| Error::configuration(format!("No cloud with id {}", id.0)))
    }

    /// Resolves the target of a method. A missing target is a configuration error
    pub fn resolve(&self, target: Option<CloudId>) -> Result<&PointCloud> {
        let id = target.ok_or_else(|| Error::configuration("You must define the target cloud"))?;
        self.cloud(id)
    }

    /// Mutable counterpart of [`resolve`](Project::resolve)
    pub fn resolve_mut(&mut self, target: Option<CloudId>) -> Result<&mut PointCloud> {
        let id = target.ok_or_else(|| Error::configuration("You must define the target cloud"))?;
        self.cloud_mut(id)
    }

    pub fn parent(&self, id: CloudId) -> Result<Option<CloudId>> {
        self.nodes
            .get(id.0)
            .map(|node| node.parent)
            .ok_or_else(|| Error::configuration(format!("No cloud with id {}", id.0)))
    }

    /// Ids of all direct children of `id`, in insertion order
    pub fn children(&self, id: CloudId) -> Vec<CloudId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.parent == Some(id))
            .map(|(index, _)| CloudId(index))
            .collect()
    }

    /// Finds the first cloud with the given name
    pub fn find_by_name(&self, name: &str) -> Option<CloudId> {
        self.nodes
            .iter()
            .position(|node| node.cloud.name() == name)
            .map(CloudId)
    }
}
