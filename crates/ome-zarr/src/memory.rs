use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::hierarchy::{into_attributes, ArrayHandle, Child, GroupHandle};
use crate::zarr_v2::ArrayMetadata;

#[derive(Clone, Debug)]
pub enum MemoryNode {
    Group(Arc<MemoryGroup>),
    Array(Arc<MemoryArray>),
}

/// A group held in memory. Groups are shared between parents by reference, so the same group may
/// appear at several places of a hierarchy.
#[derive(Clone, Debug, Default)]
pub struct MemoryGroup {
    attributes: Map<String, Value>,
    members: IndexMap<String, MemoryNode>,
}

impl MemoryGroup {
    pub fn new(attributes: Value) -> Self {
        Self {
            attributes: into_attributes(attributes),
            members: IndexMap::new(),
        }
    }

    pub fn with_group(mut self, name: &str, group: MemoryGroup) -> Self {
        self.members.insert(name.to_string(), MemoryNode::Group(Arc::new(group)));
        self
    }

    pub fn with_shared_group(mut self, name: &str, group: Arc<MemoryGroup>) -> Self {
        self.members.insert(name.to_string(), MemoryNode::Group(group));
        self
    }

    pub fn with_array(mut self, name: &str, array: MemoryArray) -> Self {
        self.members.insert(name.to_string(), MemoryNode::Array(Arc::new(array)));
        self
    }
}

impl GroupHandle for MemoryGroup {
    fn identity(&self) -> String {
        format!("memory:{:p}", self)
    }

    fn attributes(&self) -> Map<String, Value> {
        self.attributes.clone()
    }

    fn child_names(&self) -> Vec<String> {
        self.members.keys().cloned().collect()
    }

    fn get_child(&self, name: &str) -> Option<Child> {
        match self.members.get(name)? {
            MemoryNode::Group(group) => Some(Child::Group(Box::new(Arc::clone(group)))),
            MemoryNode::Array(array) => Some(Child::Array(Box::new(Arc::clone(array)))),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryArray {
    attributes: Map<String, Value>,
    metadata: Option<ArrayMetadata>,
}

impl MemoryArray {
    pub fn new(attributes: Value) -> Self {
        Self {
            attributes: into_attributes(attributes),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: ArrayMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

impl ArrayHandle for MemoryArray {
    fn attributes(&self) -> Map<String, Value> {
        self.attributes.clone()
    }

    fn metadata(&self) -> Option<ArrayMetadata> {
        self.metadata.clone()
    }
}
