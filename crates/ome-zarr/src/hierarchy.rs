use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use ome_ngff::StructureError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::zarr_v2::ArrayMetadata;

/// A group of a hierarchy, e.g. a zarr group in some store.
pub trait GroupHandle: Send + Sync {
    /// Identifies the underlying group. Two handles referring to the same group must return the
    /// same identity.
    fn identity(&self) -> String;

    fn attributes(&self) -> Map<String, Value>;

    fn child_names(&self) -> Vec<String>;

    fn get_child(&self, name: &str) -> Option<Child>;
}

/// An array of a hierarchy.
pub trait ArrayHandle: Send + Sync {
    fn attributes(&self) -> Map<String, Value>;

    fn metadata(&self) -> Option<ArrayMetadata> {
        None
    }
}

pub enum Child {
    Group(Box<dyn GroupHandle>),
    Array(Box<dyn ArrayHandle>),
}

impl<T: GroupHandle + ?Sized> GroupHandle for Arc<T> {
    fn identity(&self) -> String {
        (**self).identity()
    }

    fn attributes(&self) -> Map<String, Value> {
        (**self).attributes()
    }

    fn child_names(&self) -> Vec<String> {
        (**self).child_names()
    }

    fn get_child(&self, name: &str) -> Option<Child> {
        (**self).get_child(name)
    }
}

impl<T: ArrayHandle + ?Sized> ArrayHandle for Arc<T> {
    fn attributes(&self) -> Map<String, Value> {
        (**self).attributes()
    }

    fn metadata(&self) -> Option<ArrayMetadata> {
        (**self).metadata()
    }
}

/// The attributes of a group or array and, for groups with children, its members.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub attributes: Map<String, Value>,

    // absent for arrays and for groups without children
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<IndexMap<String, HierarchyNode>>,
}

impl HierarchyNode {
    pub fn leaf(attributes: Map<String, Value>) -> Self {
        Self {
            attributes,
            members: None,
        }
    }

    pub fn member(&self, name: &str) -> Option<&HierarchyNode> {
        self.members.as_ref()?.get(name)
    }

    /// Looks up a descendant by its `/` separated path relative to this node.
    pub fn descendant(&self, path: &str) -> Option<&HierarchyNode> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .try_fold(self, |node, name| node.member(name))
    }
}

/// Turns a JSON value into an attribute map. Anything but an object yields an empty map.
pub fn into_attributes(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            log::warn!("Ignoring non-object attributes: {}", other);
            Map::new()
        }
    }
}

pub(crate) fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

struct Slot {
    path: String,
    attributes: Map<String, Value>,
    children: Vec<(String, usize)>,
}

enum Frame {
    Enter { parent: usize, name: String, child: Child },
    Exit { identity: String },
}

struct Walker {
    slots: Vec<Slot>,
    stack: Vec<Frame>,
    // identities of the groups on the current path from the root
    active: HashSet<String>,
}

impl Walker {
    fn enter_group(&mut self, group: &dyn GroupHandle, path: &str, parent: Option<(usize, String)>) -> Result<(), StructureError> {
        let identity = group.identity();
        if !self.active.insert(identity.clone()) {
            return Err(StructureError::CycleDetected(path.to_string()));
        }
        let index = self.push_slot(path, group.attributes(), parent);

        // children are pushed in reverse so that they are visited in `child_names` order
        let mut children = Vec::new();
        for name in group.child_names() {
            let child_path = join_path(path, &name);
            let child = group
                .get_child(&name)
                .ok_or(StructureError::MissingMember(child_path))?;
            children.push(Frame::Enter {
                parent: index,
                name,
                child,
            });
        }
        self.stack.push(Frame::Exit { identity });
        self.stack.extend(children.into_iter().rev());
        Ok(())
    }

    fn push_slot(&mut self, path: &str, attributes: Map<String, Value>, parent: Option<(usize, String)>) -> usize {
        let index = self.slots.len();
        self.slots.push(Slot {
            path: path.to_string(),
            attributes,
            children: Vec::new(),
        });
        if let Some((parent, name)) = parent {
            self.slots[parent].children.push((name, index));
        }
        index
    }

    fn into_node(self) -> HierarchyNode {
        // children always come after their parent
        let mut nodes: Vec<Option<HierarchyNode>> = Vec::with_capacity(self.slots.len());
        nodes.resize_with(self.slots.len(), || None);
        for (index, slot) in self.slots.into_iter().enumerate().rev() {
            let members = if slot.children.is_empty() {
                None
            } else {
                Some(
                    slot.children
                        .into_iter()
                        .filter_map(|(name, child)| nodes[child].take().map(|node| (name, node)))
                        .collect(),
                )
            };
            nodes[index] = Some(HierarchyNode {
                attributes: slot.attributes,
                members,
            });
        }
        nodes.into_iter().next().flatten().unwrap_or_default()
    }
}

/// Extracts the attributes of a group and all of its descendants into a [`HierarchyNode`].
///
/// Members keep the order of [`GroupHandle::child_names`]. Arrays and groups without children
/// have no `members`. The hierarchy is traversed with an explicit stack, so its depth is not
/// bounded by the call stack. A group that is its own ancestor fails with
/// [`StructureError::CycleDetected`], a listed child that cannot be opened fails with
/// [`StructureError::MissingMember`].
pub fn walk(root: &dyn GroupHandle) -> Result<HierarchyNode, StructureError> {
    let mut walker = Walker {
        slots: Vec::new(),
        stack: Vec::new(),
        active: HashSet::new(),
    };
    walker.enter_group(root, "", None)?;

    while let Some(frame) = walker.stack.pop() {
        match frame {
            Frame::Enter { parent, name, child } => {
                let path = join_path(&walker.slots[parent].path, &name);
                match child {
                    Child::Group(group) => {
                        log::trace!("Walking group {}", path);
                        walker.enter_group(group.as_ref(), &path, Some((parent, name)))?;
                    }
                    Child::Array(array) => {
                        walker.push_slot(&path, array.attributes(), Some((parent, name)));
                    }
                }
            }
            Frame::Exit { identity } => {
                walker.active.remove(&identity);
            }
        }
    }
    Ok(walker.into_node())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryArray, MemoryGroup};
    use serde_json::{from_value, json, to_value};
    use std::sync::OnceLock;

    #[test]
    fn walk_nested_groups_and_arrays() {
        let root = MemoryGroup::new(json!({"key": "value"})).with_group(
            "sub",
            MemoryGroup::new(json!({"key2": "value2"})).with_array("arr", MemoryArray::new(json!({}))),
        );
        let node = walk(&root).unwrap();
        assert_eq!(
            to_value(&node).unwrap(),
            json!({
                "attributes": {"key": "value"},
                "members": {
                    "sub": {
                        "attributes": {"key2": "value2"},
                        "members": {"arr": {"attributes": {}}}
                    }
                }
            })
        );
        assert!(node.descendant("sub/arr").unwrap().members.is_none());
    }

    #[test]
    fn empty_group_has_no_members() {
        let node = walk(&MemoryGroup::new(json!({"a": 1}))).unwrap();
        assert_eq!(to_value(&node).unwrap(), json!({"attributes": {"a": 1}}));
    }

    #[test]
    fn members_keep_child_order() {
        let root = MemoryGroup::default()
            .with_array("b", MemoryArray::default())
            .with_group("c", MemoryGroup::default().with_array("0", MemoryArray::default()))
            .with_array("a", MemoryArray::default());
        let node = walk(&root).unwrap();
        let names: Vec<&String> = node.members.as_ref().unwrap().keys().collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }

    #[test]
    fn member_equality_ignores_order() {
        let first: HierarchyNode = from_value(json!({
            "attributes": {},
            "members": {"a": {"attributes": {}}, "b": {"attributes": {"x": 1}}}
        }))
        .unwrap();
        let second: HierarchyNode = from_value(json!({
            "attributes": {},
            "members": {"b": {"attributes": {"x": 1}}, "a": {"attributes": {}}}
        }))
        .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn shared_groups_are_not_cycles() {
        let shared = Arc::new(MemoryGroup::new(json!({"shared": true})));
        let root = MemoryGroup::default()
            .with_shared_group("left", Arc::clone(&shared))
            .with_shared_group("right", shared);
        let node = walk(&root).unwrap();
        assert_eq!(node.descendant("left"), node.descendant("right"));
    }

    #[test]
    fn deep_hierarchies_do_not_exhaust_the_stack() {
        let depth = 1000;
        let mut group = MemoryGroup::new(json!({"level": depth}));
        for level in (0..depth).rev() {
            group = MemoryGroup::new(json!({"level": level})).with_group("child", group);
        }
        let node = walk(&group).unwrap();
        let path = vec!["child"; depth].join("/");
        let deepest = node.descendant(&path).unwrap();
        assert_eq!(deepest.attributes.get("level"), Some(&json!(depth)));
        assert!(deepest.members.is_none());
    }

    /// A group whose single child may point back up the hierarchy.
    struct LinkedGroup {
        name: String,
        next: OnceLock<Arc<LinkedGroup>>,
    }

    impl LinkedGroup {
        fn new(name: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                next: OnceLock::new(),
            })
        }
    }

    impl GroupHandle for LinkedGroup {
        fn identity(&self) -> String {
            self.name.clone()
        }

        fn attributes(&self) -> Map<String, Value> {
            Map::new()
        }

        fn child_names(&self) -> Vec<String> {
            self.next.get().map(|_| vec!["next".to_string()]).unwrap_or_default()
        }

        fn get_child(&self, name: &str) -> Option<Child> {
            match name {
                "next" => Some(Child::Group(Box::new(Arc::clone(self.next.get()?)))),
                _ => None,
            }
        }
    }

    #[test]
    fn cycles_are_detected() {
        let a = LinkedGroup::new("a");
        let b = LinkedGroup::new("b");
        let _ = a.next.set(Arc::clone(&b));
        let _ = b.next.set(Arc::clone(&a));
        assert_eq!(
            walk(&*a),
            Err(StructureError::CycleDetected("next/next".to_string()))
        );
    }

    struct Forgetful;

    impl GroupHandle for Forgetful {
        fn identity(&self) -> String {
            "forgetful".to_string()
        }

        fn attributes(&self) -> Map<String, Value> {
            Map::new()
        }

        fn child_names(&self) -> Vec<String> {
            vec!["gone".to_string()]
        }

        fn get_child(&self, _name: &str) -> Option<Child> {
            None
        }
    }

    #[test]
    fn unopenable_children_fail() {
        assert_eq!(walk(&Forgetful), Err(StructureError::MissingMember("gone".to_string())));
    }
}
