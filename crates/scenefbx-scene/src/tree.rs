//! Scene hierarchy stored as an arena
//!
//! Nodes are addressed by [`NodeId`]. A node's parent is fixed when it is
//! inserted and can never change, and children can only be appended under
//! nodes that already exist, so the tree is acyclic and every parent link
//! has a matching child-list entry.

use scenefbx_core::{Error, Result};

use crate::object::SceneObject;

/// Handle of a node inside one [`SceneTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena index of this node
    pub fn index(self) -> usize {
        self.0
    }
}

/// One node of the tree
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Object stored at this node
    pub object: SceneObject,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl TreeNode {
    /// Parent node, `None` for the root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in insertion order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// A rooted tree of scene objects
#[derive(Debug, Clone)]
pub struct SceneTree {
    nodes: Vec<TreeNode>,
}

impl SceneTree {
    /// Create a tree containing only `root`
    pub fn new(root: SceneObject) -> Self {
        Self {
            nodes: vec![TreeNode {
                object: root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// The root node
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append `object` as the last child of `parent`
    pub fn add_child(&mut self, parent: NodeId, object: SceneObject) -> Result<NodeId> {
        if parent.0 >= self.nodes.len() {
            return Err(Error::InvalidNode { index: parent.0 });
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(TreeNode {
            object,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Node `id`, `None` if it is not part of this tree
    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    /// Object stored at `id`
    pub fn object(&self, id: NodeId) -> Option<&SceneObject> {
        self.get(id).map(|node| &node.object)
    }

    /// Parent of `id`
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(TreeNode::parent)
    }

    /// Children of `id`; empty for unknown ids
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(TreeNode::children).unwrap_or(&[])
    }

    /// Number of nodes, the root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree holds at least its root
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Pre-order depth-first walk starting at the root
    pub fn depth_first(&self) -> DepthFirst<'_> {
        DepthFirst {
            tree: self,
            stack: vec![self.root()],
        }
    }

    /// Clone every object out in pre-order, dropping the hierarchy
    pub fn flatten(&self) -> Vec<SceneObject> {
        self.depth_first()
            .filter_map(|id| self.object(id).cloned())
            .collect()
    }
}

/// Iterator returned by [`SceneTree::depth_first`]
pub struct DepthFirst<'a> {
    tree: &'a SceneTree,
    stack: Vec<NodeId>,
}

impl Iterator for DepthFirst<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
