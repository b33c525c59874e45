//! The desktop tree.
//!
//! A [`DesktopTree`] is an n-ary tree whose leaves map 1:1 to physical
//! desktops of the window manager.  Interior nodes represent a *split*: a
//! group of desktops that the user navigates as one unit.
//!
//! Nodes live in a [`SlotMap`] owned by the tree and refer to each other by
//! [`NodeId`] handles, so parent links and the two focus markers are plain
//! non-owning keys.
//!
//! After every public operation the following hold:
//!
//! * following `focused_child` from the root reaches exactly
//!   [`DesktopTree::focused`], which is a leaf;
//! * every child's `index_in_parent` equals its position in the parent's
//!   `children`;
//! * every interior node's `focused_child` is in range;
//! * the root has no parent and is never removed;
//! * every leaf carries a desktop id.
//!
//! The focus algorithms live in [`crate::focus`].

use crate::traits::WindowManager;
use log::{debug, info, warn};
use slotmap::{new_key_type, SlotMap};
use std::collections::HashMap;

new_key_type! {
    /// Handle to a node in a [`DesktopTree`].
    pub struct NodeId;
}

/// A single node of the tree.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    /// Window manager desktop id.  Meaningful for leaves; an interior node
    /// keeps the id it had before it was split (its first child shares it)
    /// and takes over its last child's id when it merges back into a leaf.
    pub(crate) desktop_id: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) index_in_parent: usize,
    /// Index of the child on the focus path.  Kept at `0` for leaves.
    pub(crate) focused_child: usize,
    pub(crate) attrs: HashMap<String, String>,
}

impl Node {
    fn new(desktop_id: String, parent: Option<NodeId>, index_in_parent: usize) -> Self {
        Self {
            desktop_id,
            parent,
            children: Vec::new(),
            index_in_parent,
            focused_child: 0,
            attrs: HashMap::new(),
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Errors produced by tree operations whose preconditions do not hold.
///
/// A failed operation never leaves the tree partially modified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("cannot remove non-leaf desktop")]
    RemoveNonLeaf,
    #[error("cannot remove occupied desktop")]
    RemoveOccupied,
    #[error("cannot remove root desktop")]
    RemoveRoot,
    #[error("cannot focus next child of leaf")]
    NextOfLeaf,
    #[error("cannot focus previous child of leaf")]
    PrevOfLeaf,
    #[error("cannot swap root desktop")]
    SwapRoot,
    #[error("invalid sibling index")]
    InvalidSibling,
    #[error("cannot move window to non-leaf desktop")]
    ClaimNonLeaf,
    #[error("no focused window")]
    NoFocusedWindow,
    #[error("window manager error: {0}")]
    WindowManager(String),
}

/// The desktop tree together with the window manager that backs it.
pub struct DesktopTree<W: WindowManager> {
    pub(crate) wm: W,
    pub(crate) nodes: SlotMap<NodeId, Node>,
    root: NodeId,
    /// The leaf currently focused in the window manager.
    pub(crate) focused: NodeId,
    /// The previous focus target, candidate for idle-leaf reclamation.
    pub(crate) last_focused: NodeId,
}

impl<W: WindowManager> DesktopTree<W> {
    /// Create a single-node tree bound to whatever desktop the window
    /// manager currently has focused.
    pub fn new(wm: W) -> Result<Self, W::Error> {
        let desktop_id = wm.focused_desktop()?;
        info!("root bound to desktop {}", desktop_id);

        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(desktop_id, None, 0));
        Ok(Self {
            wm,
            nodes,
            root,
            focused: root,
            last_focused: root,
        })
    }

    //  Accessors

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The leaf currently focused in the window manager.
    pub fn focused(&self) -> NodeId {
        self.focused
    }

    /// The previously focused node.
    pub fn last_focused(&self) -> NodeId {
        self.last_focused
    }

    pub fn wm(&self) -> &W {
        &self.wm
    }

    pub fn wm_mut(&mut self) -> &mut W {
        &mut self.wm
    }

    /// Whether `node` still exists in the tree.
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    /// A read-only view of `node`, or `None` if it has been removed.
    pub fn desktop(&self, node: NodeId) -> Option<Desktop<'_>> {
        self.nodes.contains_key(node).then_some(Desktop {
            nodes: &self.nodes,
            id: node,
        })
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node].parent
    }

    /// The child of `node` at `index`, if in range.
    pub fn child(&self, node: NodeId, index: usize) -> Option<NodeId> {
        self.nodes[node].children.get(index).copied()
    }

    pub fn num_children(&self, node: NodeId) -> usize {
        self.nodes[node].children.len()
    }

    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.nodes[node].is_leaf()
    }

    pub fn desktop_id(&self, node: NodeId) -> &str {
        &self.nodes[node].desktop_id
    }

    /// Position of `node` among its siblings (`0` for the root).
    pub fn index_in_parent(&self, node: NodeId) -> usize {
        self.nodes[node].index_in_parent
    }

    /// Index of the child of `node` that lies on the focus path.
    pub fn focused_child(&self, node: NodeId) -> usize {
        self.nodes[node].focused_child
    }

    /// Number of leaves, i.e. physical desktops managed by the tree.
    pub fn leaf_count(&self) -> usize {
        self.nodes.values().filter(|n| n.is_leaf()).count()
    }

    //  Attributes

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes[node].attrs.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, node: NodeId, name: impl Into<String>, value: impl Into<String>) {
        self.nodes[node].attrs.insert(name.into(), value.into());
    }

    pub fn unset_attr(&mut self, node: NodeId, name: &str) {
        self.nodes[node].attrs.remove(name);
    }

    //  Occupancy

    /// Whether `node` holds any window.
    ///
    /// A leaf asks the window manager about its desktop; an interior node is
    /// occupied when any of its children is.  A failed query counts as
    /// occupied so that nothing is removed on the strength of it.
    pub fn is_occupied(&self, node: NodeId) -> bool {
        let n = &self.nodes[node];
        if !n.is_leaf() {
            return n.children.iter().any(|&c| self.is_occupied(c));
        }
        match self.wm.is_occupied(&n.desktop_id) {
            Ok(occupied) => occupied,
            Err(e) => {
                warn!("occupancy query for {} failed: {}", n.desktop_id, e);
                true
            }
        }
    }

    //  Structural mutations

    /// Append a new leaf to `node` and return it.
    ///
    /// The first child of a leaf takes over the leaf's own desktop (the
    /// desktop is split), and with it the focus if the leaf had it.  Later
    /// children get a fresh desktop from the window manager.
    pub fn add_child(&mut self, node: NodeId) -> Result<NodeId, TreeError> {
        let index = self.nodes[node].children.len();
        let desktop_id = if index == 0 {
            self.nodes[node].desktop_id.clone()
        } else {
            self.wm
                .create_desktop()
                .map_err(|e| TreeError::WindowManager(e.to_string()))?
        };

        debug!("add child {} of {}", index, desktop_id);
        let child = self.nodes.insert(Node::new(desktop_id, Some(node), index));
        self.nodes[node].children.push(child);

        if index == 0 && self.focused == node {
            self.focused = child;
        }
        Ok(child)
    }

    /// Remove the leaf `node`.
    ///
    /// `node` must be an unoccupied leaf other than the root.  Removing the
    /// last child of a node merges the parent back into a leaf.
    pub fn remove(&mut self, node: NodeId) -> Result<(), TreeError> {
        if !self.is_leaf(node) {
            return Err(TreeError::RemoveNonLeaf);
        }
        if self.is_occupied(node) {
            return Err(TreeError::RemoveOccupied);
        }
        if node == self.root {
            return Err(TreeError::RemoveRoot);
        }
        self.remove_leaf(node);
        Ok(())
    }

    /// Remove a leaf without checking preconditions.
    pub(crate) fn remove_leaf(&mut self, node: NodeId) {
        let Some(removed) = self.nodes.remove(node) else {
            return;
        };
        let Some(parent) = removed.parent else {
            return;
        };
        let index = removed.index_in_parent;
        self.nodes[parent].children.remove(index);

        if self.nodes[parent].children.is_empty() {
            debug!("merge {} into its parent", removed.desktop_id);
            let p = &mut self.nodes[parent];
            p.desktop_id = removed.desktop_id;
            p.focused_child = 0;
            if self.focused == node {
                self.focused = parent;
            }
            if self.last_focused == node {
                self.last_focused = parent;
            }
            return;
        }

        debug!("remove desktop {}", removed.desktop_id);
        if let Err(e) = self.wm.destroy_desktop(&removed.desktop_id) {
            warn!("failed to destroy desktop {}: {}", removed.desktop_id, e);
        }

        let shifted: Vec<NodeId> = self.nodes[parent].children[index..].to_vec();
        for sibling in shifted {
            self.nodes[sibling].index_in_parent -= 1;
        }

        let p = &mut self.nodes[parent];
        if p.focused_child > index {
            p.focused_child -= 1;
        } else if p.focused_child == index && p.focused_child >= p.children.len() {
            p.focused_child -= 1;
        }

        if self.focused == node {
            self.focus_descend(parent);
        }
        if self.last_focused == node {
            self.last_focused = self.focused;
        }
    }

    /// Exchange `node` with its sibling at `index`.
    ///
    /// The parent's focused child keeps pointing at the same node, wherever
    /// that node ends up.
    pub fn swap_with(&mut self, node: NodeId, index: usize) -> Result<(), TreeError> {
        let parent = self.nodes[node].parent.ok_or(TreeError::SwapRoot)?;
        let own = self.nodes[node].index_in_parent;
        let p = &self.nodes[parent];
        let other = *p.children.get(index).ok_or(TreeError::InvalidSibling)?;
        let focus_holder = p.children[p.focused_child];

        let p = &mut self.nodes[parent];
        p.children.swap(own, index);
        if focus_holder == node {
            p.focused_child = index;
        } else if focus_holder == other {
            p.focused_child = own;
        }

        self.nodes[other].index_in_parent = own;
        self.nodes[node].index_in_parent = index;
        Ok(())
    }

    /// Swap `node` with the sibling after it; no-op for the last child.
    pub fn swap_next(&mut self, node: NodeId) -> Result<(), TreeError> {
        let parent = self.nodes[node].parent.ok_or(TreeError::SwapRoot)?;
        let index = self.nodes[node].index_in_parent + 1;
        if index < self.nodes[parent].children.len() {
            self.swap_with(node, index)?;
        }
        Ok(())
    }

    /// Swap `node` with the sibling before it; no-op for the first child.
    pub fn swap_prev(&mut self, node: NodeId) -> Result<(), TreeError> {
        if self.nodes[node].parent.is_none() {
            return Err(TreeError::SwapRoot);
        }
        match self.nodes[node].index_in_parent.checked_sub(1) {
            Some(index) => self.swap_with(node, index),
            None => Ok(()),
        }
    }

    /// Move the window that has focus in the window manager onto `node`.
    pub fn claim_focused_window(&mut self, node: NodeId) -> Result<(), TreeError> {
        if !self.is_leaf(node) {
            return Err(TreeError::ClaimNonLeaf);
        }
        if !self.is_occupied(self.focused) {
            return Err(TreeError::NoFocusedWindow);
        }
        let id = &self.nodes[node].desktop_id;
        if let Err(e) = self.wm.claim_focused_window(id) {
            warn!("failed to move focused window to {}: {}", id, e);
        }
        Ok(())
    }

    /// Panic unless every structural invariant holds.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        use std::collections::HashSet;

        assert!(self.nodes[self.root].parent.is_none(), "root has a parent");

        let mut reachable = 0;
        let mut stack = vec![self.root];
        let mut leaf_ids = HashSet::new();
        while let Some(key) = stack.pop() {
            reachable += 1;
            let node = &self.nodes[key];
            if node.is_leaf() {
                assert!(!node.desktop_id.is_empty(), "leaf without desktop id");
                assert!(
                    leaf_ids.insert(node.desktop_id.clone()),
                    "desktop id {} used by two leaves",
                    node.desktop_id
                );
            } else {
                assert!(node.focused_child < node.children.len(), "focused child out of range");
            }
            for (i, &child) in node.children.iter().enumerate() {
                assert_eq!(self.nodes[child].index_in_parent, i, "stale index_in_parent");
                assert_eq!(self.nodes[child].parent, Some(key), "stale parent link");
                stack.push(child);
            }
        }
        assert_eq!(reachable, self.nodes.len(), "detached nodes left in the arena");

        let mut leaf = self.root;
        while !self.nodes[leaf].is_leaf() {
            leaf = self.nodes[leaf].children[self.nodes[leaf].focused_child];
        }
        assert_eq!(leaf, self.focused, "focus path does not end at the focused leaf");
        assert!(self.nodes.contains_key(self.last_focused), "last focused is dangling");
    }
}

//  Read-only view

/// A borrowed, read-only view of one node, handed to
/// [`Formatter`](crate::traits::Formatter)s.
#[derive(Clone, Copy)]
pub struct Desktop<'a> {
    nodes: &'a SlotMap<NodeId, Node>,
    id: NodeId,
}

impl<'a> Desktop<'a> {
    fn node(&self) -> &'a Node {
        &self.nodes[self.id]
    }

    fn view(&self, id: NodeId) -> Desktop<'a> {
        Desktop {
            nodes: self.nodes,
            id,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn desktop_id(&self) -> &'a str {
        &self.node().desktop_id
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.node().attrs.get(name).map(String::as_str)
    }

    /// All attributes, sorted by key.
    pub fn sorted_attrs(&self) -> Vec<(&'a str, &'a str)> {
        let mut attrs: Vec<_> = self
            .node()
            .attrs
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        attrs.sort_unstable();
        attrs
    }

    pub fn is_leaf(&self) -> bool {
        self.node().is_leaf()
    }

    pub fn num_children(&self) -> usize {
        self.node().children.len()
    }

    /// Index of the focused child, or `None` for a leaf.
    pub fn focused_child(&self) -> Option<usize> {
        (!self.is_leaf()).then_some(self.node().focused_child)
    }

    pub fn child(&self, index: usize) -> Option<Desktop<'a>> {
        self.node().children.get(index).map(|&c| self.view(c))
    }

    pub fn children(&self) -> impl Iterator<Item = Desktop<'a>> + 'a {
        let nodes = self.nodes;
        self.node()
            .children
            .iter()
            .map(move |&id| Desktop { nodes, id })
    }

    pub fn parent(&self) -> Option<Desktop<'a>> {
        self.node().parent.map(|p| self.view(p))
    }
}

//  Tests
