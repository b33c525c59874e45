//! Focus handling for the [`DesktopTree`].
//!
//! Every interior node remembers which child lies on the *focus path*.
//! Focusing a node first points every ancestor at it, then walks the path
//! down to a leaf and asks the window manager to show that leaf's desktop.
//!
//! Moving focus away from an empty leaf that has siblings removes that leaf
//! again (idle-leaf reclamation), so scratch desktops that were opened and
//! never used do not pile up.

use crate::traits::WindowManager;
use crate::tree::{DesktopTree, NodeId, TreeError};
use log::{debug, warn};

impl<W: WindowManager> DesktopTree<W> {
    /// Focus `node`, descending along the focus path if it is not a leaf.
    ///
    /// Re-focusing the leaf that already has focus is a no-op: no window
    /// manager call is made and [`last_focused`](Self::last_focused) is
    /// left alone.
    pub fn focus(&mut self, node: NodeId) {
        self.focus_indices(node);
        if !self.focus_descend(node) {
            return;
        }

        let last = self.last_focused;
        if self.is_reclaimable(last) {
            debug!("reclaiming idle desktop {}", self.nodes[last].desktop_id);
            self.remove_leaf(last);
            self.last_focused = self.focused;
        }
    }

    /// Advance the focused child of `node`.
    ///
    /// At the last child, a new child is appended and focused if the last
    /// one holds windows; an empty last child is left focused.
    pub fn focus_next(&mut self, node: NodeId) -> Result<(), TreeError> {
        let n = &self.nodes[node];
        if n.is_leaf() {
            return Err(TreeError::NextOfLeaf);
        }
        if n.focused_child + 1 == n.children.len() {
            let last = n.children[n.focused_child];
            if !self.is_occupied(last) {
                return Ok(());
            }
            self.add_child(node)?;
        }
        self.nodes[node].focused_child += 1;
        self.focus(node);
        Ok(())
    }

    /// Move the focused child of `node` one step back; no-op at the first.
    pub fn focus_prev(&mut self, node: NodeId) -> Result<(), TreeError> {
        let n = &mut self.nodes[node];
        if n.is_leaf() {
            return Err(TreeError::PrevOfLeaf);
        }
        if n.focused_child > 0 {
            n.focused_child -= 1;
            self.focus(node);
        }
        Ok(())
    }

    /// The leaf reached by following the focus path down from `node`.
    pub fn focus_path_leaf(&self, node: NodeId) -> NodeId {
        let mut current = node;
        loop {
            let n = &self.nodes[current];
            match n.children.get(n.focused_child) {
                Some(&child) => current = child,
                None => return current,
            }
        }
    }

    /// Point every ancestor of `node` at the child leading to it.
    fn focus_indices(&mut self, node: NodeId) {
        let mut current = node;
        while let Some(parent) = self.nodes[current].parent {
            self.nodes[parent].focused_child = self.nodes[current].index_in_parent;
            current = parent;
        }
    }

    /// Focus the leaf at the end of `node`'s focus path.
    ///
    /// Returns `false` when that leaf already had focus.
    pub(crate) fn focus_descend(&mut self, node: NodeId) -> bool {
        let leaf = self.focus_path_leaf(node);
        if leaf == self.focused {
            return false;
        }

        let id = &self.nodes[leaf].desktop_id;
        debug!("focus desktop {}", id);
        if let Err(e) = self.wm.focus_desktop(id) {
            warn!("failed to focus desktop {}: {}", id, e);
        }
        self.last_focused = self.focused;
        self.focused = leaf;
        true
    }

    fn is_reclaimable(&self, node: NodeId) -> bool {
        let n = &self.nodes[node];
        n.is_leaf()
            && n.parent
                .is_some_and(|p| self.nodes[p].children.len() > 1)
            && !self.is_occupied(node)
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecorderWm;
    use proptest::prelude::*;

    fn make_tree() -> DesktopTree<RecorderWm> {
        DesktopTree::new(RecorderWm::new("mon0")).unwrap()
    }

    fn split_root(n: usize) -> (DesktopTree<RecorderWm>, Vec<NodeId>) {
        let mut t = make_tree();
        let root = t.root();
        let children = (0..n).map(|_| t.add_child(root).unwrap()).collect();
        (t, children)
    }

    #[test]
    fn focus_calls_window_manager_and_tracks_last() {
        let (mut t, c) = split_root(2);
        t.wm().occupy("mon0");
        t.focus(c[1]);
        assert_eq!(t.focused(), c[1]);
        assert_eq!(t.last_focused(), c[0]);
        assert_eq!(t.focused_child(t.root()), 1);
        assert_eq!(*t.wm().focus_calls.borrow(), vec!["desk0".to_string()]);
        t.assert_invariants();
    }

    #[test]
    fn refocusing_focused_leaf_is_a_noop() {
        let (mut t, c) = split_root(2);
        t.wm().occupy("mon0");
        t.focus(c[1]);
        let last = t.last_focused();
        t.focus(c[1]);
        t.focus(t.root());
        assert_eq!(t.wm().focus_calls.borrow().len(), 1);
        assert_eq!(t.last_focused(), last);
        t.assert_invariants();
    }

    #[test]
    fn focusing_away_from_empty_leaf_reclaims_it() {
        let (mut t, c) = split_root(3);
        let before = t.leaf_count();
        t.focus(c[2]);
        assert!(!t.contains(c[0]));
        assert_eq!(t.leaf_count(), before - 1);
        assert_eq!(t.wm().destroyed, vec!["mon0".to_string()]);
        assert_eq!(t.last_focused(), c[2]);
        t.assert_invariants();
    }

    #[test]
    fn occupied_leaf_survives_focus_change() {
        let (mut t, c) = split_root(3);
        t.wm().occupy("mon0");
        t.focus(c[2]);
        assert!(t.contains(c[0]));
        assert_eq!(t.leaf_count(), 3);
        t.assert_invariants();
    }

    #[test]
    fn only_child_is_not_reclaimed() {
        let mut t = make_tree();
        let root = t.root();
        let a = t.add_child(root).unwrap();
        let inner = t.add_child(root).unwrap();
        t.wm().occupy("mon0");
        let x = t.add_child(inner).unwrap();
        t.focus(x);
        t.wm().vacate("mon0");

        // `x` is the only child of `inner`; leaving it must keep it.
        t.focus(a);
        assert!(t.contains(x));
        t.assert_invariants();
    }

    #[test]
    fn split_focus_scenario() {
        let mut t = make_tree();
        let r = t.root();
        let c0 = t.add_child(r).unwrap();
        let c1 = t.add_child(r).unwrap();
        assert_eq!(t.desktop_id(c0), "mon0");
        assert_eq!(t.desktop_id(c1), "desk0");
        assert_eq!(t.focused_child(r), 0);
        assert_eq!(t.focused(), c0);

        t.focus(c1);
        assert_eq!(t.focused(), c1);
        // c0 was empty and had a sibling, so it is gone.
        assert!(!t.contains(c0));
        assert_eq!(t.num_children(r), 1);
        assert_eq!(t.index_in_parent(c1), 0);
        assert_eq!(t.focused_child(r), 0);
        t.assert_invariants();

        // Removing the survivor merges it back into the root.
        t.remove(c1).unwrap();
        assert!(t.is_leaf(r));
        assert_eq!(t.desktop_id(r), "desk0");
        assert_eq!(t.focused(), r);
        t.assert_invariants();
    }

    #[test]
    fn focus_next_moves_along_children() {
        let (mut t, c) = split_root(3);
        let root = t.root();
        t.wm().occupy("mon0");
        t.focus_next(root).unwrap();
        assert_eq!(t.focused(), c[1]);
        t.focus_next(root).unwrap();
        assert_eq!(t.focused(), c[2]);
        // c[1] was empty and is reclaimed on the way.
        assert!(!t.contains(c[1]));
        t.assert_invariants();
    }

    #[test]
    fn focus_next_at_end_grows_when_occupied() {
        let (mut t, c) = split_root(2);
        let root = t.root();
        t.wm().occupy("mon0");
        t.wm().occupy("desk0");
        t.focus(c[1]);

        t.focus_next(root).unwrap();
        assert_eq!(t.num_children(root), 3);
        assert_eq!(t.focused_child(root), 2);
        assert_eq!(t.desktop_id(t.focused()), "desk1");
        t.assert_invariants();
    }

    #[test]
    fn focus_next_at_end_stays_when_empty() {
        let (mut t, c) = split_root(2);
        let root = t.root();
        t.wm().occupy("mon0");
        t.focus(c[1]);
        let calls = t.wm().focus_calls.borrow().len();

        t.focus_next(root).unwrap();
        assert_eq!(t.num_children(root), 2);
        assert_eq!(t.focused(), c[1]);
        assert_eq!(t.wm().focus_calls.borrow().len(), calls);
    }

    #[test]
    fn focus_prev_stops_at_first_child() {
        let (mut t, c) = split_root(2);
        let root = t.root();
        t.wm().occupy("mon0");
        t.wm().occupy("desk0");
        t.focus(c[1]);
        t.focus_prev(root).unwrap();
        assert_eq!(t.focused(), c[0]);
        t.focus_prev(root).unwrap();
        assert_eq!(t.focused(), c[0]);
        t.assert_invariants();
    }

    #[test]
    fn next_and_prev_reject_leaves() {
        let mut t = make_tree();
        let root = t.root();
        assert_eq!(t.focus_next(root), Err(TreeError::NextOfLeaf));
        assert_eq!(t.focus_prev(root), Err(TreeError::PrevOfLeaf));
    }

    #[test]
    fn focusing_interior_node_descends_its_path() {
        let mut t = make_tree();
        let root = t.root();
        let a = t.add_child(root).unwrap();
        let b = t.add_child(root).unwrap();
        t.wm().occupy("mon0");
        let b0 = t.add_child(b).unwrap();
        let b1 = t.add_child(b).unwrap();
        t.wm().occupy("desk1");
        t.focus(b1);
        t.focus(a);
        assert_eq!(t.focused(), a);

        t.focus(b);
        assert_eq!(t.focused(), b1);
        assert!(t.contains(b0));
        t.assert_invariants();
    }

    //  Invariant preservation over random operation sequences

    #[derive(Debug, Clone)]
    enum Op {
        Add(usize),
        Remove(usize),
        Focus(usize),
        Next(usize),
        Prev(usize),
        Swap(usize, usize),
        Occupy(usize),
        Vacate(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            any::<usize>().prop_map(Op::Add),
            any::<usize>().prop_map(Op::Remove),
            any::<usize>().prop_map(Op::Focus),
            any::<usize>().prop_map(Op::Next),
            any::<usize>().prop_map(Op::Prev),
            (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::Swap(a, b)),
            any::<usize>().prop_map(Op::Occupy),
            any::<usize>().prop_map(Op::Vacate),
        ]
    }

    /// Every live node, in depth-first order.
    fn live_nodes(t: &DesktopTree<RecorderWm>) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![t.root()];
        while let Some(n) = stack.pop() {
            out.push(n);
            for i in (0..t.num_children(n)).rev() {
                stack.extend(t.child(n, i));
            }
        }
        out
    }

    proptest! {
        #[test]
        fn invariants_hold_after_every_operation(ops in prop::collection::vec(op(), 1..60)) {
            let mut t = make_tree();
            for op in ops {
                let nodes = live_nodes(&t);
                let pick = |i: usize| nodes[i % nodes.len()];
                match op {
                    Op::Add(i) => { let _ = t.add_child(pick(i)); }
                    Op::Remove(i) => { let _ = t.remove(pick(i)); }
                    Op::Focus(i) => t.focus(pick(i)),
                    Op::Next(i) => { let _ = t.focus_next(pick(i)); }
                    Op::Prev(i) => { let _ = t.focus_prev(pick(i)); }
                    Op::Swap(i, j) => {
                        let n = pick(i);
                        if let Some(p) = t.parent(n) {
                            let index = j % t.num_children(p);
                            t.swap_with(n, index).unwrap();
                        }
                    }
                    Op::Occupy(i) => {
                        let id = t.desktop_id(pick(i)).to_string();
                        t.wm().occupy(&id);
                    }
                    Op::Vacate(i) => {
                        let id = t.desktop_id(pick(i)).to_string();
                        t.wm().vacate(&id);
                    }
                }
                t.assert_invariants();
            }
        }
    }
}
