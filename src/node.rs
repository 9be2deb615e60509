use std::fmt;
use std::iter::FusedIterator;
use std::ptr;

use crate::arena::{NodeId, Tree, TreeNode};
use crate::hooks::NoHooks;
use crate::iter::{PostOrderIter, PreOrderIter};

/// Read-only cursor on a node of a [`Tree`].
///
/// All structural queries are derived from the current links on every call,
/// nothing is cached.
pub struct NodeRef<'a, T, H = NoHooks> {
    tree: &'a Tree<T, H>,
    id: NodeId,
    node: &'a TreeNode<T>,
}

impl<'a, T, H> NodeRef<'a, T, H> {
    pub(crate) fn new(tree: &'a Tree<T, H>, id: NodeId, node: &'a TreeNode<T>) -> Self {
        Self { tree, id, node }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn data(&self) -> &'a T {
        &self.node.data
    }

    pub fn tree(&self) -> &'a Tree<T, H> {
        self.tree
    }

    pub fn parent(&self) -> Option<NodeRef<'a, T, H>> {
        self.node.parent.and_then(|parent| self.tree.get(parent))
    }

    pub fn children(&self) -> &'a [NodeId] {
        &self.node.children
    }

    pub fn is_root(&self) -> bool {
        self.node.parent.is_none()
    }

    /// No children (external node).
    pub fn is_leaf(&self) -> bool {
        self.node.children.is_empty()
    }

    /// Iterates from this node up to the root, this node first.
    pub fn path_reverse(&self) -> PathReverse<'a, T, H> {
        PathReverse { next: Some(*self) }
    }

    /// Nodes from the root down to this node, both included.
    pub fn path(&self) -> Vec<NodeId> {
        let mut path: Vec<NodeId> = self.path_reverse().map(|n| n.id).collect();
        path.reverse();
        path
    }

    /// Path of the parent: root first, parent last. Empty for roots.
    pub fn ancestors(&self) -> Vec<NodeId> {
        self.parent().map(|p| p.path()).unwrap_or_default()
    }

    pub fn root(&self) -> NodeRef<'a, T, H> {
        let mut current = *self;
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Number of edges to the root.
    pub fn depth(&self) -> usize {
        self.path_reverse().count() - 1
    }

    /// Number of edges on the longest downward path to a leaf.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack = vec![(self.node, 0)];
        while let Some((node, depth)) = stack.pop() {
            height = height.max(depth);
            stack.extend(
                node.children
                    .iter()
                    .filter_map(|&child| self.tree.node(child).ok())
                    .map(|child| (child, depth + 1)),
            );
        }
        height
    }

    /// Number of nodes in the subtree rooted here, this node included.
    pub fn size(&self) -> usize {
        self.pre_order().count()
    }

    /// Children of the parent except this node. Empty for roots.
    pub fn siblings(&self) -> Vec<NodeId> {
        self.parent()
            .map(|parent| {
                parent
                    .children()
                    .iter()
                    .copied()
                    .filter(|&id| id != self.id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All nodes below this one, in pre-order.
    pub fn descendants(&self) -> Vec<NodeId> {
        self.pre_order().skip(1).map(|n| n.id).collect()
    }

    /// Nodes of the subtree without children, in pre-order. A leaf is its own
    /// only leaf.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.pre_order()
            .with_filter(|n| n.is_leaf())
            .map(|n| n.id)
            .collect()
    }

    pub fn pre_order(&self) -> PreOrderIter<'a, T, H> {
        PreOrderIter::new(self.tree, self.id)
    }

    pub fn post_order(&self) -> PostOrderIter<'a, T, H> {
        PostOrderIter::new(self.tree, self.id)
    }
}

impl<T, H> Clone for NodeRef<'_, T, H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, H> Copy for NodeRef<'_, T, H> {}

/// Identity comparison: same tree, same handle. Payloads are never compared.
impl<T, H> PartialEq for NodeRef<'_, T, H> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && ptr::eq(self.tree, other.tree)
    }
}

impl<T, H> Eq for NodeRef<'_, T, H> {}

impl<T: fmt::Debug, H> fmt::Debug for NodeRef<'_, T, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("data", &self.node.data)
            .finish()
    }
}

/// Upward walk produced by [`NodeRef::path_reverse`].
pub struct PathReverse<'a, T, H = NoHooks> {
    next: Option<NodeRef<'a, T, H>>,
}

impl<'a, T, H> Iterator for PathReverse<'a, T, H> {
    type Item = NodeRef<'a, T, H>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}

impl<T, H> FusedIterator for PathReverse<'_, T, H> {}

#[cfg(test)]
mod tests {
    use crate::arena::Tree;

    #[test]
    fn test_single_node_queries() {
        let mut tree = Tree::new();
        let udo = tree.insert("Udo");
        let node = tree.get(udo).unwrap();

        assert!(node.is_root());
        assert!(node.is_leaf());
        assert_eq!(node.depth(), 0);
        assert_eq!(node.height(), 0);
        assert_eq!(node.size(), 1);
        assert_eq!(node.path(), vec![udo]);
        assert!(node.ancestors().is_empty());
        assert!(node.siblings().is_empty());
        assert!(node.descendants().is_empty());
        assert_eq!(node.leaves(), vec![udo]);
        assert_eq!(node.root().id(), udo);
    }

    #[test]
    fn test_path_reverse_walks_to_root() {
        let mut tree = Tree::new();
        let udo = tree.insert("Udo");
        let marc = tree.insert_with("Marc", Some(udo), vec![]).unwrap();
        let lian = tree.insert_with("Lian", Some(marc), vec![]).unwrap();

        let names: Vec<&str> = tree
            .get(lian)
            .unwrap()
            .path_reverse()
            .map(|n| *n.data())
            .collect();
        assert_eq!(names, vec!["Lian", "Marc", "Udo"]);
        assert_eq!(tree.get(lian).unwrap().path(), vec![udo, marc, lian]);
        assert_eq!(tree.get(lian).unwrap().ancestors(), vec![udo, marc]);
    }

    #[test]
    fn test_equal_payloads_are_distinct_nodes() {
        let mut tree = Tree::new();
        let r = tree.insert((0, 0));
        let a = tree.insert_with((1, 0), Some(r), vec![]).unwrap();
        let b = tree.insert_with((1, 0), Some(r), vec![]).unwrap();

        let (na, nb) = (tree.get(a).unwrap(), tree.get(b).unwrap());
        assert_eq!(na.data(), nb.data());
        assert_ne!(na, nb);
        assert_eq!(na.parent().unwrap().id(), r);
        assert_eq!(nb.parent().unwrap().id(), r);
        assert_eq!(na.siblings(), vec![b]);
    }
}
