//! Depth-first traversals over a subtree.
//!
//! Both iterators borrow the tree, so links cannot change while a traversal is
//! alive. Each call yields a fresh, lazy sequence; an exhausted one stays
//! exhausted.

use std::iter::FusedIterator;

use crate::arena::{NodeId, Tree};
use crate::hooks::NoHooks;
use crate::node::NodeRef;

type Predicate<'a, T, H> = Box<dyn FnMut(&NodeRef<'a, T, H>) -> bool + 'a>;

/// Options shared by both traversal orders.
struct Walk<'a, T: 'a, H: 'a> {
    filter: Option<Predicate<'a, T, H>>,
    stop: Option<Predicate<'a, T, H>>,
    max_depth: Option<usize>,
}

impl<'a, T, H> Walk<'a, T, H> {
    fn new() -> Self {
        Self {
            filter: None,
            stop: None,
            max_depth: None,
        }
    }

    /// Filtering only decides what is yielded, never what is descended into.
    fn yields(&mut self, node: &NodeRef<'a, T, H>) -> bool {
        self.filter.as_mut().map_or(true, |filter| filter(node))
    }

    fn prunes(&mut self, node: &NodeRef<'a, T, H>) -> bool {
        self.stop.as_mut().is_some_and(|stop| stop(node))
    }

    fn descends(&self, depth: usize) -> bool {
        self.max_depth.map_or(true, |max| depth < max)
    }
}

/// Node first, then each child subtree in child order.
pub struct PreOrderIter<'a, T, H = NoHooks> {
    tree: &'a Tree<T, H>,
    stack: Vec<(NodeId, usize)>,
    walk: Walk<'a, T, H>,
}

impl<'a, T, H> PreOrderIter<'a, T, H> {
    pub(crate) fn new(tree: &'a Tree<T, H>, start: NodeId) -> Self {
        Self {
            tree,
            stack: vec![(start, 0)],
            walk: Walk::new(),
        }
    }

    /// Yield only nodes matching `filter`; their subtrees are still walked.
    pub fn with_filter(mut self, filter: impl FnMut(&NodeRef<'a, T, H>) -> bool + 'a) -> Self {
        self.walk.filter = Some(Box::new(filter));
        self
    }

    /// Skip nodes matching `stop` together with their subtrees.
    pub fn with_stop(mut self, stop: impl FnMut(&NodeRef<'a, T, H>) -> bool + 'a) -> Self {
        self.walk.stop = Some(Box::new(stop));
        self
    }

    /// Visit nodes at most `max_depth` edges below the start node.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.walk.max_depth = Some(max_depth);
        self
    }
}

impl<'a, T, H> Iterator for PreOrderIter<'a, T, H> {
    type Item = NodeRef<'a, T, H>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, depth)) = self.stack.pop() {
            let Some(node) = self.tree.get(id) else {
                continue;
            };
            if self.walk.prunes(&node) {
                continue;
            }
            if self.walk.descends(depth) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children().iter().rev() {
                    self.stack.push((child, depth + 1));
                }
            }
            if self.walk.yields(&node) {
                return Some(node);
            }
        }
        None
    }
}

impl<T, H> FusedIterator for PreOrderIter<'_, T, H> {}

/// Each child subtree in child order, then the node itself.
pub struct PostOrderIter<'a, T, H = NoHooks> {
    tree: &'a Tree<T, H>,
    stack: Vec<(NodeId, usize, bool)>,
    walk: Walk<'a, T, H>,
}

impl<'a, T, H> PostOrderIter<'a, T, H> {
    pub(crate) fn new(tree: &'a Tree<T, H>, start: NodeId) -> Self {
        Self {
            tree,
            stack: vec![(start, 0, false)],
            walk: Walk::new(),
        }
    }

    /// Yield only nodes matching `filter`; their subtrees are still walked.
    pub fn with_filter(mut self, filter: impl FnMut(&NodeRef<'a, T, H>) -> bool + 'a) -> Self {
        self.walk.filter = Some(Box::new(filter));
        self
    }

    /// Skip nodes matching `stop` together with their subtrees.
    pub fn with_stop(mut self, stop: impl FnMut(&NodeRef<'a, T, H>) -> bool + 'a) -> Self {
        self.walk.stop = Some(Box::new(stop));
        self
    }

    /// Visit nodes at most `max_depth` edges below the start node.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.walk.max_depth = Some(max_depth);
        self
    }
}

impl<'a, T, H> Iterator for PostOrderIter<'a, T, H> {
    type Item = NodeRef<'a, T, H>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, depth, expanded)) = self.stack.pop() {
            let Some(node) = self.tree.get(id) else {
                continue;
            };
            if expanded {
                if self.walk.yields(&node) {
                    return Some(node);
                }
                continue;
            }
            if self.walk.prunes(&node) {
                continue;
            }
            self.stack.push((id, depth, true));
            if self.walk.descends(depth) {
                for &child in node.children().iter().rev() {
                    self.stack.push((child, depth + 1, false));
                }
            }
        }
        None
    }
}

impl<T, H> FusedIterator for PostOrderIter<'_, T, H> {}
