use std::fmt;

use generational_arena::{Arena, Index};
use itertools::Itertools;
use tracing::{debug, error, instrument, trace, warn};

use crate::config::Settings;
use crate::errors::{TreeError, TreeResult};
use crate::hooks::{LinkHooks, NoHooks};
use crate::iter::{PostOrderIter, PreOrderIter};
use crate::node::NodeRef;
use crate::snapshot::LinkSnapshot;

/// Handle of a node inside a [`Tree`].
///
/// Identity of a node is the identity of its handle: two nodes carrying equal
/// payloads are still different nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Index);

impl From<Index> for NodeId {
    fn from(index: Index) -> Self {
        Self(index)
    }
}

impl From<NodeId> for Index {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "#{}.{}", slot, generation)
    }
}

/// Arena slot: payload plus both halves of the parent/child link.
#[derive(Debug)]
pub(crate) struct TreeNode<T> {
    pub(crate) data: T,
    /// None for root nodes
    pub(crate) parent: Option<NodeId>,
    /// Insertion ordered, never contains duplicates
    pub(crate) children: Vec<NodeId>,
}

/// Arena-backed forest of nodes with bidirectional parent/child links.
///
/// Every structural change goes through `set_parent`, `set_children` or
/// `clear_children`, which run the [`LinkHooks`] of the tree around each edit.
/// After any public mutation returns, for every node `n` with parent `p`,
/// `n` appears exactly once in `p`'s children and nowhere else.
#[derive(Debug)]
pub struct Tree<T, H = NoHooks> {
    arena: Arena<TreeNode<T>>,
    hooks: H,
    settings: Settings,
}

impl<T> Default for Tree<T, NoHooks> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tree<T, NoHooks> {
    pub fn new() -> Self {
        Self::with_hooks(NoHooks)
    }
}

impl<T, H> Tree<T, H> {
    pub fn with_hooks(hooks: H) -> Self {
        Self::with_settings(Settings::default(), hooks)
    }

    pub fn with_settings(settings: Settings, hooks: H) -> Self {
        Self {
            arena: Arena::with_capacity(settings.initial_capacity.max(1)),
            hooks,
            settings,
        }
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Number of live nodes across all trees of the forest.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.0)
    }

    /// Creates a standalone node: no parent, no children.
    #[instrument(level = "trace", skip(self, data))]
    pub fn insert(&mut self, data: T) -> NodeId {
        let id = NodeId(self.arena.insert(TreeNode {
            data,
            parent: None,
            children: Vec::new(),
        }));
        trace!(%id, "inserted node");
        id
    }

    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_, T, H>> {
        self.arena.get(id.0).map(|node| NodeRef::new(self, id, node))
    }

    pub fn data(&self, id: NodeId) -> Option<&T> {
        self.arena.get(id.0).map(|node| &node.data)
    }

    pub fn data_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.arena.get_mut(id.0).map(|node| &mut node.data)
    }

    pub fn parent(&self, id: NodeId) -> TreeResult<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> TreeResult<&[NodeId]> {
        Ok(self.node(id)?.children.as_slice())
    }

    /// All nodes without a parent, in arena slot order.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.arena
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(index, _)| NodeId(index))
    }

    /// Pre-order walk of the subtree rooted at `id`; empty if `id` is unknown.
    pub fn pre_order(&self, id: NodeId) -> PreOrderIter<'_, T, H> {
        PreOrderIter::new(self, id)
    }

    /// Post-order walk of the subtree rooted at `id`; empty if `id` is unknown.
    pub fn post_order(&self, id: NodeId) -> PostOrderIter<'_, T, H> {
        PostOrderIter::new(self, id)
    }

    /// Checks the bidirectional link invariant over the whole arena.
    #[instrument(level = "debug", skip(self))]
    pub fn verify(&self) -> TreeResult<()> {
        for (index, node) in self.arena.iter() {
            let id = NodeId(index);
            if let Some(parent) = node.parent {
                let listed = self
                    .arena
                    .get(parent.0)
                    .map(|p| p.children.iter().filter(|&&c| c == id).count())
                    .ok_or_else(|| corrupted(format!("{} points to missing parent {}", id, parent)))?;
                if listed != 1 {
                    return Err(corrupted(format!(
                        "{} listed {} times among children of its parent {}",
                        id, listed, parent
                    )));
                }
            }
            if let Some(dup) = node.children.iter().duplicates().next() {
                return Err(corrupted(format!("{} listed twice under {}", dup, id)));
            }
            for &child in &node.children {
                let back = self
                    .arena
                    .get(child.0)
                    .ok_or_else(|| corrupted(format!("{} lists missing child {}", id, child)))?
                    .parent;
                if back != Some(id) {
                    return Err(corrupted(format!(
                        "{} lists {} as child but its parent is {:?}",
                        id, child, back
                    )));
                }
            }
            // a chain longer than the arena can only be a cycle
            if self.ancestor_ids(id).nth(self.arena.len()).is_some() {
                return Err(corrupted(format!("{} is part of a cycle", id)));
            }
        }
        Ok(())
    }

    pub(crate) fn node(&self, id: NodeId) -> TreeResult<&TreeNode<T>> {
        self.arena.get(id.0).ok_or(TreeError::InvalidNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> TreeResult<&mut TreeNode<T>> {
        self.arena.get_mut(id.0).ok_or(TreeError::InvalidNode(id))
    }

    /// Walks parent links upward, starting with `id` itself.
    fn ancestor_ids(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |current| {
            self.arena.get(current.0).and_then(|node| node.parent)
        })
    }

    /// Rejects `node` as a child of `parent` when `node` is `parent` or one of
    /// its ancestors. Bounded by the depth of `parent`.
    pub(crate) fn check_loop(&self, node: NodeId, parent: NodeId) -> TreeResult<()> {
        if node == parent {
            return Err(TreeError::SelfParent(node));
        }
        if self.ancestor_ids(parent).any(|ancestor| ancestor == node) {
            return Err(TreeError::Loop { node, parent });
        }
        Ok(())
    }

    /// Raw attach without hooks. Both halves of the link are written together.
    pub(crate) fn link(
        &mut self,
        child: NodeId,
        parent: NodeId,
        position: Option<usize>,
    ) -> TreeResult<()> {
        if self.node(child)?.parent.is_some() {
            return Err(corrupted(format!("{} is still attached", child)));
        }
        let siblings = &mut self.node_mut(parent)?.children;
        if siblings.contains(&child) {
            return Err(corrupted(format!("{} already listed under {}", child, parent)));
        }
        let at = position.map_or(siblings.len(), |p| p.min(siblings.len()));
        siblings.insert(at, child);
        self.node_mut(child)?.parent = Some(parent);
        trace!(%child, %parent, at, "linked");
        Ok(())
    }

    /// Raw detach without hooks; returns the former parent and position.
    pub(crate) fn unlink(&mut self, child: NodeId) -> TreeResult<Option<(NodeId, usize)>> {
        let Some(parent) = self.node(child)?.parent else {
            return Ok(None);
        };
        let siblings = &mut self.node_mut(parent)?.children;
        let position = siblings
            .iter()
            .position(|&c| c == child)
            .ok_or_else(|| corrupted(format!("{} missing from children of {}", child, parent)))?;
        siblings.remove(position);
        self.node_mut(child)?.parent = None;
        trace!(%child, %parent, position, "unlinked");
        Ok(Some((parent, position)))
    }

    /// Current parent of `id` and its index among that parent's children.
    pub(crate) fn placement(&self, id: NodeId) -> TreeResult<Option<(NodeId, usize)>> {
        let Some(parent) = self.node(id)?.parent else {
            return Ok(None);
        };
        let position = self
            .node(parent)?
            .children
            .iter()
            .position(|&c| c == id)
            .ok_or_else(|| corrupted(format!("{} missing from children of {}", id, parent)))?;
        Ok(Some((parent, position)))
    }

    /// Rejects unknown handles and nodes listed more than once.
    fn validate_children(&self, children: &[NodeId]) -> TreeResult<()> {
        for &child in children {
            self.node(child)?;
        }
        if let Some(&dup) = children.iter().duplicates().next() {
            return Err(TreeError::DuplicateChild(dup));
        }
        Ok(())
    }

    fn verify_if_enabled(&self) -> TreeResult<()> {
        if self.settings.verify_links {
            self.verify()?;
        }
        Ok(())
    }
}

impl<T, H: LinkHooks<T>> Tree<T, H> {
    /// Creates a node and attaches it like a later `set_parent` followed by
    /// `set_children` would. On failure the new node is discarded again.
    ///
    /// Unknown handles, duplicate children and loops are rejected before any
    /// hook runs.
    #[instrument(level = "debug", skip(self, data))]
    pub fn insert_with(
        &mut self,
        data: T,
        parent: Option<NodeId>,
        children: Vec<NodeId>,
    ) -> TreeResult<NodeId> {
        let id = self.insert(data);
        if let Err(e) = self.attach_initial(id, parent, children) {
            debug!(%id, error = %e, "discarding node after failed construction");
            if self.detach_with_hooks(id).is_err() {
                self.unlink(id)?;
            }
            self.arena.remove(id.0);
            return Err(e);
        }
        Ok(id)
    }

    fn attach_initial(
        &mut self,
        id: NodeId,
        parent: Option<NodeId>,
        children: Vec<NodeId>,
    ) -> TreeResult<()> {
        self.validate_children(&children)?;
        if let Some(parent) = parent {
            self.node(parent)?;
            // once attached, the ancestors of `id` are those of `parent`
            for &child in &children {
                if self.ancestor_ids(parent).any(|ancestor| ancestor == child) {
                    return Err(TreeError::Loop { node: child, parent: id });
                }
            }
            self.set_parent(id, Some(parent))?;
        }
        if !children.is_empty() {
            self.set_children(id, children)?;
        }
        Ok(())
    }

    /// Moves `node` under `parent`, or detaches it when `parent` is `None`.
    ///
    /// Setting the current parent again is a no-op that runs no hooks.
    #[instrument(level = "debug", skip(self))]
    pub fn set_parent(&mut self, node: NodeId, parent: Option<NodeId>) -> TreeResult<()> {
        let current = self.node(node)?.parent;
        if let Some(new_parent) = parent {
            self.node(new_parent)?;
            self.check_loop(node, new_parent)?;
        }
        if current == parent {
            return Ok(());
        }
        self.reparent(node, parent)?;
        self.verify_if_enabled()
    }

    pub fn detach(&mut self, node: NodeId) -> TreeResult<()> {
        self.set_parent(node, None)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        self.set_parent(child, Some(parent))
    }

    /// Replaces all children of `node` with `children`, in order.
    ///
    /// Duplicates and loops are rejected before anything changes. If a hook
    /// fails midway, the previous links of `node` and of every candidate are
    /// restored before the error is returned.
    #[instrument(level = "debug", skip(self))]
    pub fn set_children(&mut self, node: NodeId, children: Vec<NodeId>) -> TreeResult<()> {
        self.node(node)?;
        self.validate_children(&children)?;
        for &child in &children {
            self.check_loop(child, node)?;
        }

        let snapshot = LinkSnapshot::capture(self, node, &children)?;
        if let Err(e) = self.replace_children(node, &children) {
            warn!(%node, error = %e, "child replacement failed, rolling back");
            snapshot.restore(self)?;
            return Err(e);
        }
        self.verify_if_enabled()
    }

    /// Detaches every child of `node`, running the single-node hooks for each
    /// and the batch hooks around the whole operation.
    #[instrument(level = "debug", skip(self))]
    pub fn clear_children(&mut self, node: NodeId) -> TreeResult<()> {
        self.detach_children(node)?;
        self.verify_if_enabled()
    }

    /// Detaches `node` and frees it together with its descendants.
    ///
    /// Returns the payloads in pre-order. Handles to removed nodes become
    /// invalid.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_subtree(&mut self, node: NodeId) -> TreeResult<Vec<T>> {
        self.set_parent(node, None)?;
        let ids: Vec<NodeId> = self.pre_order(node).map(|n| n.id()).collect();
        let removed: Vec<T> = ids
            .into_iter()
            .filter_map(|id| self.arena.remove(id.0))
            .map(|slot| slot.data)
            .collect();
        debug!(%node, count = removed.len(), "removed subtree");
        Ok(removed)
    }

    /// A move is all-or-nothing up to the new link: if the detach half or
    /// `pre_attach` fails, `node` goes back to its previous parent and position.
    fn reparent(&mut self, node: NodeId, parent: Option<NodeId>) -> TreeResult<()> {
        let Some(parent) = parent else {
            return self.detach_with_hooks(node);
        };
        let previous = self.placement(node)?;
        if let Err(e) = self.detach_with_hooks(node) {
            self.restore_placement(node, previous)?;
            return Err(e);
        }

        let tree: &Self = self;
        if let Err(e) = tree.hooks.pre_attach(tree, node, parent) {
            self.restore_placement(node, previous)?;
            return Err(e);
        }
        self.link(node, parent, None)?;

        let tree: &Self = self;
        tree.hooks.post_attach(tree, node, parent)
    }

    fn detach_with_hooks(&mut self, node: NodeId) -> TreeResult<()> {
        let Some(parent) = self.node(node)?.parent else {
            return Ok(());
        };

        let tree: &Self = self;
        tree.hooks.pre_detach(tree, node, parent)?;
        self.unlink(node)?;

        let tree: &Self = self;
        tree.hooks.post_detach(tree, node, parent)
    }

    /// Relinks a detached `node` at `previous` without running hooks.
    fn restore_placement(
        &mut self,
        node: NodeId,
        previous: Option<(NodeId, usize)>,
    ) -> TreeResult<()> {
        let Some((old_parent, position)) = previous else {
            return Ok(());
        };
        if self.node(node)?.parent.is_some() {
            return Ok(());
        }
        warn!(%node, %old_parent, "move aborted, restoring previous parent");
        self.link(node, old_parent, Some(position))
    }

    fn detach_children(&mut self, node: NodeId) -> TreeResult<()> {
        let children = self.node(node)?.children.clone();

        let tree: &Self = self;
        tree.hooks.pre_detach_children(tree, node, &children)?;
        for &child in &children {
            self.detach_with_hooks(child)?;
        }

        let tree: &Self = self;
        tree.hooks.post_detach_children(tree, node, &children)
    }

    fn replace_children(&mut self, node: NodeId, children: &[NodeId]) -> TreeResult<()> {
        self.detach_children(node)?;

        let tree: &Self = self;
        tree.hooks.pre_attach_children(tree, node, children)?;
        for &child in children {
            self.reparent(child, Some(node))?;
        }

        let attached = self.node(node)?.children.len();
        if attached != children.len() {
            return Err(corrupted(format!(
                "{} has {} children after attaching {}",
                node,
                attached,
                children.len()
            )));
        }

        let tree: &Self = self;
        tree.hooks.post_attach_children(tree, node, children)
    }
}

fn corrupted(message: String) -> TreeError {
    error!(%message, "link invariant violated");
    TreeError::Corrupted(message)
}
