//! Extension points invoked around every structural edit.
//!
//! Hooks observe the tree through a shared reference; they cannot edit links
//! themselves but may veto an edit by returning an error. Pre-hooks see the
//! tree before the edit, post-hooks after it.

use crate::arena::{NodeId, Tree};
use crate::errors::TreeResult;

#[allow(unused_variables)]
pub trait LinkHooks<T>: Sized {
    /// Before `node` is removed from the children of `parent`.
    fn pre_detach(&self, tree: &Tree<T, Self>, node: NodeId, parent: NodeId) -> TreeResult<()> {
        Ok(())
    }

    /// After `node` has been removed from the children of `parent`.
    ///
    /// An error while the node is being moved elsewhere puts it back under
    /// `parent`; on a plain detach the node stays detached.
    fn post_detach(&self, tree: &Tree<T, Self>, node: NodeId, parent: NodeId) -> TreeResult<()> {
        Ok(())
    }

    /// Before `node` is appended to the children of `parent`.
    fn pre_attach(&self, tree: &Tree<T, Self>, node: NodeId, parent: NodeId) -> TreeResult<()> {
        Ok(())
    }

    /// After `node` has been appended to the children of `parent`.
    fn post_attach(&self, tree: &Tree<T, Self>, node: NodeId, parent: NodeId) -> TreeResult<()> {
        Ok(())
    }

    fn pre_detach_children(
        &self,
        tree: &Tree<T, Self>,
        parent: NodeId,
        children: &[NodeId],
    ) -> TreeResult<()> {
        Ok(())
    }

    fn post_detach_children(
        &self,
        tree: &Tree<T, Self>,
        parent: NodeId,
        children: &[NodeId],
    ) -> TreeResult<()> {
        Ok(())
    }

    fn pre_attach_children(
        &self,
        tree: &Tree<T, Self>,
        parent: NodeId,
        children: &[NodeId],
    ) -> TreeResult<()> {
        Ok(())
    }

    fn post_attach_children(
        &self,
        tree: &Tree<T, Self>,
        parent: NodeId,
        children: &[NodeId],
    ) -> TreeResult<()> {
        Ok(())
    }
}

/// Hook set that accepts every edit.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NoHooks;

impl<T> LinkHooks<T> for NoHooks {}
