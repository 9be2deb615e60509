use tracing::{error, instrument, warn};

use crate::arena::{NodeId, Tree};
use crate::errors::TreeResult;

/// Links touched by a batch child replacement, captured before it starts.
///
/// Restoring uses raw link edits only: no hooks run, so the restore itself
/// cannot be vetoed.
#[derive(Debug)]
pub(crate) struct LinkSnapshot {
    node: NodeId,
    children: Vec<NodeId>,
    /// Previous parent and position of every candidate child
    placements: Vec<(NodeId, Option<(NodeId, usize)>)>,
}

impl LinkSnapshot {
    pub(crate) fn capture<T, H>(
        tree: &Tree<T, H>,
        node: NodeId,
        candidates: &[NodeId],
    ) -> TreeResult<Self> {
        let placements = candidates
            .iter()
            .map(|&candidate| Ok((candidate, tree.placement(candidate)?)))
            .collect::<TreeResult<Vec<_>>>()?;
        Ok(Self {
            node,
            children: tree.children(node)?.to_vec(),
            placements,
        })
    }

    #[instrument(level = "debug", skip(self, tree), fields(node = %self.node))]
    pub(crate) fn restore<T, H>(self, tree: &mut Tree<T, H>) -> TreeResult<()> {
        let current = tree.children(self.node)?.to_vec();
        for child in current {
            tree.unlink(child)?;
        }
        for &(candidate, _) in &self.placements {
            tree.unlink(candidate)?;
        }

        // every previous child is a root now
        for &child in &self.children {
            tree.unlink(child)?;
            tree.link(child, self.node, None)?;
        }

        // Ascending positions rebuild each foreign parent's original order
        let mut foreign: Vec<(usize, NodeId, NodeId)> = self
            .placements
            .iter()
            .filter_map(|&(candidate, placement)| {
                placement
                    .filter(|&(parent, _)| parent != self.node)
                    .map(|(parent, position)| (position, parent, candidate))
            })
            .collect();
        foreign.sort_by_key(|&(position, _, _)| position);
        for (position, parent, candidate) in foreign {
            tree.link(candidate, parent, Some(position))?;
        }

        tree.verify().inspect_err(|e| {
            error!(error = %e, "rollback left the tree inconsistent");
        })?;
        warn!(children = self.children.len(), "restored previous children");
        Ok(())
    }
}
