//! Mutable in-memory trees with bidirectional parent/child links.
//!
//! Nodes live in an arena owned by a [`Tree`] and are addressed by [`NodeId`]
//! handles. A node has at most one parent and an ordered list of children;
//! both sides of every link are kept in sync by the mutation protocol:
//!
//! - [`Tree::set_parent`] moves a node, rejecting cycles before anything changes.
//! - [`Tree::set_children`] replaces a child list as one transaction and rolls
//!   back to the previous links if any step fails.
//! - [`LinkHooks`] observe and may veto every attach and detach.
//!
//! Structural queries (`path`, `depth`, `height`, `leaves`, ...) live on
//! [`NodeRef`] and are recomputed from the links on every call.
//!
//! ```
//! use reltree::Tree;
//!
//! let mut tree = Tree::new();
//! let udo = tree.insert("Udo");
//! let marc = tree.insert_with("Marc", Some(udo), vec![]).unwrap();
//! let lian = tree.insert_with("Lian", Some(marc), vec![]).unwrap();
//!
//! let node = tree.get(lian).unwrap();
//! assert_eq!(node.depth(), 2);
//! assert_eq!(node.path(), vec![udo, marc, lian]);
//! assert_eq!(tree.get(udo).unwrap().height(), 2);
//!
//! // a node cannot become its own ancestor
//! assert!(tree.set_parent(udo, Some(lian)).unwrap_err().is_loop());
//! ```

pub mod arena;
pub mod config;
pub mod errors;
pub mod hooks;
pub mod iter;
pub mod node;
mod snapshot;
pub mod util;

pub use arena::{NodeId, Tree};
pub use config::Settings;
pub use errors::{TreeError, TreeResult};
pub use hooks::{LinkHooks, NoHooks};
pub use iter::{PostOrderIter, PreOrderIter};
pub use node::{NodeRef, PathReverse};
