//! Node data structures.
//!
//! The node set is built once from the host dataset and stored column-wise
//! (Structure of Arrays) for cache-friendly force passes and zero-copy
//! position views.

pub mod dataset;
mod node;
mod store;

pub use dataset::{CloudDataset, DomainWeight, StackEntry};
pub use node::{NodeId, NodeKind, NodeState};
pub use store::NodeStore;
