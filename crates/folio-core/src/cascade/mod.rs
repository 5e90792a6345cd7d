//! Branch cascade
//!
//! Tree-wide operations walk a subtree in pre-order (parent before children,
//! siblings by sort order) and derive one transition code per node. This
//! module holds the pieces that do not need storage: transition codes, the
//! per-node publish-branch decision, visibility tracking along a walk, and
//! subtree relocation and sort planning.

pub mod branch;
pub mod transition;
pub mod tree;

pub use branch::{decide, BranchDecision};
pub use transition::{PublishState, TransitionCode, TransitionSymbol};
pub use tree::{relocate_subtree, sort_plan, Visibility};
