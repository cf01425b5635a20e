//! Manifest tree
//!
//!     The parser builds an arena of typed nodes ([Ast]). Every node records its parent,
//!     its nesting level and two spacing flags the renderer uses to decide on blank lines:
//!
//!     - `outer_spacing`: the node is separated from its siblings by blank lines.
//!     - `inner_spacing`: the node's children are padded by a newline on each side.
//!
//!     The tree is mutated once after parsing, by the key alignment pass, and is otherwise
//!     read-only. See [snapshot] for the serializable view used by the JSON and treeviz
//!     formats.

pub mod arena;
pub mod nodes;
pub mod snapshot;

pub use arena::Ast;
pub use nodes::{ExprPart, Node, NodeId, NodeKind, ResourceHead, Variant};
pub use snapshot::{snapshot_from_ast, snapshot_node, AstSnapshot};
