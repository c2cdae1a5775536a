//! Path-sensitive simulation of Dalvik methods
//!
//! ### Execution graph
//!
//! Executing a method produces an [`ExecutionGraph`]: for every address of the method, a pile of
//! [`ExecutionNode`]s, one per machine state ([`MethodContext`]) in which execution reached that
//! address. The first node of every pile is a template holding the operation handler for the
//! instruction, which is shared by all of the nodes of the pile. Nodes are linked from parent to
//! child, so the reached nodes form a tree rooted at the first instruction.
//!
//! Once a method has been executed, the graph answers questions such as "what is the value of
//! `v0` whenever the method returns?" (see [`ExecutionGraph::register_consensus`]) or "can this
//! method do anything observable?" (see [`ExecutionGraph::strongest_side_effect`]).
//!
//! ### Values
//!
//! Registers hold either a concrete [`Value`] or an unknown value of some declared type. Branches
//! whose condition depends on an unknown value are explored both ways, and any call or field
//! access out of the method produces an unknown value.

mod context;
mod errors;
mod graph;
mod machine;
mod node;
pub mod ops;
mod settings;
mod side_effect;
mod value;

pub use context::*;
pub use errors::*;
pub use graph::*;
pub use machine::*;
pub use node::*;
pub use ops::{Op, OpFactory, Operation};
pub use settings::*;
pub use side_effect::*;
pub use value::*;
