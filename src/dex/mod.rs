//! Dalvik method bodies, as handed over by a decoder
//!
//! ### Structure
//!
//! A method body is an ordered sequence of [`Instruction`]s, each located at a [`CodeAddress`]
//! measured in 16-bit code units. Instruction widths are fixed by their [`Format`] except for the
//! three payload pseudo-instructions (switch tables and array data) whose width depends on their
//! contents. Instructions keep their [`Opcode`] so that static properties (can it fall through?
//! can it throw? is it a `goto`?) stay available to the simulator.
//!
//! Symbolic operands (types, fields, methods) are already resolved to descriptors, using the
//! same syntax as the JVM: `I`, `[J`, `Ljava/lang/String;`, `(IZ)V`.
//!
//! [`CodeAddress`]: crate::util::CodeAddress

mod access_flags;
mod descriptors;
mod errors;
mod instruction;
mod method;
mod names;
mod opcode;
mod references;

pub use access_flags::*;
pub use descriptors::*;
pub use errors::*;
pub use instruction::*;
pub use method::*;
pub use names::*;
pub use opcode::*;
pub use references::*;
