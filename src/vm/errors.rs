use super::NodeId;
use crate::dex;
use crate::dex::Opcode;
use crate::util::CodeAddress;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The method body itself is malformed
    #[error("malformed method: {0}")]
    Dex(dex::Error),

    /// No instruction starts at this address
    #[error("no instruction at {0:?}")]
    MissingAddress(CodeAddress),

    /// No node with this id has been added to the graph
    #[error("no node {0:?} in the graph")]
    MissingNode(NodeId),

    /// A node was added to the pile of an address other than its instruction's
    #[error("node for {node:?} added at {address:?}")]
    MisplacedNode {
        node: CodeAddress,
        address: CodeAddress,
    },

    /// Operands don't have the shape the opcode needs, or refer to something invalid
    #[error("malformed {} at {address:?}: {message}", .opcode.name())]
    MalformedInstruction {
        address: CodeAddress,
        opcode: Opcode,
        message: String,
    },

    #[error("register v{register} is outside of a frame of {registers} registers")]
    RegisterOutOfBounds { register: u16, registers: u16 },

    #[error("register v{0} is read before being assigned")]
    UnassignedRegister(u16),

    /// `move-result*` without a preceding instruction that produced a result
    #[error("no result to move")]
    MissingResult,

    /// A payload was executed without coming from the instruction referring to it
    #[error("payload at {0:?} reached without a pending return")]
    MissingPseudoReturn(CodeAddress),

    /// Consensus over an empty set of nodes
    #[error("consensus over an empty set of nodes")]
    EmptyConsensus,

    /// No method with this signature was added to the machine
    #[error("unknown method {0}")]
    UnknownMethod(String),

    #[error("{address:?} visited more than {limit} times")]
    MaxAddressVisitsExceeded { address: CodeAddress, limit: usize },

    #[error("more than {0} instructions executed")]
    MaxMethodVisitsExceeded(usize),

    #[error("call depth {0} exceeds the maximum")]
    MaxCallDepthExceeded(usize),
}

impl Error {
    /// Is this a broken structural assumption (as opposed to exploration being cut short or a
    /// bad query)?
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Error::Dex(_)
                | Error::MissingAddress(_)
                | Error::MissingNode(_)
                | Error::MisplacedNode { .. }
                | Error::MalformedInstruction { .. }
                | Error::RegisterOutOfBounds { .. }
                | Error::UnassignedRegister(_)
                | Error::MissingResult
                | Error::MissingPseudoReturn(_)
        )
    }

    pub(crate) fn malformed(
        address: CodeAddress,
        opcode: Opcode,
        message: impl Into<String>,
    ) -> Error {
        Error::MalformedInstruction {
            address,
            opcode,
            message: message.into(),
        }
    }
}

impl From<dex::Error> for Error {
    fn from(err: dex::Error) -> Error {
        Error::Dex(err)
    }
}
