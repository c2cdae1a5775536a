use crate::util::CodeAddress;
use thiserror::Error;

/// Problems with the shape of a method handed over by the decoder
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A type or method descriptor could not be parsed
    #[error("bad descriptor: {0}")]
    BadDescriptor(String),

    /// A class or member name is not valid
    #[error("bad name: {0}")]
    BadName(String),

    /// Two instructions claim the same address
    #[error("two instructions located at {0:?}")]
    DuplicateAddress(CodeAddress),

    /// An instruction is not located where the widths of the preceding instructions put it
    #[error("instruction located at {found:?} but the previous instruction ends at {expected:?}")]
    MisalignedAddress {
        found: CodeAddress,
        expected: CodeAddress,
    },
}
