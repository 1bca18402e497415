//! Error types raised while loading and executing Intcode programs.

use thiserror::Error;

/// Faults surfaced by [`Computer`](crate::Computer) and its memory.
///
/// None of these are suspension points: a computer that returned one of
/// them should be discarded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VmError {
    #[error("invalid memory address {0}")]
    InvalidAddress(i64),
    #[error("unknown opcode {opcode} at address {address}")]
    UnknownOpcode { opcode: i64, address: u64 },
    #[error("invalid parameter mode {mode} for parameter {parameter} at address {address}")]
    InvalidParameterMode {
        mode: i64,
        parameter: usize,
        address: u64,
    },
    #[error("parameter {parameter} of {instruction} at address {address} is a write target in immediate mode")]
    InvalidWriteTarget {
        instruction: &'static str,
        parameter: usize,
        address: u64,
    },
    #[error("instruction pointer {pointer} ran past the end of memory ({length} cells)")]
    MemoryExhausted { pointer: u64, length: u64 },
    #[error("the program has already terminated")]
    AlreadyTerminated,
    #[error("malformed program token {token:?} at position {position}")]
    MalformedProgram { token: String, position: usize },
    #[error("program requested input at address {address} but none was supplied")]
    InputExhausted { address: u64 },
}

/// Problems found while building the instruction table.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("opcode {opcode} is declared by both {first} and {second}")]
    DuplicateOpcode {
        opcode: u8,
        first: &'static str,
        second: &'static str,
    },
    #[error("{name} uses reserved opcode {opcode}")]
    ReservedOpcode { name: &'static str, opcode: u8 },
    #[error("{name} has an unclassifiable parameter signature: {reason}")]
    Unclassifiable {
        name: &'static str,
        reason: &'static str,
    },
}
