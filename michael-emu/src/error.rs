use thiserror::Error;

/// A condition that stops the machine. The CPU latches it into
/// [`RunState::Faulted`](crate::RunState::Faulted); nothing is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CpuError {
    /// The fetched value does not decode to any instruction. Classes `1100`..`1111` are unassigned,
    /// as is any stream word wider than 8 bits.
    #[error("invalid opcode in instruction 0x{instr:02x}")]
    InvalidOpcode { instr: u64 },

    #[error("memory address {address} is out of range (capacity {capacity})")]
    MemoryOutOfRange { address: u64, capacity: usize },

    /// The instruction takes a trailing literal, but the stream ends before it
    #[error("instruction is missing its trailing literal")]
    TruncatedInstruction,
}

pub type Result<T> = core::result::Result<T, CpuError>;
