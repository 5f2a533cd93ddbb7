pub mod alu;
pub mod circuit;
pub mod cpu;
pub mod error;
pub mod gate;
pub mod instructions;
pub mod mmu;
pub mod port;
pub mod register;
pub mod word;

#[cfg(test)]
pub(crate) mod test_utils;

pub use cpu::{Cpu, CpuState, RunState, StepOutcome, TranscriptEntry};
pub use error::CpuError;
pub use instructions::{Instr, Opcode};
pub use register::RegIdx;
pub use word::Word;

/// The parameters of a Michael computer instance.
pub trait MichaelComputer: Copy + Clone {
    /// The width of registers, memory cells and literals
    type Word: Word;

    /// Number of addressable data-memory cells
    const MEMORY_CAPACITY: usize;

    /// Memory address that doubles as an output port, if any. Stores to it are also written to
    /// the machine's [`port::OutputPort`].
    const OUTPUT_ADDRESS: Option<u64> = None;

    fn header() -> String {
        let port = match Self::OUTPUT_ADDRESS {
            Some(addr) => format!(" P=0x{addr:x}"),
            None => String::new(),
        };
        format!(
            "; Michael W={} M={} K={}{}",
            Self::Word::BIT_LENGTH,
            Self::MEMORY_CAPACITY,
            register::NUM_REGS,
            port
        )
    }
}
