use crate::{
    error::CpuError,
    register::{RegIdx, RegisterFile},
    MichaelComputer,
};

use derivative::Derivative;

/// Where the machine is in its lifecycle. `Halted` and `Faulted` are terminal until a reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunState {
    #[default]
    Running,
    /// The program counter ran off the end of the instruction stream
    Halted,
    /// Execution stopped on `error`, raised by the instruction at `pc`
    Faulted { error: CpuError, pc: u64 },
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_running()
    }
}

#[derive(Derivative)]
#[derivative(
    Default(bound = "T: MichaelComputer"),
    Debug(bound = "T: MichaelComputer"),
    Clone(bound = "T: MichaelComputer"),
    PartialEq(bound = "T: MichaelComputer"),
    Eq(bound = "T: MichaelComputer")
)]
pub struct CpuState<T: MichaelComputer> {
    /// Index into the instruction stream. Kept wider than any word so it never wraps.
    pub(super) program_counter: u64,
    /// Register file.
    pub(super) registers: RegisterFile<T::Word>,
    pub(super) run_state: RunState,
}

impl<T: MichaelComputer> CpuState<T> {
    pub fn register(&self, reg: RegIdx) -> T::Word {
        self.registers.read(reg)
    }

    pub fn registers(&self) -> &[T::Word] {
        self.registers.as_slice()
    }

    pub fn program_counter(&self) -> u64 {
        self.program_counter
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub(super) fn increment_pc(&mut self, by: u64) {
        self.program_counter = self.program_counter.saturating_add(by);
    }
}
