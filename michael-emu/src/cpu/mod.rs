use crate::{
    alu::{self, AluOp},
    error::{CpuError, Result},
    instructions::{DecodedInstr, Instr},
    mmu::{DataMemory, MemOp, MemoryUnit},
    port::{OutputPort, PortOp},
    register::RegIdx,
    MichaelComputer,
};
pub use state::{CpuState, RunState};

use derivative::Derivative;
use tracing::{debug, debug_span, trace, warn};

pub mod state;

#[derive(Derivative)]
#[derivative(
    Debug(bound = "T: MichaelComputer"),
    Clone(bound = "T: MichaelComputer")
)]
pub struct Cpu<T: MichaelComputer> {
    /// The current state of the CPU
    state: CpuState<T>,
    /// The memory unit
    mem: MemoryUnit<T>,
    /// Everything stored to `T::OUTPUT_ADDRESS` so far
    port: OutputPort<T>,
}

/// What a single call to [`Cpu::step`] did
#[derive(Derivative)]
#[derivative(
    Debug(bound = "T: MichaelComputer"),
    Clone(bound = "T: MichaelComputer"),
    PartialEq(bound = "T: MichaelComputer"),
    Eq(bound = "T: MichaelComputer")
)]
pub struct StepOutcome<T: MichaelComputer> {
    /// The run state after the step
    pub run_state: RunState,
    /// The instruction that was executed. `None` if the step halted, faulted or was a no-op.
    pub instr: Option<Instr<T>>,
    /// Carry or borrow reported by `addo`/`subo`. Not kept in the CPU state.
    pub overflow: Option<bool>,
    pub mem_op: Option<MemOp<T::Word>>,
    pub port_op: Option<PortOp<T::Word>>,
}

impl<T: MichaelComputer> StepOutcome<T> {
    fn stopped(run_state: RunState) -> Self {
        StepOutcome {
            run_state,
            instr: None,
            overflow: None,
            mem_op: None,
            port_op: None,
        }
    }
}

#[derive(Derivative)]
#[derivative(
    Debug(bound = "T: MichaelComputer"),
    Clone(bound = "T: MichaelComputer"),
    PartialEq(bound = "T: MichaelComputer"),
    Eq(bound = "T: MichaelComputer")
)]
pub struct TranscriptEntry<T: MichaelComputer> {
    /// The timestamp of this entry. The first executed instruction has timestamp 0.
    pub timestamp: u64,
    /// Where the instruction was fetched from
    pub pc: u64,
    /// The instruction being executed
    pub instr: Instr<T>,
    /// The overflow flag, for `addo` and `subo`
    pub overflow: Option<bool>,
    /// The optional memory operation corresponding to this instruction's execution
    pub mem_op: Option<MemOp<T::Word>>,
    /// The optional port write corresponding to this instruction's execution
    pub port_op: Option<PortOp<T::Word>>,
    /// The state of the CPU after this instruction was computed
    pub cpu_after: CpuState<T>,
}

// Side effects of a successfully executed instruction
struct Executed<W: crate::word::Word> {
    overflow: Option<bool>,
    mem_op: Option<MemOp<W>>,
}

impl<T: MichaelComputer> Cpu<T> {
    /// A running CPU at pc 0, with zeroed registers and data memory
    pub fn new(program: &[T::Word]) -> Self {
        Self::from_memory(MemoryUnit::new(program))
    }

    /// Like [`Cpu::new`], with `data` copied to the bottom of data memory. Fails if `data` holds
    /// more than `T::MEMORY_CAPACITY` words.
    pub fn with_data(program: &[T::Word], data: &[T::Word]) -> Result<Self> {
        MemoryUnit::initialize(program, data).map(Self::from_memory)
    }

    fn from_memory(mem: MemoryUnit<T>) -> Self {
        Self {
            state: CpuState::default(),
            mem,
            port: OutputPort::default(),
        }
    }

    /// Runs a single fetch/decode/execute cycle. Does nothing once the CPU has halted or faulted.
    pub fn step(&mut self) -> StepOutcome<T> {
        if self.state.run_state.is_terminal() {
            return StepOutcome::stopped(self.state.run_state);
        }

        let pc = self.state.program_counter;
        let (instr, len) = match self.mem.get_instruction(pc) {
            Ok(Some(fetched)) => fetched,
            Ok(None) => {
                debug!(pc, "reached end of instruction stream, halting");
                self.state.run_state = RunState::Halted;
                return StepOutcome::stopped(RunState::Halted);
            },
            Err(error) => return self.fault(error, pc),
        };

        let Executed { overflow, mem_op } = match self.execute_instruction(instr) {
            Ok(executed) => executed,
            Err(error) => return self.fault(error, pc),
        };
        let port_op = mem_op.as_ref().and_then(|op| self.port.observe(op));
        self.state.increment_pc(len as u64);

        trace!(pc, %instr, ?overflow, ?mem_op, "executed");
        StepOutcome {
            run_state: self.state.run_state,
            instr: Some(instr),
            overflow,
            mem_op,
            port_op,
        }
    }

    fn fault(&mut self, error: CpuError, pc: u64) -> StepOutcome<T> {
        warn!(pc, %error, "cpu faulted");
        self.state.run_state = RunState::Faulted { error, pc };
        StepOutcome::stopped(self.state.run_state)
    }

    /// Executes the given instruction. Every fallible check happens before any register or
    /// memory cell is written, so an `Err` leaves the machine untouched.
    fn execute_instruction(&mut self, instr: Instr<T>) -> Result<Executed<T::Word>> {
        let mut mem_op = None;
        let mut overflow = None;
        let regs = &mut self.state.registers;

        match instr {
            // Transfer instructions
            Instr::LoadConst { rt, value } => regs.write(rt, value),

            Instr::LoadMem { rt, address } => {
                let (val, op) = self.mem.load_word(address)?;
                regs.write(rt, val);
                mem_op = Some(op);
            },

            Instr::StoreMem { rf, address } => {
                mem_op = Some(self.mem.store_word(address, regs.read(rf))?);
            },

            Instr::Move { rt, rf } => regs.move_reg(rt, rf),

            // Logic and arithmetic instructions
            alu_instr => match alu_instr.opcode().alu_op() {
                Some(op) => {
                    let DecodedInstr { rt, rf, .. } = alu_instr.decoded();
                    overflow = self.apply_alu(op, rt, rf);
                },
                None => unreachable!("{alu_instr} is not an ALU instruction"),
            },
        }

        Ok(Executed { overflow, mem_op })
    }

    // rt <- rt `op` rf
    fn apply_alu(&mut self, op: AluOp, rt: RegIdx, rf: RegIdx) -> Option<bool> {
        let regs = &mut self.state.registers;
        let out = alu::execute(op, regs.read(rt), regs.read(rf));
        regs.write(rt, out.result);
        out.overflow
    }

    /// Steps until the CPU halts or faults. Returns the final run state and a time-ordered
    /// transcript of every executed instruction.
    pub fn run_program(&mut self) -> (RunState, Vec<TranscriptEntry<T>>) {
        let span = debug_span!("run_program", config = %T::header());
        let _enter = span.enter();

        let mut transcript = Vec::new();
        let mut timestamp = 0;
        while self.state.run_state.is_running() {
            let pc = self.state.program_counter;
            let outcome = self.step();

            if let Some(instr) = outcome.instr {
                transcript.push(TranscriptEntry {
                    timestamp,
                    pc,
                    instr,
                    overflow: outcome.overflow,
                    mem_op: outcome.mem_op,
                    port_op: outcome.port_op,
                    cpu_after: self.state.clone(),
                });
                timestamp += 1;
            }
        }

        debug!(steps = timestamp, run_state = ?self.state.run_state, "program finished");
        (self.state.run_state, transcript)
    }

    /// Runs the given program to completion and returns its final run state and transcript
    pub fn initialize_and_run_program(
        program: &[T::Word],
        data: &[T::Word],
    ) -> Result<(RunState, Vec<TranscriptEntry<T>>)> {
        let mut cpu = Self::with_data(program, data)?;
        Ok(cpu.run_program())
    }

    /// Puts the CPU back in its initial state: pc 0, zeroed registers, data memory as it was
    /// loaded, an empty output port and `Running`
    pub fn reset(&mut self) {
        self.state = CpuState::default();
        self.mem.reset();
        self.port.clear();
    }

    pub fn state(&self) -> &CpuState<T> {
        &self.state
    }

    pub fn register(&self, reg: RegIdx) -> T::Word {
        self.state.register(reg)
    }

    pub fn registers(&self) -> &[T::Word] {
        self.state.registers()
    }

    pub fn program_counter(&self) -> u64 {
        self.state.program_counter()
    }

    pub fn run_state(&self) -> RunState {
        self.state.run_state()
    }

    pub fn memory(&self) -> &DataMemory<T::Word> {
        self.mem.data()
    }

    pub fn output(&self) -> &OutputPort<T> {
        &self.port
    }
}
