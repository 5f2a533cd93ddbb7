use crate::{register::RegIdx, word::Word, MichaelComputer};

use core::fmt;

use derivative::Derivative;
use rand::Rng;

pub use encoding::DecodedInstr;
pub use opcode::Opcode;

pub mod encoding;
pub mod opcode;

/// A fully fetched instruction. `rt` is the destination (and first ALU operand), `rf` the source
/// (second ALU operand), `rr` both at once.
#[derive(Derivative)]
#[derivative(
    Debug(bound = "T: MichaelComputer"),
    Clone(bound = "T: MichaelComputer"),
    Copy(bound = "T: MichaelComputer"),
    PartialEq(bound = "T: MichaelComputer"),
    Eq(bound = "T: MichaelComputer")
)]
pub enum Instr<T: MichaelComputer> {
    // Transfer instructions
    LoadConst { rt: RegIdx, value: T::Word },
    LoadMem { rt: RegIdx, address: T::Word },
    StoreMem { rf: RegIdx, address: T::Word },
    Move { rt: RegIdx, rf: RegIdx },
    // Logic instructions
    Not { rr: RegIdx },
    Nand { rt: RegIdx, rf: RegIdx },
    And { rt: RegIdx, rf: RegIdx },
    Nor { rt: RegIdx, rf: RegIdx },
    Or { rt: RegIdx, rf: RegIdx },
    Xnor { rt: RegIdx, rf: RegIdx },
    Xor { rt: RegIdx, rf: RegIdx },
    // Arithmetic instructions
    Add { rt: RegIdx, rf: RegIdx },
    AddOvf { rt: RegIdx, rf: RegIdx },
    Sub { rt: RegIdx, rf: RegIdx },
    SubOvf { rt: RegIdx, rf: RegIdx },
}

impl<T: MichaelComputer> Instr<T> {
    pub fn opcode(&self) -> Opcode {
        use Instr::*;
        match &self {
            LoadConst { .. } => Opcode::LoadConst,
            LoadMem { .. } => Opcode::LoadMem,
            StoreMem { .. } => Opcode::StoreMem,
            Move { .. } => Opcode::Move,
            Not { .. } => Opcode::Not,
            Nand { .. } => Opcode::Nand,
            And { .. } => Opcode::And,
            Nor { .. } => Opcode::Nor,
            Or { .. } => Opcode::Or,
            Xnor { .. } => Opcode::Xnor,
            Xor { .. } => Opcode::Xor,
            Add { .. } => Opcode::Add,
            AddOvf { .. } => Opcode::AddOvf,
            Sub { .. } => Opcode::Sub,
            SubOvf { .. } => Opcode::SubOvf,
        }
    }

    /// Number of stream words this instruction occupies: 2 if it carries a literal, else 1
    pub fn word_length(&self) -> u64 {
        if self.opcode().has_literal() {
            2
        } else {
            1
        }
    }

    /// Returns a random, valid instruction. Useful for testing
    pub fn rand(mut rng: impl Rng) -> Self {
        let opcode = Opcode::ALL[rng.gen_range(0..Opcode::ALL.len())];
        let rt = RegIdx::rand(&mut rng);
        let rf = if opcode.is_single_register() {
            rt
        } else {
            RegIdx::rand(&mut rng)
        };
        DecodedInstr { opcode, rt, rf }.with_literal(T::Word::rand(&mut rng))
    }
}

#[rustfmt::skip]
impl<T: MichaelComputer> fmt::Display for Instr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = self.opcode();
        match *self {
            Instr::LoadConst { rt, value }  => write!(f, "{op} {rt}, 0x{value:x}"),
            Instr::LoadMem { rt, address }  => write!(f, "{op} {rt}, [0x{address:x}]"),
            Instr::StoreMem { rf, address } => write!(f, "{op} [0x{address:x}], {rf}"),
            Instr::Not { rr }               => write!(f, "{op} {rr}"),
            Instr::Move { rt, rf }
            | Instr::Nand { rt, rf }
            | Instr::And { rt, rf }
            | Instr::Nor { rt, rf }
            | Instr::Or { rt, rf }
            | Instr::Xnor { rt, rf }
            | Instr::Xor { rt, rf }
            | Instr::Add { rt, rf }
            | Instr::AddOvf { rt, rf }
            | Instr::Sub { rt, rf }
            | Instr::SubOvf { rt, rf }      => write!(f, "{op} {rt}, {rf}"),
        }
    }
}
