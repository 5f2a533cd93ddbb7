use strum::Display;

use crate::{alu::AluOp, error::CpuError, MichaelComputer};

use super::Instr;

/// Each opcode's discriminant is its instruction byte with every register bit cleared.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Display)]
#[rustfmt::skip]
#[repr(u8)]
pub enum Opcode {
    #[strum(serialize = "loadc")]
    LoadConst = 0b0000_0000,
    #[strum(serialize = "loadm")]
    LoadMem   = 0b0000_0100,
    #[strum(serialize = "storem")]
    StoreMem  = 0b0000_1000,
    #[strum(serialize = "not")]
    Not       = 0b0000_1100,
    #[strum(serialize = "mov")]
    Move      = 0b0001_0000,
    #[strum(serialize = "nand")]
    Nand      = 0b0010_0000,
    #[strum(serialize = "and")]
    And       = 0b0011_0000,
    #[strum(serialize = "nor")]
    Nor       = 0b0100_0000,
    #[strum(serialize = "or")]
    Or        = 0b0101_0000,
    #[strum(serialize = "xnor")]
    Xnor      = 0b0110_0000,
    #[strum(serialize = "xor")]
    Xor       = 0b0111_0000,
    #[strum(serialize = "add")]
    Add       = 0b1000_0000,
    #[strum(serialize = "addo")]
    AddOvf    = 0b1001_0000,
    #[strum(serialize = "sub")]
    Sub       = 0b1010_0000,
    #[strum(serialize = "subo")]
    SubOvf    = 0b1011_0000,
}

/// Opcode classes `0001`..`1011`, keyed by the top nibble of the instruction
pub const CLASS_TO_OPCODE: phf::Map<u8, Opcode> = phf::phf_map! {
    0b0001u8 => Opcode::Move  ,
    0b0010u8 => Opcode::Nand  ,
    0b0011u8 => Opcode::And   ,
    0b0100u8 => Opcode::Nor   ,
    0b0101u8 => Opcode::Or    ,
    0b0110u8 => Opcode::Xnor  ,
    0b0111u8 => Opcode::Xor   ,
    0b1000u8 => Opcode::Add   ,
    0b1001u8 => Opcode::AddOvf,
    0b1010u8 => Opcode::Sub   ,
    0b1011u8 => Opcode::SubOvf,
};

/// Sub-operations of class `0000`, keyed by bits 3-2 of the instruction
pub const SUBOP_TO_OPCODE: phf::Map<u8, Opcode> = phf::phf_map! {
    0b00u8 => Opcode::LoadConst,
    0b01u8 => Opcode::LoadMem  ,
    0b10u8 => Opcode::StoreMem ,
    0b11u8 => Opcode::Not      ,
};

impl Opcode {
    pub const ALL: [Opcode; 15] = [
        Opcode::LoadConst,
        Opcode::LoadMem,
        Opcode::StoreMem,
        Opcode::Not,
        Opcode::Move,
        Opcode::Nand,
        Opcode::And,
        Opcode::Nor,
        Opcode::Or,
        Opcode::Xnor,
        Opcode::Xor,
        Opcode::Add,
        Opcode::AddOvf,
        Opcode::Sub,
        Opcode::SubOvf,
    ];

    /// The opcode class, i.e. the top nibble of the instruction
    pub fn class(&self) -> u8 {
        (*self as u8) >> 4
    }

    /// Whether the instruction is followed in the stream by a literal word
    pub fn has_literal(&self) -> bool {
        matches!(self, Opcode::LoadConst | Opcode::LoadMem | Opcode::StoreMem)
    }

    /// Whether the instruction addresses a single register (`RT`, `RF` or `RR`) in its low 2 bits
    pub fn is_single_register(&self) -> bool {
        self.class() == 0
    }

    /// The ALU operation this opcode dispatches to, if any
    pub fn alu_op(&self) -> Option<AluOp> {
        use Opcode::*;
        match self {
            Not => Some(AluOp::Not),
            Nand => Some(AluOp::Nand),
            And => Some(AluOp::And),
            Nor => Some(AluOp::Nor),
            Or => Some(AluOp::Or),
            Xnor => Some(AluOp::Xnor),
            Xor => Some(AluOp::Xor),
            Add => Some(AluOp::Add),
            AddOvf => Some(AluOp::AddOvf),
            Sub => Some(AluOp::Sub),
            SubOvf => Some(AluOp::SubOvf),
            LoadConst | LoadMem | StoreMem | Move => None,
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = CpuError;

    fn try_from(instr: u8) -> Result<Opcode, CpuError> {
        let class = instr >> 4;
        let opcode = if class == 0 {
            SUBOP_TO_OPCODE.get(&((instr >> 2) & 0b11))
        } else {
            CLASS_TO_OPCODE.get(&class)
        };
        opcode.copied().ok_or(CpuError::InvalidOpcode {
            instr: u64::from(instr),
        })
    }
}

impl<T: MichaelComputer> From<Instr<T>> for Opcode {
    fn from(instr: Instr<T>) -> Opcode {
        instr.opcode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discriminants_decode_to_themselves() {
        for opcode in Opcode::ALL {
            assert_eq!(Opcode::try_from(opcode as u8), Ok(opcode));
        }
    }

    #[test]
    fn register_bits_do_not_change_the_opcode() {
        for opcode in Opcode::ALL {
            let reg_mask = if opcode.is_single_register() { 0b11 } else { 0b1111 };
            for regs in 0..=reg_mask {
                assert_eq!(Opcode::try_from(opcode as u8 | regs), Ok(opcode));
            }
        }
    }

    #[test]
    fn unassigned_classes_are_invalid() {
        for instr in 0b1100_0000..=u8::MAX {
            assert_eq!(
                Opcode::try_from(instr),
                Err(CpuError::InvalidOpcode {
                    instr: u64::from(instr)
                })
            );
        }
    }

    #[test]
    fn literal_and_alu_classification() {
        let with_literal: Vec<_> = Opcode::ALL.into_iter().filter(Opcode::has_literal).collect();
        assert_eq!(
            with_literal,
            [Opcode::LoadConst, Opcode::LoadMem, Opcode::StoreMem]
        );
        assert_eq!(Opcode::Move.alu_op(), None);
        assert_eq!(Opcode::Not.alu_op(), Some(AluOp::Not));
        assert_eq!(Opcode::SubOvf.alu_op(), Some(AluOp::SubOvf));
        assert_eq!(Opcode::Xnor.class(), 0b0110);
    }

    #[test]
    fn mnemonics() {
        assert_eq!(Opcode::LoadConst.to_string(), "loadc");
        assert_eq!(Opcode::AddOvf.to_string(), "addo");
    }
}
