use crate::{
    error::{CpuError, Result},
    instructions::{Instr, Opcode},
    register::RegIdx,
    word::Word,
    MichaelComputer,
};

use bitfield::{BitRange, BitRangeMut};

//  An instruction is a single byte:
//
//  | 7 6 5 4 | 3 2 | 1 0 |
//  |  class  |  RT |  RF |    classes 0001..1011
//  |  0000   | sub |  R  |    class 0000, where R is RT, RF or RR depending on `sub`
//
//  LoadConst, LoadMem and StoreMem are followed in the stream by one literal word: the constant
//  for LoadConst, the memory address for the other two.

const CLASS_MSB: usize = 7;
const CLASS_LSB: usize = 4;
const HIGH_REG_MSB: usize = 3;
const HIGH_REG_LSB: usize = 2;
const LOW_REG_MSB: usize = 1;
const LOW_REG_LSB: usize = 0;

/// The result of decoding an instruction byte, before any trailing literal has been fetched.
/// For single-register opcodes (class `0000`) `rt` and `rf` hold the same register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedInstr {
    pub opcode: Opcode,
    pub rt: RegIdx,
    pub rf: RegIdx,
}

impl DecodedInstr {
    /// Splits an instruction byte into its opcode and register fields. Fails only for the
    /// unassigned classes `1100`..`1111`.
    pub fn decode(instr: u8) -> Result<Self> {
        let opcode = Opcode::try_from(instr)?;

        let high_reg: u8 = instr.bit_range(HIGH_REG_MSB, HIGH_REG_LSB);
        let low_reg: u8 = instr.bit_range(LOW_REG_MSB, LOW_REG_LSB);

        let (rt, rf) = if opcode.is_single_register() {
            (RegIdx(low_reg), RegIdx(low_reg))
        } else {
            (RegIdx(high_reg), RegIdx(low_reg))
        };

        Ok(DecodedInstr { opcode, rt, rf })
    }

    /// Narrows a word from the instruction stream to an instruction byte and decodes it
    pub fn decode_word<W: Word>(word: W) -> Result<Self> {
        let value: u64 = word.into();
        let instr = u8::try_from(value).map_err(|_| CpuError::InvalidOpcode { instr: value })?;
        Self::decode(instr)
    }

    /// Whether the control unit must fetch a trailing literal for this instruction
    pub fn has_literal(&self) -> bool {
        self.opcode.has_literal()
    }

    /// Completes the instruction. `literal` is ignored by opcodes that don't take one.
    pub fn with_literal<T: MichaelComputer>(self, literal: T::Word) -> Instr<T> {
        let DecodedInstr { opcode, rt, rf } = self;
        match opcode {
            Opcode::LoadConst => Instr::LoadConst { rt, value: literal },
            Opcode::LoadMem => Instr::LoadMem {
                rt,
                address: literal,
            },
            Opcode::StoreMem => Instr::StoreMem {
                rf,
                address: literal,
            },
            Opcode::Not => Instr::Not { rr: rt },
            Opcode::Move => Instr::Move { rt, rf },
            Opcode::Nand => Instr::Nand { rt, rf },
            Opcode::And => Instr::And { rt, rf },
            Opcode::Nor => Instr::Nor { rt, rf },
            Opcode::Or => Instr::Or { rt, rf },
            Opcode::Xnor => Instr::Xnor { rt, rf },
            Opcode::Xor => Instr::Xor { rt, rf },
            Opcode::Add => Instr::Add { rt, rf },
            Opcode::AddOvf => Instr::AddOvf { rt, rf },
            Opcode::Sub => Instr::Sub { rt, rf },
            Opcode::SubOvf => Instr::SubOvf { rt, rf },
        }
    }
}

impl<T: MichaelComputer> Instr<T> {
    /// Decodes an instruction from the front of `words`. Returns the instruction and the number
    /// of words it occupied. `words` must not be empty.
    pub fn from_words(words: &[T::Word]) -> Result<(Self, usize)> {
        let first = *words.first().ok_or(CpuError::TruncatedInstruction)?;
        let decoded = DecodedInstr::decode_word(first)?;
        if decoded.has_literal() {
            let literal = *words.get(1).ok_or(CpuError::TruncatedInstruction)?;
            Ok((decoded.with_literal(literal), 2))
        } else {
            Ok((decoded.with_literal(T::Word::ZERO), 1))
        }
    }

    /// The opcode and register fields of this instruction, as the decoder would produce them
    pub fn decoded(&self) -> DecodedInstr {
        let (rt, rf) = match *self {
            Instr::LoadConst { rt, .. } | Instr::LoadMem { rt, .. } => (rt, rt),
            Instr::StoreMem { rf, .. } => (rf, rf),
            Instr::Not { rr } => (rr, rr),
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
            | Instr::SubOvf { rt, rf } => (rt, rf),
        };
        DecodedInstr {
            opcode: self.opcode(),
            rt,
            rf,
        }
    }

    /// Returns the instruction byte, without any trailing literal
    pub fn to_byte(&self) -> u8 {
        let DecodedInstr { opcode, rt, rf } = self.decoded();
        Self::encode(opcode as u8, rt, rf)
    }

    /// The machine encoding of this instruction: the instruction byte, followed by the literal
    /// if it has one
    pub fn to_words(&self) -> Vec<T::Word> {
        let instr = T::Word::from_u64(u64::from(self.to_byte()));
        match *self {
            Instr::LoadConst { value: literal, .. }
            | Instr::LoadMem { address: literal, .. }
            | Instr::StoreMem { address: literal, .. } => vec![instr, literal],
            _ => vec![instr],
        }
    }

    /// Flattens a sequence of instructions into a program image for the instruction stream
    pub fn encode_program(instrs: impl IntoIterator<Item = Self>) -> Vec<T::Word> {
        instrs
            .into_iter()
            .flat_map(|instr| instr.to_words())
            .collect()
    }

    // `high_reg` lands in bits 3-2, `low_reg` in bits 1-0. Single-register opcodes already carry
    // their sub-operation in bits 3-2 of `opcode`, so `high_reg` is ignored for them.
    fn encode(opcode: u8, high_reg: RegIdx, low_reg: RegIdx) -> u8 {
        // Validate the register values
        debug_assert!(high_reg.is_valid());
        debug_assert!(low_reg.is_valid());

        let mut instr = opcode;
        let class: u8 = opcode.bit_range(CLASS_MSB, CLASS_LSB);
        if class != 0 {
            instr.set_bit_range(HIGH_REG_MSB, HIGH_REG_LSB, high_reg.0);
        }
        instr.set_bit_range(LOW_REG_MSB, LOW_REG_LSB, low_reg.0);
        instr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{Michael16, Michael8};

    #[test]
    fn decode_table() {
        #[rustfmt::skip]
        let cases = [
            (0b0000_0010, Opcode::LoadConst, 2, 2),
            (0b0000_0101, Opcode::LoadMem,   1, 1),
            (0b0000_1011, Opcode::StoreMem,  3, 3),
            (0b0000_1100, Opcode::Not,       0, 0),
            (0b0001_1101, Opcode::Move,      3, 1),
            (0b0010_0001, Opcode::Nand,      0, 1),
            (0b0011_1000, Opcode::And,       2, 0),
            (0b0100_0110, Opcode::Nor,       1, 2),
            (0b0101_1111, Opcode::Or,        3, 3),
            (0b0110_0100, Opcode::Xnor,      1, 0),
            (0b0111_0011, Opcode::Xor,       0, 3),
            (0b1000_1011, Opcode::Add,       2, 3),
            (0b1001_0110, Opcode::AddOvf,    1, 2),
            (0b1010_1001, Opcode::Sub,       2, 1),
            (0b1011_0000, Opcode::SubOvf,    0, 0),
        ];
        for (instr, opcode, rt, rf) in cases {
            assert_eq!(
                DecodedInstr::decode(instr),
                Ok(DecodedInstr {
                    opcode,
                    rt: RegIdx(rt),
                    rf: RegIdx(rf)
                }),
                "0b{instr:08b}"
            );
        }
    }

    #[test]
    fn decode_rejects_unassigned_classes() {
        for instr in [0b1100_0000u8, 0b1101_1011, 0b1110_0001, 0xff] {
            assert_eq!(
                DecodedInstr::decode(instr),
                Err(CpuError::InvalidOpcode {
                    instr: u64::from(instr)
                })
            );
        }
    }

    #[test]
    fn decode_word_rejects_wide_words() {
        assert_eq!(
            DecodedInstr::decode_word(0x0180u16),
            Err(CpuError::InvalidOpcode { instr: 0x180 })
        );
        assert!(DecodedInstr::decode_word(0x0080u16).is_ok());
    }

    #[test]
    fn from_words_consumes_literal() {
        let program = [0b0000_0010u8, 5, 0b1000_1011];
        let (instr, len) = Instr::<Michael8>::from_words(&program).unwrap();
        assert_eq!(
            instr,
            Instr::LoadConst {
                rt: RegIdx(2),
                value: 5
            }
        );
        assert_eq!(len, 2);

        let (instr, len) = Instr::<Michael8>::from_words(&program[2..]).unwrap();
        assert_eq!(
            instr,
            Instr::Add {
                rt: RegIdx(2),
                rf: RegIdx(3)
            }
        );
        assert_eq!(len, 1);

        assert!(matches!(
            Instr::<Michael8>::from_words(&program[..1]),
            Err(CpuError::TruncatedInstruction)
        ));
    }

    #[test]
    fn known_encodings() {
        let program = Instr::<Michael16>::encode_program([
            Instr::LoadConst {
                rt: RegIdx(2),
                value: 0x1234,
            },
            Instr::StoreMem {
                rf: RegIdx(1),
                address: 0xff,
            },
            Instr::Not { rr: RegIdx(3) },
            Instr::SubOvf {
                rt: RegIdx(1),
                rf: RegIdx(2),
            },
        ]);
        assert_eq!(
            program,
            vec![0b0000_0010, 0x1234, 0b0000_1001, 0xff, 0b0000_1111, 0b1011_0110]
        );
    }

    // Tests that decoding is the inverse of encoding on every instruction
    #[test]
    fn encoding_round_trip() {
        fn encode_decode<T: MichaelComputer>() {
            let mut rng = rand::thread_rng();
            for _ in 0..200 {
                let instr = Instr::<T>::rand(&mut rng);
                let words = instr.to_words();
                let (new_i, len) = Instr::<T>::from_words(&words).unwrap();
                assert_eq!(instr, new_i);
                assert_eq!(DecodedInstr::decode(instr.to_byte()), Ok(instr.decoded()));
                assert_eq!(len as u64, instr.word_length());
            }
        }
        crate::iter_over_michael_configs!(encode_decode);
    }
}
