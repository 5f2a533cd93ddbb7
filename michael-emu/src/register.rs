use crate::word::Word;

use core::fmt;

/// Number of general purpose registers. Fixed by the 2-bit register fields of an instruction.
pub const NUM_REGS: usize = 4;

/// Index into the register file. Decoding only ever produces 2-bit indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegIdx(pub u8);

impl RegIdx {
    pub fn is_valid(&self) -> bool {
        usize::from(self.0) < NUM_REGS
    }

    pub fn rand(mut rng: impl rand::Rng) -> Self {
        RegIdx(rng.gen_range(0..NUM_REGS as u8))
    }
}

impl fmt::Display for RegIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// The four general purpose registers. All start out at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegisterFile<W: Word>([W; NUM_REGS]);

impl<W: Word> RegisterFile<W> {
    pub fn read(&self, reg: RegIdx) -> W {
        self.0[usize::from(reg.0)]
    }

    pub fn write(&mut self, reg: RegIdx, value: W) {
        self.0[usize::from(reg.0)] = value;
    }

    /// Copies `src` into `dst`. `src` is left untouched.
    pub fn move_reg(&mut self, dst: RegIdx, src: RegIdx) {
        self.write(dst, self.read(src));
    }

    pub fn as_slice(&self) -> &[W] {
        &self.0
    }
}
