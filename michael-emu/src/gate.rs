//! Logic gates. NAND is the only primitive; every other gate is wired out of NANDs.

/// A value that can be fed through a NAND gate. Implemented for a single wire (`bool`) and,
/// bitwise, for every machine word.
pub trait Gate: Copy {
    /// The primitive gate
    fn nand(self, other: Self) -> Self;

    /// `NAND(a, a)`
    fn not(self) -> Self {
        self.nand(self)
    }

    /// `NOT(NAND(a, b))`
    fn and(self, other: Self) -> Self {
        self.nand(other).not()
    }

    /// `NAND(NOT a, NOT b)`
    fn or(self, other: Self) -> Self {
        self.not().nand(other.not())
    }

    /// `NOT(OR(a, b))`
    fn nor(self, other: Self) -> Self {
        self.or(other).not()
    }

    /// `NAND(NAND(a, b), OR(a, b))`, i.e. 1 wherever the inputs agree
    fn xnor(self, other: Self) -> Self {
        self.nand(other).nand(self.or(other))
    }

    /// `NOT(XNOR(a, b))`
    fn xor(self, other: Self) -> Self {
        self.xnor(other).not()
    }
}

impl Gate for bool {
    fn nand(self, other: Self) -> Self {
        !(self && other)
    }
}

macro_rules! impl_gate {
    ($($t:ty),*) => {
        $(
            impl Gate for $t {
                fn nand(self, other: Self) -> Self {
                    !(self & other)
                }
            }
        )*
    };
}

impl_gate!(u8, u16, u32, u64);
