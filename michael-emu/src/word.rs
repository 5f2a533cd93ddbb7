use crate::gate::Gate;

use core::fmt::{Debug, Display, LowerHex};

use bitfield::{BitRange, BitRangeMut};
use rand::Rng;

/// The machine's unit of data. Registers, memory cells and literals are all one `Word` wide.
pub trait Word:
    Debug
    + Display
    + LowerHex
    + Default
    + Eq
    + Ord
    + Copy
    + Gate
    + Into<u64>
    + BitRange<u8>
    + BitRangeMut<u8>
{
    const BIT_LENGTH: usize;
    const ZERO: Self;
    const ONE: Self;
    const MAX: Self;

    /// Converts `val` into a word, keeping only the low `BIT_LENGTH` bits
    fn from_u64(val: u64) -> Self;

    /// Returns a uniformly random word. Useful for testing
    fn rand(rng: impl Rng) -> Self;

    /// Interprets this word as an index, e.g. a memory address
    fn as_index(self) -> Option<usize> {
        let val: u64 = self.into();
        usize::try_from(val).ok()
    }
}

macro_rules! impl_word {
    ($t:ty) => {
        impl Word for $t {
            const BIT_LENGTH: usize = <$t>::BITS as usize;
            const ZERO: Self = 0;
            const ONE: Self = 1;
            const MAX: Self = <$t>::MAX;

            fn from_u64(val: u64) -> Self {
                val as $t
            }

            fn rand(mut rng: impl Rng) -> Self {
                rng.gen()
            }
        }
    };
}

impl_word!(u8);
impl_word!(u16);
impl_word!(u32);
impl_word!(u64);
