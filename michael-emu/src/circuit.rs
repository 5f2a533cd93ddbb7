//! Adder circuits, wired from the gates in [`crate::gate`].

use crate::{gate::Gate, word::Word};

use bitfield::{Bit, BitMut};

/// Returns `(sum, carry)`
pub fn half_adder(left: bool, right: bool) -> (bool, bool) {
    (left.xor(right), left.and(right))
}

/// Returns `(sum, carry)`
pub fn full_adder(left: bool, right: bool, carry: bool) -> (bool, bool) {
    let (partial_sum, first_carry) = half_adder(left, right);
    let (sum, second_carry) = half_adder(partial_sum, carry);
    (sum, first_carry.or(second_carry))
}

/// Chains one full adder per bit, least significant first. Returns the sum modulo `2^BIT_LENGTH`
/// and the carry out of the most significant bit.
pub fn ripple_carry_add<W: Word>(left: W, right: W, carry_in: bool) -> (W, bool) {
    let mut sum = W::ZERO;
    let mut carry = carry_in;
    for i in 0..W::BIT_LENGTH {
        let (bit, carry_out) = full_adder(left.bit(i), right.bit(i), carry);
        sum.set_bit(i, bit);
        carry = carry_out;
    }
    (sum, carry)
}
