//! The arithmetic/logic unit. Stateless: every operation is a pure function of its operands.

use crate::{circuit::ripple_carry_add, gate::Gate, word::Word};

use strum::Display;

/// An operation the ALU knows how to perform
#[derive(Debug, Copy, Clone, Eq, PartialEq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum AluOp {
    Not,
    Nand,
    And,
    Nor,
    Or,
    Xnor,
    Xor,
    Add,
    AddOvf,
    Sub,
    SubOvf,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AluOutput<W: Word> {
    pub result: W,
    /// Unsigned carry (add) or borrow (sub). `None` unless the op exposes overflow.
    pub overflow: Option<bool>,
}

/// Returns `(left - right, borrow)`, computed as `left + NOT right + 1`
pub fn borrowing_sub<W: Word>(left: W, right: W) -> (W, bool) {
    let (diff, carry) = ripple_carry_add(left, right.not(), true);
    (diff, carry.not())
}

/// Applies `op` to the operands. `right` is ignored by the unary `Not`.
pub fn execute<W: Word>(op: AluOp, left: W, right: W) -> AluOutput<W> {
    let (result, overflow) = match op {
        AluOp::Not => (left.not(), None),
        AluOp::Nand => (left.nand(right), None),
        AluOp::And => (left.and(right), None),
        AluOp::Nor => (left.nor(right), None),
        AluOp::Or => (left.or(right), None),
        AluOp::Xnor => (left.xnor(right), None),
        AluOp::Xor => (left.xor(right), None),
        AluOp::Add => (ripple_carry_add(left, right, false).0, None),
        AluOp::AddOvf => {
            let (sum, carry) = ripple_carry_add(left, right, false);
            (sum, Some(carry))
        },
        AluOp::Sub => (borrowing_sub(left, right).0, None),
        AluOp::SubOvf => {
            let (diff, borrow) = borrowing_sub(left, right);
            (diff, Some(borrow))
        },
    };

    AluOutput { result, overflow }
}
