use derivative::Derivative;

use crate::{mmu::MemOp, word::Word, MichaelComputer};

/// Everything the program has written to the memory-mapped output port, in order
#[derive(Derivative)]
#[derivative(
    Default(bound = "T: MichaelComputer"),
    Debug(bound = "T: MichaelComputer"),
    Clone(bound = "T: MichaelComputer"),
    PartialEq(bound = "T: MichaelComputer"),
    Eq(bound = "T: MichaelComputer")
)]
pub struct OutputPort<T: MichaelComputer> {
    written: Vec<T::Word>,
}

impl<T: MichaelComputer> OutputPort<T> {
    /// Records `mem_op` if it is a store to `T::OUTPUT_ADDRESS`
    pub fn observe(&mut self, mem_op: &MemOp<T::Word>) -> Option<PortOp<T::Word>> {
        let port = T::OUTPUT_ADDRESS?;
        match *mem_op {
            MemOp::Store { val, .. } if mem_op.location() == port => {
                self.written.push(val);
                Some(PortOp::Write { val })
            },
            _ => None,
        }
    }

    pub fn written(&self) -> &[T::Word] {
        &self.written
    }

    /// The output truncated to bytes, the way a character device would see it
    pub fn as_bytes(&self) -> Vec<u8> {
        self.written
            .iter()
            .map(|&w| {
                let val: u64 = w.into();
                val as u8
            })
            .collect()
    }

    pub fn as_string(&self) -> String {
        String::from_utf8_lossy(&self.as_bytes()).into_owned()
    }

    pub fn clear(&mut self) {
        self.written.clear();
    }
}

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum PortOp<W: Word> {
    Write { val: W },
}
