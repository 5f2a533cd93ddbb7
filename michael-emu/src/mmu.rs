use derivative::Derivative;

use crate::{
    error::{CpuError, Result},
    instructions::Instr,
    word::Word,
    MichaelComputer,
};

/// Fixed-capacity, word-addressed data memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataMemory<W: Word>(Vec<W>);

impl<W: Word> DataMemory<W> {
    /// Returns `capacity` zeroed cells
    pub fn zeroed(capacity: usize) -> Self {
        Self(vec![W::ZERO; capacity])
    }

    /// Returns `capacity` cells, the first of which hold `image`. Fails if the image doesn't fit.
    pub fn with_image(capacity: usize, image: &[W]) -> Result<Self> {
        if image.len() > capacity {
            return Err(CpuError::MemoryOutOfRange {
                address: capacity as u64,
                capacity,
            });
        }
        let mut memory = Self::zeroed(capacity);
        memory.0[..image.len()].copy_from_slice(image);
        Ok(memory)
    }

    // The address as an index into the cells, if it is in range
    fn index_of(&self, address: W) -> Result<usize> {
        address
            .as_index()
            .filter(|&i| i < self.0.len())
            .ok_or(CpuError::MemoryOutOfRange {
                address: address.into(),
                capacity: self.0.len(),
            })
    }

    pub fn load(&self, address: W) -> Result<W> {
        let i = self.index_of(address)?;
        Ok(self.0[i])
    }

    pub fn store(&mut self, address: W, value: W) -> Result<()> {
        let i = self.index_of(address)?;
        self.0[i] = value;
        Ok(())
    }

    pub fn as_slice(&self) -> &[W] {
        &self.0
    }
}

/// The read-only instruction stream
#[derive(Derivative)]
#[derivative(
    Default(bound = "T: MichaelComputer"),
    Debug(bound = "T: MichaelComputer"),
    Clone(bound = "T: MichaelComputer"),
    PartialEq(bound = "T: MichaelComputer"),
    Eq(bound = "T: MichaelComputer")
)]
pub struct ProgramMemory<T: MichaelComputer>(Vec<T::Word>);

impl<T: MichaelComputer> ProgramMemory<T> {
    pub fn new(program: Vec<T::Word>) -> Self {
        Self(program)
    }

    /// The stream from `pc` onward. Empty once `pc` is past the end.
    pub fn stream_at(&self, pc: u64) -> &[T::Word] {
        usize::try_from(pc)
            .ok()
            .and_then(|pc| self.0.get(pc..))
            .unwrap_or(&[])
    }
}

/// Contains the program ROM and data RAM necessary to run a program
#[derive(Derivative)]
#[derivative(
    Debug(bound = "T: MichaelComputer"),
    Clone(bound = "T: MichaelComputer"),
    PartialEq(bound = "T: MichaelComputer"),
    Eq(bound = "T: MichaelComputer")
)]
pub struct MemoryUnit<T: MichaelComputer> {
    data_ram: DataMemory<T::Word>,
    /// What `data_ram` held before execution started
    initial_ram: DataMemory<T::Word>,
    program_rom: ProgramMemory<T>,
}

impl<T: MichaelComputer> MemoryUnit<T> {
    /// Loads `program` into ROM alongside a zeroed `T::MEMORY_CAPACITY`-cell RAM
    pub fn new(program: &[T::Word]) -> Self {
        Self::from_parts(program, DataMemory::zeroed(T::MEMORY_CAPACITY))
    }

    /// Loads `program` into ROM and `data` at the bottom of a `T::MEMORY_CAPACITY`-cell RAM
    pub fn initialize(program: &[T::Word], data: &[T::Word]) -> Result<Self> {
        let data_ram = DataMemory::with_image(T::MEMORY_CAPACITY, data)?;
        Ok(Self::from_parts(program, data_ram))
    }

    fn from_parts(program: &[T::Word], data_ram: DataMemory<T::Word>) -> Self {
        Self {
            initial_ram: data_ram.clone(),
            data_ram,
            program_rom: ProgramMemory::new(program.to_vec()),
        }
    }

    /// Decodes the instruction at `pc`. Returns `None` once `pc` runs past the end of the
    /// program, along with the number of stream words the instruction spans otherwise.
    pub fn get_instruction(&self, pc: u64) -> Result<Option<(Instr<T>, usize)>> {
        let stream = self.program_rom.stream_at(pc);
        if stream.is_empty() {
            return Ok(None);
        }
        Instr::from_words(stream).map(Some)
    }

    pub(crate) fn load_word(&self, location: T::Word) -> Result<(T::Word, MemOp<T::Word>)> {
        let val = self.data_ram.load(location)?;
        Ok((val, MemOp::Load { val, location }))
    }

    pub(crate) fn store_word(&mut self, location: T::Word, val: T::Word) -> Result<MemOp<T::Word>> {
        self.data_ram.store(location, val)?;
        Ok(MemOp::Store { val, location })
    }

    /// Puts the data RAM back the way it was at initialization
    pub fn reset(&mut self) {
        self.data_ram = self.initial_ram.clone();
    }

    pub fn data(&self) -> &DataMemory<T::Word> {
        &self.data_ram
    }
}

/// A data memory access performed by an instruction
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MemOp<W: Word> {
    /// Load a word from RAM
    Load {
        /// The word being loaded
        val: W,
        /// The address the value is being loaded from
        location: W,
    },
    /// Store a word to RAM
    Store {
        /// The word being stored
        val: W,
        /// The address the value is being stored to
        location: W,
    },
}

impl<W: Word> MemOp<W> {
    /// The address being loaded from or stored to
    pub fn location(&self) -> u64 {
        match *self {
            MemOp::Store { location, .. } => location.into(),
            MemOp::Load { location, .. } => location.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        register::RegIdx,
        test_utils::{Michael16, Michael8},
    };

    #[test]
    fn store_then_load() {
        let mut mem = DataMemory::<u8>::zeroed(256);
        mem.store(0x42, 7).unwrap();
        assert_eq!(mem.load(0x42), Ok(7));
        assert_eq!(mem.load(0x43), Ok(0));
    }

    #[test]
    fn out_of_range_access() {
        let mut mem = DataMemory::<u16>::zeroed(16);
        let err = CpuError::MemoryOutOfRange {
            address: 16,
            capacity: 16,
        };
        assert_eq!(mem.load(16), Err(err));
        assert_eq!(mem.store(16, 1), Err(err));
        assert_eq!(mem.as_slice(), &[0; 16]);
        assert_eq!(mem.load(15), Ok(0));
    }

    #[test]
    fn image_must_fit() {
        let mem = DataMemory::<u8>::with_image(4, &[1, 2]).unwrap();
        assert_eq!(mem.as_slice(), &[1, 2, 0, 0]);
        assert_eq!(
            DataMemory::<u8>::with_image(1, &[1, 2]),
            Err(CpuError::MemoryOutOfRange {
                address: 1,
                capacity: 1
            })
        );
    }

    #[test]
    fn mem_ops_are_recorded() {
        let mut mem = MemoryUnit::<Michael16>::initialize(&[], &[0, 9]).unwrap();
        assert_eq!(mem.load_word(1), Ok((9, MemOp::Load { val: 9, location: 1 })));
        let op = mem.store_word(3, 0xbeef).unwrap();
        assert_eq!(
            op,
            MemOp::Store {
                val: 0xbeef,
                location: 3
            }
        );
        assert_eq!(op.location(), 3);
        assert_eq!(mem.data().as_slice()[..4], [0, 9, 0, 0xbeef]);

        mem.reset();
        assert_eq!(mem.data().as_slice()[..4], [0, 9, 0, 0]);
    }

    #[test]
    fn instruction_fetch() {
        let program = [0b0000_0001u8, 0x10, 0b0001_0110];
        let mem = MemoryUnit::<Michael8>::initialize(&program, &[]).unwrap();
        assert_eq!(
            mem.get_instruction(0),
            Ok(Some((
                Instr::LoadConst {
                    rt: RegIdx(1),
                    value: 0x10
                },
                2
            )))
        );
        assert_eq!(
            mem.get_instruction(2),
            Ok(Some((
                Instr::Move {
                    rt: RegIdx(1),
                    rf: RegIdx(2)
                },
                1
            )))
        );
        assert_eq!(mem.get_instruction(3), Ok(None));
        assert_eq!(mem.get_instruction(u64::MAX), Ok(None));
    }
}
