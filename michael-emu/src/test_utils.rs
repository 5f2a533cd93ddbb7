use std::marker::PhantomData;

use tracing_subscriber::EnvFilter;

use crate::{word::Word, MichaelComputer};

#[derive(Copy, Clone)]
pub struct MichaelConfig<W: Word, const CAPACITY: usize> {
    _word: PhantomData<W>,
}

impl<W: Word, const CAPACITY: usize> MichaelComputer for MichaelConfig<W, CAPACITY> {
    type Word = W;
    const MEMORY_CAPACITY: usize = CAPACITY;
}

pub type Michael8 = MichaelConfig<u8, 256>;
pub type Michael16 = MichaelConfig<u16, 256>;
pub type Michael32 = MichaelConfig<u32, 1024>;
pub type Michael64 = MichaelConfig<u64, 1024>;

/// An 8-bit machine whose top memory cell is a character output port
#[derive(Copy, Clone)]
pub struct MichaelTty;

impl MichaelComputer for MichaelTty {
    type Word = u8;
    const MEMORY_CAPACITY: usize = 256;
    const OUTPUT_ADDRESS: Option<u64> = Some(0xff);
}

/// Sends `tracing` output to the test harness, filtered by `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[macro_export]
macro_rules! iter_over_michael_configs {
    ($f: ident) => {{
        $f::<$crate::test_utils::Michael8>();
        $f::<$crate::test_utils::Michael16>();
        $f::<$crate::test_utils::Michael32>();
        $f::<$crate::test_utils::Michael64>();
        $f::<$crate::test_utils::MichaelTty>();
    }};
}
