//! Merkle–Damgård scaffolding shared by 64-byte-block hashes.

use crate::hasher::HashError;

pub const BLOCK_LEN: usize = 64;

/// Bytes at the end of the final block holding the message length in bits.
const LENGTH_LEN: usize = 8;

/// The chaining state and compression function of a concrete hash.
pub trait Compression: Clone {
    const OUTPUT_LEN: usize;

    fn initial() -> Self;

    /// `block` is always exactly [`BLOCK_LEN`] bytes.
    fn compress(&mut self, block: &[u8]);

    fn write_output(&self, out: &mut [u8]);

    fn wipe(&mut self);
}

/// Buffers input into blocks and applies the padding rule (`0x80`, zeros,
/// big-endian bit length) on finalization.
#[derive(Clone, Debug)]
pub struct MdCore<C> {
    state: C,
    buffer: [u8; BLOCK_LEN],
    buffered: usize,
    length: u64,
    finished: bool,
    destroyed: bool,
}

impl<C: Compression> Default for MdCore<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Compression> MdCore<C> {
    pub fn new() -> Self {
        Self {
            state: C::initial(),
            buffer: [0u8; BLOCK_LEN],
            buffered: 0,
            length: 0,
            finished: false,
            destroyed: false,
        }
    }

    pub fn check_usable(&self) -> Result<(), HashError> {
        if self.finished {
            return Err(HashError::AlreadyFinalized);
        }
        if self.destroyed {
            return Err(HashError::Destroyed);
        }
        Ok(())
    }

    pub fn absorb(&mut self, mut data: &[u8]) {
        self.length = self.length.wrapping_add(data.len() as u64);

        if self.buffered > 0 {
            let take = (BLOCK_LEN - self.buffered).min(data.len());
            self.buffer[self.buffered..self.buffered + take].copy_from_slice(&data[..take]);
            self.buffered += take;
            data = &data[take..];
            if self.buffered < BLOCK_LEN {
                return;
            }
            self.state.compress(&self.buffer);
            self.buffered = 0;
        }

        let mut blocks = data.chunks_exact(BLOCK_LEN);
        for block in &mut blocks {
            self.state.compress(block);
        }
        let rest = blocks.remainder();
        self.buffer[..rest.len()].copy_from_slice(rest);
        self.buffered = rest.len();
    }

    /// Pads, writes `C::OUTPUT_LEN` bytes into `out` and wipes the state.
    /// `out` must be at least that long.
    pub fn finalize_into(&mut self, out: &mut [u8]) {
        let bit_length = self.length.wrapping_mul(8);

        self.buffer[self.buffered] = 0x80;
        self.buffered += 1;
        self.buffer[self.buffered..].fill(0);
        if LENGTH_LEN > BLOCK_LEN - self.buffered {
            self.state.compress(&self.buffer);
            self.buffer.fill(0);
        }
        self.buffer[BLOCK_LEN - LENGTH_LEN..].copy_from_slice(&bit_length.to_be_bytes());
        self.state.compress(&self.buffer);
        self.state.write_output(&mut out[..C::OUTPUT_LEN]);

        self.finished = true;
        self.wipe();
    }

    pub fn destroy(&mut self) {
        self.destroyed = true;
        self.wipe();
    }

    fn wipe(&mut self) {
        self.state.wipe();
        self.buffer.fill(0);
        self.buffered = 0;
        self.length = 0;
    }
}
