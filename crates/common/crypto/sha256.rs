use crate::{
    hasher::{HashError, Hasher},
    md::{BLOCK_LEN, Compression, MdCore},
};

pub const OUTPUT_LEN: usize = 32;

/// First 32 bits of the fractional parts of the cube roots of the first 64 primes.
const K: [u32; 64] = [
    0x428a2f98, 0x71374491, 0xb5c0fbcf, 0xe9b5dba5, 0x3956c25b, 0x59f111f1, 0x923f82a4, 0xab1c5ed5,
    0xd807aa98, 0x12835b01, 0x243185be, 0x550c7dc3, 0x72be5d74, 0x80deb1fe, 0x9bdc06a7, 0xc19bf174,
    0xe49b69c1, 0xefbe4786, 0x0fc19dc6, 0x240ca1cc, 0x2de92c6f, 0x4a7484aa, 0x5cb0a9dc, 0x76f988da,
    0x983e5152, 0xa831c66d, 0xb00327c8, 0xbf597fc7, 0xc6e00bf3, 0xd5a79147, 0x06ca6351, 0x14292967,
    0x27b70a85, 0x2e1b2138, 0x4d2c6dfc, 0x53380d13, 0x650a7354, 0x766a0abb, 0x81c2c92e, 0x92722c85,
    0xa2bfe8a1, 0xa81a664b, 0xc24b8b70, 0xc76c51a3, 0xd192e819, 0xd6990624, 0xf40e3585, 0x106aa070,
    0x19a4c116, 0x1e376c08, 0x2748774c, 0x34b0bcb5, 0x391c0cb3, 0x4ed8aa4a, 0x5b9cca4f, 0x682e6ff3,
    0x748f82ee, 0x78a5636f, 0x84c87814, 0x8cc70208, 0x90befffa, 0xa4506ceb, 0xbef9a3f7, 0xc67178f2,
];

const IV: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

#[derive(Clone, Debug)]
pub struct Sha256State([u32; 8]);

impl Compression for Sha256State {
    const OUTPUT_LEN: usize = OUTPUT_LEN;

    fn initial() -> Self {
        Self(IV)
    }

    fn compress(&mut self, block: &[u8]) {
        debug_assert_eq!(block.len(), BLOCK_LEN);

        let mut w = [0u32; 64];
        for (word, chunk) in w.iter_mut().zip(block.chunks_exact(4)) {
            *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        for i in 16..64 {
            let s0 = w[i - 15].rotate_right(7) ^ w[i - 15].rotate_right(18) ^ (w[i - 15] >> 3);
            let s1 = w[i - 2].rotate_right(17) ^ w[i - 2].rotate_right(19) ^ (w[i - 2] >> 10);
            w[i] = w[i - 16]
                .wrapping_add(s0)
                .wrapping_add(w[i - 7])
                .wrapping_add(s1);
        }

        let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = self.0;
        for (k, w) in K.iter().zip(w.iter()) {
            let sigma1 = e.rotate_right(6) ^ e.rotate_right(11) ^ e.rotate_right(25);
            let ch = (e & f) ^ (!e & g);
            let t1 = h
                .wrapping_add(sigma1)
                .wrapping_add(ch)
                .wrapping_add(*k)
                .wrapping_add(*w);
            let sigma0 = a.rotate_right(2) ^ a.rotate_right(13) ^ a.rotate_right(22);
            let maj = (a & b) ^ (a & c) ^ (b & c);
            let t2 = sigma0.wrapping_add(maj);
            h = g;
            g = f;
            f = e;
            e = d.wrapping_add(t1);
            d = c;
            c = b;
            b = a;
            a = t1.wrapping_add(t2);
        }

        for (state, value) in self.0.iter_mut().zip([a, b, c, d, e, f, g, h]) {
            *state = state.wrapping_add(value);
        }
    }

    fn write_output(&self, out: &mut [u8]) {
        for (chunk, word) in out.chunks_exact_mut(4).zip(self.0.iter()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
    }

    fn wipe(&mut self) {
        self.0 = [0; 8];
    }
}

/// Streaming SHA-256.
#[derive(Clone, Debug, Default)]
pub struct Sha256 {
    core: MdCore<Sha256State>,
}

impl Sha256 {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Hasher for Sha256 {
    fn block_len(&self) -> usize {
        BLOCK_LEN
    }

    fn output_len(&self) -> usize {
        OUTPUT_LEN
    }

    fn update(&mut self, data: &[u8]) -> Result<&mut Self, HashError> {
        self.core.check_usable()?;
        self.core.absorb(data);
        Ok(self)
    }

    fn digest_into(&mut self, out: &mut [u8]) -> Result<(), HashError> {
        self.core.check_usable()?;
        if out.len() < OUTPUT_LEN {
            return Err(HashError::OutputTooShort {
                expected: OUTPUT_LEN,
                got: out.len(),
            });
        }
        self.core.finalize_into(out);
        Ok(())
    }

    fn destroy(&mut self) {
        self.core.destroy();
    }
}

pub fn sha256(data: &[u8]) -> [u8; OUTPUT_LEN] {
    let mut core = MdCore::<Sha256State>::new();
    core.absorb(data);
    let mut out = [0u8; OUTPUT_LEN];
    core.finalize_into(&mut out);
    out
}
