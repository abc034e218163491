use crate::hasher::{HashError, Hasher};

/// Size of the Keccak-f[1600] state in bytes.
const STATE_LEN: usize = 200;

const ROUNDS: usize = 24;

const RHO: [u32; 24] = [
    1, 3, 6, 10, 15, 21, 28, 36, 45, 55, 2, 14, 27, 41, 56, 8, 25, 43, 62, 18, 39, 61, 20, 44,
];

const PI: [usize; 24] = [
    10, 7, 11, 17, 18, 3, 5, 16, 8, 21, 24, 4, 15, 23, 19, 13, 12, 2, 20, 14, 22, 9, 6, 1,
];

const RC: [u64; ROUNDS] = [
    0x0000000000000001,
    0x0000000000008082,
    0x800000000000808a,
    0x8000000080008000,
    0x000000000000808b,
    0x0000000080000001,
    0x8000000080008081,
    0x8000000000008009,
    0x000000000000008a,
    0x0000000000000088,
    0x0000000080008009,
    0x000000008000000a,
    0x000000008000808b,
    0x800000000000008b,
    0x8000000000008089,
    0x8000000000008003,
    0x8000000000008002,
    0x8000000000000080,
    0x000000000000800a,
    0x800000008000000a,
    0x8000000080008081,
    0x8000000000008080,
    0x0000000080000001,
    0x8000000080008008,
];

/// The Keccak-f[1600] permutation over 25 little-endian lanes.
pub fn keccak_f1600(a: &mut [u64; 25]) {
    for rc in RC {
        // theta
        let mut c = [0u64; 5];
        for (x, column) in c.iter_mut().enumerate() {
            *column = a[x] ^ a[x + 5] ^ a[x + 10] ^ a[x + 15] ^ a[x + 20];
        }
        for x in 0..5 {
            let d = c[(x + 4) % 5] ^ c[(x + 1) % 5].rotate_left(1);
            for y in (0..25).step_by(5) {
                a[y + x] ^= d;
            }
        }

        // rho and pi
        let mut last = a[1];
        for (&j, &rho) in PI.iter().zip(RHO.iter()) {
            let tmp = a[j];
            a[j] = last.rotate_left(rho);
            last = tmp;
        }

        // chi
        for y in (0..25).step_by(5) {
            let row = [a[y], a[y + 1], a[y + 2], a[y + 3], a[y + 4]];
            for x in 0..5 {
                a[y + x] = row[x] ^ (!row[(x + 1) % 5] & row[(x + 2) % 5]);
            }
        }

        // iota
        a[0] ^= rc;
    }
}

/// A Keccak sponge.
///
/// `rate` bytes of the state absorb input per permutation; `suffix` is the
/// domain separation byte (`0x01` for Keccak, `0x1f` for SHAKE).
#[derive(Clone, Debug)]
pub struct Keccak {
    state: [u64; 25],
    rate: usize,
    suffix: u8,
    output_len: usize,
    xof_enabled: bool,
    pos: usize,
    pos_out: usize,
    finished: bool,
    destroyed: bool,
}

impl Keccak {
    fn with_params(rate: usize, suffix: u8, output_len: usize, xof_enabled: bool) -> Self {
        debug_assert!(rate > 0 && rate < STATE_LEN);
        Self {
            state: [0; 25],
            rate,
            suffix,
            output_len,
            xof_enabled,
            pos: 0,
            pos_out: 0,
            finished: false,
            destroyed: false,
        }
    }

    /// Keccak-256 as used by Ethereum (pre-standard padding).
    pub fn v256() -> Self {
        Self::with_params(136, 0x01, 32, false)
    }

    pub fn shake128(output_len: usize) -> Self {
        Self::with_params(168, 0x1f, output_len, true)
    }

    pub fn shake256(output_len: usize) -> Self {
        Self::with_params(136, 0x1f, output_len, true)
    }

    fn xor_byte(&mut self, index: usize, byte: u8) {
        self.state[index / 8] ^= u64::from(byte) << (8 * (index % 8));
    }

    fn state_byte(&self, index: usize) -> u8 {
        (self.state[index / 8] >> (8 * (index % 8))) as u8
    }

    fn permute(&mut self) {
        keccak_f1600(&mut self.state);
        self.pos = 0;
        self.pos_out = 0;
    }

    fn absorb(&mut self, data: &[u8]) {
        for byte in data {
            self.xor_byte(self.pos, *byte);
            self.pos += 1;
            if self.pos == self.rate {
                self.permute();
            }
        }
    }

    fn pad(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.xor_byte(self.pos, self.suffix);
        if self.suffix & 0x80 != 0 && self.pos == self.rate - 1 {
            self.permute();
        }
        self.xor_byte(self.rate - 1, 0x80);
        self.permute();
    }

    fn squeeze(&mut self, out: &mut [u8]) {
        self.pad();
        for byte in out.iter_mut() {
            if self.pos_out >= self.rate {
                self.permute();
            }
            *byte = self.state_byte(self.pos_out);
            self.pos_out += 1;
        }
    }

    /// Squeezes `len` more bytes. Only available on XOF instances, and may be
    /// called repeatedly; `update` and `digest` fail afterwards.
    pub fn xof(&mut self, len: usize) -> Result<Vec<u8>, HashError> {
        if !self.xof_enabled {
            return Err(HashError::XofNotEnabled);
        }
        if self.destroyed {
            return Err(HashError::Destroyed);
        }
        let mut out = vec![0u8; len];
        self.squeeze(&mut out);
        Ok(out)
    }

    fn wipe(&mut self) {
        self.state = [0; 25];
        self.pos = 0;
        self.pos_out = 0;
    }
}

impl Hasher for Keccak {
    fn block_len(&self) -> usize {
        self.rate
    }

    fn output_len(&self) -> usize {
        self.output_len
    }

    fn update(&mut self, data: &[u8]) -> Result<&mut Self, HashError> {
        if self.finished {
            return Err(HashError::AlreadyFinalized);
        }
        if self.destroyed {
            return Err(HashError::Destroyed);
        }
        self.absorb(data);
        Ok(self)
    }

    fn digest_into(&mut self, out: &mut [u8]) -> Result<(), HashError> {
        if self.finished {
            return Err(HashError::AlreadyFinalized);
        }
        if self.destroyed {
            return Err(HashError::Destroyed);
        }
        if out.len() < self.output_len {
            return Err(HashError::OutputTooShort {
                expected: self.output_len,
                got: out.len(),
            });
        }
        let output_len = self.output_len;
        self.squeeze(&mut out[..output_len]);
        self.destroy();
        Ok(())
    }

    fn destroy(&mut self) {
        self.destroyed = true;
        self.wipe();
    }
}

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.absorb(data);
    let mut out = [0u8; 32];
    hasher.squeeze(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use proptest::prelude::*;

    fn reference_keccak256(data: &[u8]) -> Vec<u8> {
        use sha3::Digest;
        sha3::Keccak256::digest(data).to_vec()
    }

    fn reference_shake128(data: &[u8], len: usize) -> Vec<u8> {
        use sha3::digest::{ExtendableOutput, Update, XofReader};
        let mut hasher = sha3::Shake128::default();
        hasher.update(data);
        let mut out = vec![0u8; len];
        hasher.finalize_xof().read(&mut out);
        out
    }

    #[test]
    fn known_vectors() {
        assert_eq!(
            keccak256(b""),
            hex!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470")
        );
        assert_eq!(
            keccak256(b"abc"),
            hex!("4e03657aea45a94fc7d47ba826c8d667c0d1e6e33a64a036ec44f58fa12d6c45")
        );
    }

    #[test]
    fn shake_vectors() {
        assert_eq!(
            Keccak::shake128(32).xof(32).unwrap(),
            hex!("7f9c2ba4e88f827d616045507605853ed73b8093f6efbc88eb1a6eacfa66ef26").to_vec()
        );
        assert_eq!(
            Keccak::shake256(32).digest().unwrap(),
            hex!("46b9dd2b0ba88d13233b3feb743eeb243fcd52ea62b81b82b50c27646ed5762f").to_vec()
        );
    }

    #[test]
    fn rate_boundaries() {
        for len in [135, 136, 137, 271, 272, 273] {
            let data = vec![0x5a; len];
            assert_eq!(keccak256(&data).to_vec(), reference_keccak256(&data));
        }
    }

    #[test]
    fn xof_streams_across_blocks() {
        let mut shake = Keccak::shake128(0);
        shake.update(b"ethwire").unwrap();
        let mut streamed = shake.xof(100).unwrap();
        streamed.extend(shake.xof(300).unwrap());
        assert_eq!(streamed, reference_shake128(b"ethwire", 400));
        assert!(matches!(shake.update(b"x"), Err(HashError::AlreadyFinalized)));
        assert_eq!(shake.digest(), Err(HashError::AlreadyFinalized));
    }

    #[test]
    fn keccak256_has_no_xof() {
        assert_eq!(Keccak::v256().xof(32), Err(HashError::XofNotEnabled));
    }

    #[test]
    fn digest_is_single_use() {
        let mut hasher = Keccak::v256();
        hasher.update(b"a").unwrap().update(b"bc").unwrap();
        assert_eq!(hasher.digest().unwrap(), keccak256(b"abc").to_vec());
        assert_eq!(hasher.digest(), Err(HashError::AlreadyFinalized));
    }

    #[test]
    fn destroyed_hasher_rejects_input() {
        let mut hasher = Keccak::v256();
        hasher.destroy();
        assert!(matches!(hasher.update(b""), Err(HashError::Destroyed)));
        assert_eq!(hasher.digest(), Err(HashError::Destroyed));
    }

    proptest! {
        /// Chunked Keccak-256 agrees with the reference implementation.
        #[test]
        fn matches_reference(data in prop::collection::vec(any::<u8>(), 0..700), split in 0usize..700) {
            let split = split.min(data.len());
            let mut hasher = Keccak::v256();
            hasher.update(&data[..split]).unwrap();
            hasher.update(&data[split..]).unwrap();
            let expected = reference_keccak256(&data);
            prop_assert_eq!(hasher.digest().unwrap(), expected.clone());
            prop_assert_eq!(keccak256(&data).to_vec(), expected);
        }

        /// SHAKE128 output of any length agrees with the reference implementation.
        #[test]
        fn shake128_matches_reference(data in prop::collection::vec(any::<u8>(), 0..400), len in 0usize..500) {
            let mut shake = Keccak::shake128(len);
            shake.update(&data).unwrap();
            prop_assert_eq!(shake.xof(len).unwrap(), reference_shake128(&data, len));
        }
    }
}
