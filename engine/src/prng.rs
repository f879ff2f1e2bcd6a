//! A byte-seeded pseudo-random generator whose output is fixed across
//! platforms and Rust versions.
//!
//! The knockout seeder needs a shuffle that, given the same league order,
//! produces the same bracket every time a resolved view is rebuilt from the
//! same inputs — including on a different machine. A `HashMap`-iteration- or
//! OS-entropy-backed RNG cannot give that guarantee, so this is a from-scratch
//! 32-bit Mersenne Twister (the 1998 Matsumoto-Nishimura reference
//! algorithm), seeded by treating the input bytes as a sequence of
//! little-endian 32-bit words and running them through `init_by_array`.

const N: usize = 624;
const M: usize = 397;
const MATRIX_A: u32 = 0x9908_b0df;
const UPPER_MASK: u32 = 0x8000_0000;
const LOWER_MASK: u32 = 0x7fff_ffff;

/// Deterministic pseudo-random generator seeded from an arbitrary byte
/// string. See the module docs for why this exists instead of `rand`.
#[derive(Debug)]
pub struct StableRandom {
    state: [u32; N],
    index: usize,
}

impl StableRandom {
    /// Seeds the generator from raw bytes, little-endian word at a time,
    /// zero-padding a trailing partial word.
    pub fn from_seed(seed: &[u8]) -> Self {
        let mut key = Vec::with_capacity(seed.len().div_ceil(4).max(1));
        for chunk in seed.chunks(4) {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            key.push(u32::from_le_bytes(word));
        }
        if key.is_empty() {
            key.push(0);
        }
        let mut rng = Self {
            state: [0; N],
            index: N,
        };
        rng.init_by_array(&key);
        rng
    }

    fn init_genrand(&mut self, seed: u32) {
        self.state[0] = seed;
        for i in 1..N {
            self.state[i] = 1_812_433_253u32
                .wrapping_mul(self.state[i - 1] ^ (self.state[i - 1] >> 30))
                .wrapping_add(i as u32);
        }
        self.index = N;
    }

    fn init_by_array(&mut self, key: &[u32]) {
        self.init_genrand(19_650_218);
        let mut i = 1usize;
        let mut j = 0usize;
        let mut k = N.max(key.len());
        while k > 0 {
            self.state[i] = (self.state[i]
                ^ (self.state[i - 1] ^ (self.state[i - 1] >> 30)).wrapping_mul(1_664_525))
            .wrapping_add(key[j])
            .wrapping_add(j as u32);
            i += 1;
            j += 1;
            if i >= N {
                self.state[0] = self.state[N - 1];
                i = 1;
            }
            if j >= key.len() {
                j = 0;
            }
            k -= 1;
        }
        k = N - 1;
        while k > 0 {
            self.state[i] = (self.state[i]
                ^ (self.state[i - 1] ^ (self.state[i - 1] >> 30)).wrapping_mul(1_566_083_941))
            .wrapping_sub(i as u32);
            i += 1;
            if i >= N {
                self.state[0] = self.state[N - 1];
                i = 1;
            }
            k -= 1;
        }
        self.state[0] = 0x8000_0000;
    }

    fn genrand_uint32(&mut self) -> u32 {
        if self.index >= N {
            let mag01 = [0u32, MATRIX_A];
            for kk in 0..N - M {
                let y = (self.state[kk] & UPPER_MASK) | (self.state[kk + 1] & LOWER_MASK);
                self.state[kk] = self.state[kk + M] ^ (y >> 1) ^ mag01[(y & 1) as usize];
            }
            for kk in N - M..N - 1 {
                let y = (self.state[kk] & UPPER_MASK) | (self.state[kk + 1] & LOWER_MASK);
                self.state[kk] = self.state[kk + M - N] ^ (y >> 1) ^ mag01[(y & 1) as usize];
            }
            let y = (self.state[N - 1] & UPPER_MASK) | (self.state[0] & LOWER_MASK);
            self.state[N - 1] = self.state[M - 1] ^ (y >> 1) ^ mag01[(y & 1) as usize];
            self.index = 0;
        }
        let mut y = self.state[self.index];
        self.index += 1;
        y ^= y >> 11;
        y ^= (y << 7) & 0x9d2c_5680;
        y ^= (y << 15) & 0xefc6_0000;
        y ^= y >> 18;
        y
    }

    /// Returns the next `bits` random bits (`bits <= 32`) as an unsigned
    /// integer, matching `random.getrandbits`'s fast path.
    pub fn getrandbits(&mut self, bits: u32) -> u32 {
        assert!(bits > 0 && bits <= 32, "bits must be in 1..=32");
        self.genrand_uint32() >> (32 - bits)
    }

    /// Returns a float in `[0.0, 1.0)` with 53 bits of precision, matching
    /// `random.random`.
    pub fn random(&mut self) -> f64 {
        let a = self.genrand_uint32() >> 5;
        let b = self.genrand_uint32() >> 6;
        (a as f64 * 67_108_864.0 + b as f64) * (1.0 / 9_007_199_254_740_992.0)
    }

    fn randbelow(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        let k = bit_length(n);
        loop {
            let r = self.getrandbits(k) as usize;
            if r < n {
                return r;
            }
        }
    }

    /// Shuffles `items` in place using Fisher-Yates driven by
    /// [`Self::randbelow`], matching `random.shuffle`.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        if items.len() < 2 {
            return;
        }
        for i in (1..items.len()).rev() {
            let j = self.randbelow(i + 1);
            items.swap(i, j);
        }
    }
}

fn bit_length(n: usize) -> u32 {
    (usize::BITS - n.leading_zeros()).max(1)
}
