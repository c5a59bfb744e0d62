use serde::{Deserialize, Serialize};

use super::RandomSource;

/// xoshiro256** engine: 256 bits of state, period 2^256 - 1, jump-ahead support.
///
/// The struct is nothing but the state, so cloning or serializing it captures the exact
/// stream position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Xoshiro256StarStar {
    s: [u64; 4],
}

impl Xoshiro256StarStar {
    /// Expands `seed` into the four state words with one SplitMix64 output per word.
    ///
    /// Raw user seeds make poor xoshiro state (the all-zero state is a fixed point); the
    /// mixer spreads any seed, zero included, into full-entropy words.
    pub fn new(seed: u64) -> Self {
        let mut s = [0; 4];
        let mut x = seed;
        for word in &mut s {
            x = x.wrapping_add(0x9E3779B97F4A7C15);
            let mut z = x;
            z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
            *word = z ^ (z >> 31);
        }
        Self { s }
    }

    fn step(&mut self) -> u64 {
        let result = self.s[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);
        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Advances the stream by 2^128 steps in constant time.
    ///
    /// Clones jumped different numbers of times draw from non-overlapping subsequences,
    /// which is enough to hand out independent streams without reseeding.
    pub fn jump(&mut self) {
        const JUMP: [u64; 4] = [
            0x180ec6d33cfd0aba,
            0xd5a61266f0c9392c,
            0xa9582618e03fc9aa,
            0x39abdc4529b1661c,
        ];

        let mut jumped = [0_u64; 4];
        for polynomial in JUMP {
            for bit in 0..64 {
                if polynomial & (1 << bit) != 0 {
                    for (gathered, &word) in jumped.iter_mut().zip(&self.s) {
                        *gathered ^= word;
                    }
                }
                self.step();
            }
        }
        self.s = jumped;
    }
}

impl RandomSource for Xoshiro256StarStar {
    fn next(&mut self) -> u64 {
        self.step()
    }
}

// `rand::Rng` arrives through the blanket impl for infallible sources.
impl rand::TryRng for Xoshiro256StarStar {
    type Error = core::convert::Infallible;

    fn try_next_u32(&mut self) -> Result<u32, Self::Error> {
        Ok((self.step() >> 32) as u32)
    }

    fn try_next_u64(&mut self) -> Result<u64, Self::Error> {
        Ok(self.step())
    }

    fn try_fill_bytes(&mut self, dst: &mut [u8]) -> Result<(), Self::Error> {
        for chunk in dst.chunks_mut(8) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
        Ok(())
    }
}

impl rand::SeedableRng for Xoshiro256StarStar {
    type Seed = [u8; 32];

    fn from_seed(seed: Self::Seed) -> Self {
        if seed.iter().all(|&byte| byte == 0) {
            return Self::new(0);
        }

        let mut s = [0; 4];
        for (word, bytes) in s.iter_mut().zip(seed.chunks_exact(8)) {
            *word = u64::from_le_bytes(bytes.try_into().expect("chunk is 8 bytes"));
        }
        Self { s }
    }

    fn seed_from_u64(seed: u64) -> Self {
        Self::new(seed)
    }
}
