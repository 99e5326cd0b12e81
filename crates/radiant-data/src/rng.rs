// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Seedable `xoshiro256**` pseudo-random generator.
//!
//! The state is bootstrapped from a 64-bit seed through `splitmix64`, so two
//! generators built from the same seed produce identical sequences.

/// The `xoshiro256**` generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Xoshiro256StarStar {
    state: [u64; 4],
}

const fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

const JUMP: [u64; 4] = [
    0x180E_C6D3_3CFD_0ABA,
    0xD5A6_1266_F0C9_392C,
    0xA958_2618_E03F_C9AA,
    0x39AB_DC45_29B1_661C,
];

const LONG_JUMP: [u64; 4] = [
    0x76E1_5D3E_FEFD_CBBF,
    0xC500_4E44_1C52_2FB3,
    0x7771_0069_854E_E241,
    0x3910_9BB0_2ACB_E635,
];

impl Xoshiro256StarStar {
    /// Seed used when the caller does not provide one.
    pub const DEFAULT_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

    /// Creates a generator from a 64-bit seed.
    pub const fn new(seed: u64) -> Self {
        Self {
            state: [
                splitmix64(seed),
                splitmix64(seed.wrapping_add(1)),
                splitmix64(seed.wrapping_add(2)),
                splitmix64(seed.wrapping_add(3)),
            ],
        }
    }

    /// Re-seeds the generator in place.
    pub fn reseed(&mut self, seed: u64) {
        *self = Self::new(seed);
    }

    /// Next raw 64-bit output.
    pub fn next_u64(&mut self) -> u64 {
        let s = &mut self.state;
        let result = s[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);
        let t = s[1] << 17;

        s[2] ^= s[0];
        s[3] ^= s[1];
        s[1] ^= s[2];
        s[0] ^= s[3];
        s[2] ^= t;
        s[3] = s[3].rotate_left(45);

        result
    }

    /// Uniform float in `[0, 1)` built from 23 bits of the high word.
    pub fn next_f32(&mut self) -> f32 {
        const MASK: u32 = (1 << 23) - 1;
        const SCALE: f32 = 1.0 / (1u32 << 23) as f32;
        (((self.next_u64() >> 32) as u32) & MASK) as f32 * SCALE
    }

    /// Uniform double in `[0, 1)` built from 52 bits.
    pub fn next_f64(&mut self) -> f64 {
        const MASK: u64 = (1 << 52) - 1;
        const SCALE: f64 = 1.0 / (1u64 << 52) as f64;
        (self.next_u64() & MASK) as f64 * SCALE
    }

    /// Uniform float in `[min, max)`. Bounds are swapped when reversed.
    pub fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        let (lo, hi) = if min > max { (max, min) } else { (min, max) };
        lo + self.next_f32() * (hi - lo)
    }

    /// Uniform integer in `[min, max]`. Bounds are swapped when reversed.
    pub fn range_i32(&mut self, min: i32, max: i32) -> i32 {
        let (lo, hi) = if min > max { (max, min) } else { (min, max) };
        let span = (hi as i64 - lo as i64 + 1) as u64;
        (lo as i64 + (self.next_u64() % span) as i64) as i32
    }

    /// Advances the state by 2^128 steps.
    pub fn jump(&mut self) {
        self.apply_jump(&JUMP);
    }

    /// Advances the state by 2^192 steps.
    pub fn long_jump(&mut self) {
        self.apply_jump(&LONG_JUMP);
    }

    fn apply_jump(&mut self, table: &[u64; 4]) {
        let mut acc = [0u64; 4];
        for word in table {
            for bit in 0..64 {
                if word & (1u64 << bit) != 0 {
                    for (a, s) in acc.iter_mut().zip(&self.state) {
                        *a ^= *s;
                    }
                }
                self.next_u64();
            }
        }
        self.state = acc;
    }
}

impl Default for Xoshiro256StarStar {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = Xoshiro256StarStar::new(42);
        let mut b = Xoshiro256StarStar::new(42);
        for _ in 0..64 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
        let mut c = Xoshiro256StarStar::new(43);
        assert_ne!(Xoshiro256StarStar::new(42).next_u64(), c.next_u64());
    }

    #[test]
    fn test_float_ranges() {
        let mut rng = Xoshiro256StarStar::new(7);
        for _ in 0..1000 {
            let f = rng.next_f32();
            assert!((0.0..1.0).contains(&f));
            let d = rng.next_f64();
            assert!((0.0..1.0).contains(&d));
            let r = rng.range_f32(5.0, -5.0);
            assert!((-5.0..5.0).contains(&r));
        }
    }

    #[test]
    fn test_int_range_is_inclusive() {
        let mut rng = Xoshiro256StarStar::new(1);
        let mut seen = [false; 3];
        for _ in 0..200 {
            let v = rng.range_i32(-1, 1);
            assert!((-1..=1).contains(&v));
            seen[(v + 1) as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
        assert_eq!(rng.range_i32(3, 3), 3);
    }

    #[test]
    fn test_jump_changes_stream() {
        let mut a = Xoshiro256StarStar::new(9);
        let mut b = a.clone();
        b.jump();
        assert_ne!(a.next_u64(), b.next_u64());
    }
}
