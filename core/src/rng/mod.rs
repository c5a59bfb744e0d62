use core::f64::consts::TAU;

pub use xoshiro::*;

mod xoshiro;

/// Deterministic source of 64-bit pseudorandom words.
///
/// Every derived draw consumes words from [`next`](Self::next) and nothing else, so two
/// sources emitting the same word stream produce identical draws of every flavor.
pub trait RandomSource {
    /// Produces the next raw word of the stream.
    fn next(&mut self) -> u64;

    fn next_u64(&mut self) -> u64 {
        self.next()
    }

    /// Uniform draw in `[0, cap)`, `cap >= 1`.
    ///
    /// Masks the word down to the smallest covering power of two and redraws values at or
    /// above `cap`, which keeps the draw unbiased without multiplication or modulo.
    fn next_u64_cap(&mut self, cap: u64) -> u64 {
        debug_assert!(cap >= 1, "cap must be at least 1");

        let bound = cap - 1;
        let mask = u64::MAX >> (bound | 1).leading_zeros();
        loop {
            let word = self.next() & mask;
            if word <= bound {
                return word;
            }
        }
    }

    fn next_i64(&mut self) -> i64 {
        self.next() as i64
    }

    /// Uniform draw in `[0, cap)`, `cap >= 1`.
    fn next_i64_cap(&mut self, cap: i64) -> i64 {
        debug_assert!(cap >= 1, "cap must be positive");

        self.next_u64_cap(cap as u64) as i64
    }

    /// Uniform draw in `[0, 1)` with 52 bits of precision.
    ///
    /// The top bits of the word become the mantissa of a float in `[1, 2)`, so subtracting
    /// one never rounds and the result cannot reach `1.0`.
    fn next_f64(&mut self) -> f64 {
        f64::from_bits(0x3FF << 52 | self.next() >> 12) - 1.0
    }

    /// Uniform draw in `[0, cap)`.
    fn next_f64_cap(&mut self, cap: f64) -> f64 {
        self.next_f64() * cap
    }

    /// Uniform draw in `[min, max)`.
    fn next_f64_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64_cap(max - min)
    }

    /// Coin flip that lands true with probability `p_true`.
    fn next_bool(&mut self, p_true: f64) -> bool {
        self.next_f64() < p_true
    }

    /// Standard normal draw, Box-Muller transform, cosine branch.
    ///
    /// The radial component is redrawn while it is too close to zero for `ln`.
    fn next_gaussian(&mut self) -> f64 {
        let mut u = self.next_f64();
        while u <= f64::EPSILON {
            u = self.next_f64();
        }
        let v = self.next_f64();

        (-2.0 * u.ln()).sqrt() * (TAU * v).cos()
    }

    /// Normal draw with mean `mu` and standard deviation `sigma`.
    fn next_gaussian_with(&mut self, mu: f64, sigma: f64) -> f64 {
        self.next_gaussian() * sigma + mu
    }
}
