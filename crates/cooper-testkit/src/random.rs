//! Seeded random data generation
//!
//! Provides reproducible random data for request payloads.
//! Using the same seed produces identical sequences of values,
//! so a failing run can be replayed with `--seed`.
//!
//! # Example
//!
//! ```rust
//! use cooper_testkit::random::PseudoGenerator;
//!
//! let mut rng1 = PseudoGenerator::new(42);
//! let mut rng2 = PseudoGenerator::new(42);
//!
//! // Same seed produces same output
//! assert_eq!(rng1.alphanumeric(16), rng2.alphanumeric(16));
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ALPHA: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Crockford base32, the ULID alphabet
const CROCKFORD: &[u8] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Length of a canonical ULID string
pub const ULID_LEN: usize = 26;

/// Seeded pseudo-random generator for reproducible test data
#[derive(Debug)]
pub struct PseudoGenerator {
    rng: StdRng,
    seed: u64,
}

impl PseudoGenerator {
    /// Create a new generator with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Get the seed used to create this generator
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate random bytes filling a fixed-size array
    pub fn random_array<const N: usize>(&mut self) -> [u8; N] {
        let mut arr = [0u8; N];
        self.rng.fill(&mut arr);
        arr
    }

    /// Generate a random u64
    pub fn random_u64(&mut self) -> u64 {
        self.rng.random()
    }

    /// Generate a random usize in the given inclusive range
    pub fn random_len(&mut self, range: std::ops::RangeInclusive<usize>) -> usize {
        self.rng.random_range(range)
    }

    /// Random ASCII letters
    pub fn alpha(&mut self, len: usize) -> String {
        self.sample_alphabet(ALPHA, len)
    }

    /// Random ASCII letters and digits
    pub fn alphanumeric(&mut self, len: usize) -> String {
        self.sample_alphabet(ALPHANUMERIC, len)
    }

    /// A ULID-formatted string (26 Crockford base32 characters).
    ///
    /// The first character is limited to `0..=7` so the value fits in 128 bits,
    /// like a real ULID. No timestamp is encoded.
    pub fn ulid(&mut self) -> String {
        let mut out = String::with_capacity(ULID_LEN);
        out.push(char::from(CROCKFORD[self.rng.random_range(0..8)]));
        out.push_str(&self.sample_alphabet(CROCKFORD, ULID_LEN - 1));
        out
    }

    /// A float in `[low, high)` rounded to `decimals` fractional digits
    pub fn decimal(&mut self, low: f64, high: f64, decimals: i32) -> f64 {
        let raw: f64 = self.rng.random_range(low..high);
        let scale = 10f64.powi(decimals);
        (raw * scale).round() / scale
    }

    fn sample_alphabet(&mut self, alphabet: &[u8], len: usize) -> String {
        (0..len)
            .map(|_| char::from(alphabet[self.rng.random_range(0..alphabet.len())]))
            .collect()
    }
}

/// Generate a random seed (for when you don't care about reproducibility)
pub fn random_seed() -> u64 {
    rand::random()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reproducibility() {
        let mut rng1 = PseudoGenerator::new(12345);
        let mut rng2 = PseudoGenerator::new(12345);

        assert_eq!(rng1.alphanumeric(64), rng2.alphanumeric(64));
        assert_eq!(rng1.ulid(), rng2.ulid());
        assert_eq!(rng1.decimal(0.0, 10.0, 2), rng2.decimal(0.0, 10.0, 2));
    }

    #[test]
    fn test_different_seeds_different_output() {
        let mut rng1 = PseudoGenerator::new(1);
        let mut rng2 = PseudoGenerator::new(2);

        assert_ne!(rng1.alphanumeric(32), rng2.alphanumeric(32));
    }

    #[test]
    fn test_alpha_only_letters() {
        let mut rng = PseudoGenerator::new(7);
        let value = rng.alpha(200);
        assert_eq!(value.len(), 200);
        assert!(value.chars().all(|c| c.is_ascii_alphabetic()));
    }

    #[test]
    fn test_ulid_shape() {
        let mut rng = PseudoGenerator::new(99);
        for _ in 0..100 {
            let ulid = rng.ulid();
            assert_eq!(ulid.len(), ULID_LEN);
            assert!(ulid.bytes().all(|b| CROCKFORD.contains(&b)));
            assert!(ulid.as_bytes()[0] <= b'7');
        }
    }

    #[test]
    fn test_decimal_range_and_precision() {
        let mut rng = PseudoGenerator::new(3);
        for _ in 0..500 {
            let v = rng.decimal(0.0, 100.0, 2);
            assert!((0.0..=100.0).contains(&v));
            let scaled = v * 100.0;
            assert!((scaled - scaled.round()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_random_len_inclusive() {
        let mut rng = PseudoGenerator::new(11);
        for _ in 0..100 {
            let len = rng.random_len(1..=3);
            assert!((1..=3).contains(&len));
        }
    }

    #[test]
    fn test_seed_getter() {
        let rng = PseudoGenerator::new(999);
        assert_eq!(rng.seed(), 999);
    }
}
