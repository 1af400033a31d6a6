//! Cosmetic identifier generation.
//!
//! Subscription ids, project numbers, and IP-looking strings are pure
//! decoration. They are drawn from an [`IdSource`] so runs can be made
//! reproducible with a seed, or fully scripted in tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of cosmetic random integers.
pub trait IdSource: Send {
    /// Returns an integer in `low..=high`.
    fn next_in(&mut self, low: u64, high: u64) -> u64;
}

/// [`IdSource`] backed by a standard RNG.
pub struct RandomIds {
    rng: StdRng,
}

impl RandomIds {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded when a seed is configured, entropy otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl IdSource for RandomIds {
    fn next_in(&mut self, low: u64, high: u64) -> u64 {
        self.rng.gen_range(low..=high)
    }
}

/// A dotted quad starting with `first_octet`, e.g. `20.14.201.7`.
pub fn ipv4(ids: &mut dyn IdSource, first_octet: u8) -> String {
    format!(
        "{}.{}.{}.{}",
        first_octet,
        ids.next_in(1, 255),
        ids.next_in(1, 255),
        ids.next_in(1, 255)
    )
}

/// A fully random dotted quad.
pub fn any_ipv4(ids: &mut dyn IdSource) -> String {
    let first = ids.next_in(1, 255) as u8;
    ipv4(ids, first)
}

/// Six-digit suffix used by subscription and project ids.
pub fn six_digits(ids: &mut dyn IdSource) -> u64 {
    ids.next_in(100_000, 999_999)
}

/// Four-digit suffix used by storage accounts and service urls.
pub fn four_digits(ids: &mut dyn IdSource) -> u64 {
    ids.next_in(1_000, 9_999)
}

pub fn run_id(ids: &mut dyn IdSource) -> String {
    format!("run-{:08x}", ids.next_in(0, u64::from(u32::MAX)))
}

/// Replays a fixed list of values, clamped into the requested range.
#[cfg(test)]
pub struct ScriptedIds {
    values: Vec<u64>,
    cursor: usize,
}

#[cfg(test)]
impl ScriptedIds {
    pub fn new(values: Vec<u64>) -> Self {
        assert!(!values.is_empty(), "ScriptedIds needs at least one value");
        Self { values, cursor: 0 }
    }
}

#[cfg(test)]
impl IdSource for ScriptedIds {
    fn next_in(&mut self, low: u64, high: u64) -> u64 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value.clamp(low, high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_ids_are_reproducible() {
        let mut a = RandomIds::seeded(7);
        let mut b = RandomIds::seeded(7);

        let first: Vec<_> = (0..5).map(|_| a.next_in(1, 1_000_000)).collect();
        let second: Vec<_> = (0..5).map(|_| b.next_in(1, 1_000_000)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_values_stay_in_range() {
        let mut ids = RandomIds::seeded(99);
        for _ in 0..200 {
            let value = six_digits(&mut ids);
            assert!((100_000..=999_999).contains(&value));
        }
    }

    #[test]
    fn test_ipv4_format() {
        let mut ids = ScriptedIds::new(vec![14, 201, 7]);
        assert_eq!(ipv4(&mut ids, 20), "20.14.201.7");
    }

    #[test]
    fn test_scripted_ids_clamp() {
        let mut ids = ScriptedIds::new(vec![5, 50_000]);
        assert_eq!(four_digits(&mut ids), 1_000);
        assert_eq!(four_digits(&mut ids), 9_999);
    }

    #[test]
    fn test_run_id_format() {
        let mut ids = ScriptedIds::new(vec![0xc0ffee]);
        assert_eq!(run_id(&mut ids), "run-00c0ffee");
    }
}
