//! Fixture generators
//!
//! Randomized, schema-valid request bodies. Values come from a seeded
//! [`PseudoGenerator`] so a run can be replayed. Measurement readings are
//! rounded to two decimals so they survive the trip through the service's
//! floating-point storage unchanged.

use cooper_testkit::random::PseudoGenerator;

use crate::client::{NewBarrel, NewMeasurement};

/// Fractional digits kept on measurement readings
pub const MEASUREMENT_DECIMALS: i32 = 2;

/// Upper bound for generated dirt levels. Rounding can reach it.
pub const MAX_DIRT_LEVEL: f64 = 100.0;

/// Upper bound for generated weights. Rounding can reach it.
pub const MAX_WEIGHT: f64 = 500.0;

/// Length of the NFC tag used by [`Fixtures::example_barrel`]
pub const EXAMPLE_NFC_LEN: usize = 20;

/// Source of request payloads for one scenario
#[derive(Debug)]
pub struct Fixtures {
    rng: PseudoGenerator,
}

impl Fixtures {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: PseudoGenerator::new(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// A barrel with tags of ordinary length
    pub fn barrel(&mut self) -> NewBarrel {
        let qr_len = self.rng.random_len(8..=32);
        NewBarrel::new(
            self.rng.alphanumeric(qr_len),
            self.rng.ulid(),
            self.rng.alpha(EXAMPLE_NFC_LEN),
        )
    }

    /// Shortest accepted tags: one character each
    pub fn minimal_barrel(&mut self) -> NewBarrel {
        NewBarrel::new(
            self.rng.alphanumeric(1),
            self.rng.alphanumeric(1),
            self.rng.alphanumeric(1),
        )
    }

    /// `{qr: "T", rfid: <ulid>, nfc: <20 letters>}`
    pub fn example_barrel(&mut self) -> NewBarrel {
        NewBarrel::new("T", self.rng.ulid(), self.rng.alpha(EXAMPLE_NFC_LEN))
    }

    /// A reading for `barrel_id`
    pub fn measurement(&mut self, barrel_id: impl Into<String>) -> NewMeasurement {
        NewMeasurement {
            id: None,
            barrel_id: barrel_id.into(),
            dirt_level: self.rng.decimal(0.0, MAX_DIRT_LEVEL, MEASUREMENT_DECIMALS),
            weight: self.rng.decimal(0.0, MAX_WEIGHT, MEASUREMENT_DECIMALS),
        }
    }

    /// A well-formed GUID that no barrel has
    pub fn missing_barrel_id(&mut self) -> String {
        uuid::Builder::from_random_bytes(self.rng.random_array::<16>())
            .into_uuid()
            .hyphenated()
            .to_string()
    }

    /// Seed for a derived generator (one per parallel task)
    pub fn child_seed(&mut self) -> u64 {
        self.rng.random_u64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{NEW_BARREL, NEW_MEASUREMENT};

    #[test]
    fn test_barrels_are_schema_valid() {
        let mut fixtures = Fixtures::new(1);
        for _ in 0..50 {
            let barrel = serde_json::to_value(fixtures.barrel()).unwrap();
            assert!(NEW_BARREL.is_valid(&barrel), "{barrel}");
        }
    }

    #[test]
    fn test_minimal_barrel_has_single_char_tags() {
        let barrel = Fixtures::new(2).minimal_barrel();
        assert_eq!(barrel.qr.len(), 1);
        assert_eq!(barrel.rfid.len(), 1);
        assert_eq!(barrel.nfc.len(), 1);
    }

    #[test]
    fn test_example_barrel_shape() {
        let barrel = Fixtures::new(3).example_barrel();
        assert_eq!(barrel.qr, "T");
        assert_eq!(barrel.rfid.len(), 26);
        assert_eq!(barrel.nfc.len(), EXAMPLE_NFC_LEN);
        assert!(barrel.nfc.chars().all(|c| c.is_ascii_alphabetic()));
    }

    #[test]
    fn test_measurements_link_and_stay_in_range() {
        let mut fixtures = Fixtures::new(4);
        for _ in 0..200 {
            let m = fixtures.measurement("barrel-1");
            assert_eq!(m.barrel_id, "barrel-1");
            assert!((0.0..=MAX_DIRT_LEVEL).contains(&m.dirt_level));
            assert!((0.0..=MAX_WEIGHT).contains(&m.weight));
            assert!(NEW_MEASUREMENT.is_valid(&serde_json::to_value(&m).unwrap()));
        }
    }

    #[test]
    fn test_same_seed_same_fixtures() {
        assert_eq!(Fixtures::new(9).barrel(), Fixtures::new(9).barrel());
    }

    #[test]
    fn test_missing_barrel_id_is_guid() {
        let mut fixtures = Fixtures::new(5);
        let id = fixtures.missing_barrel_id();
        assert!(uuid::Uuid::parse_str(&id).is_ok());
        assert_ne!(id, fixtures.missing_barrel_id());
    }
}
