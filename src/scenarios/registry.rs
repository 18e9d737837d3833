//! Scenario registry
//!
//! Central registry of all available scenarios. New scenarios are registered
//! here. Scenarios are independent, so registration order only fixes the
//! order results are listed in.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::sync::Arc;

use super::traits::Scenario;
use super::{
    BarrelConcurrencyScenario, BarrelProtocolScenario, BarrelValidationScenario, BarrelsScenario,
    MeasurementValidationScenario, MeasurementsScenario,
};

/// Global registry of all available scenarios, in listing order
pub static SCENARIOS: Lazy<IndexMap<&'static str, Arc<dyn Scenario>>> = Lazy::new(|| {
    let mut m: IndexMap<&'static str, Arc<dyn Scenario>> = IndexMap::new();

    // /barrels
    m.insert("barrels", Arc::new(BarrelsScenario));
    m.insert("barrel-validation", Arc::new(BarrelValidationScenario));
    m.insert("barrel-protocol", Arc::new(BarrelProtocolScenario));
    m.insert("barrel-concurrency", Arc::new(BarrelConcurrencyScenario));

    // /measurements
    m.insert("measurements", Arc::new(MeasurementsScenario));
    m.insert("measurement-validation", Arc::new(MeasurementValidationScenario));

    m
});

/// Get a scenario by name
pub fn get_scenario(name: &str) -> Option<Arc<dyn Scenario>> {
    SCENARIOS.get(name).cloned()
}

/// List all available scenario names, sorted
pub fn list_scenarios() -> Vec<&'static str> {
    let mut names: Vec<_> = SCENARIOS.keys().copied().collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_keys_match_scenario_names() {
        for (key, scenario) in SCENARIOS.iter() {
            assert_eq!(*key, scenario.name());
        }
    }

    #[test]
    fn test_all_scenarios_registered() {
        assert_eq!(SCENARIOS.len(), 6);
        for name in [
            "barrels",
            "barrel-validation",
            "barrel-protocol",
            "barrel-concurrency",
            "measurements",
            "measurement-validation",
        ] {
            assert!(SCENARIOS.contains_key(name), "{name} not registered");
        }
    }

    #[test]
    fn test_get_scenario() {
        let scenario = get_scenario("barrels");
        assert!(scenario.is_some());
        assert_eq!(scenario.unwrap().name(), "barrels");
        assert!(get_scenario("pingpong").is_none());
    }

    #[test]
    fn test_list_scenarios_sorted() {
        let names = list_scenarios();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
