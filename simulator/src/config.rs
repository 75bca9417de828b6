use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context;
use serde::Deserialize;

use epidemic_core::world::commons::{RuntimeParams, WorldParams};

/// One sparse movement-table entry; anything the scenario leaves out keeps
/// its zero default (the agent stays put).
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct MovementEntry {
    pub age_group: usize,
    pub day: DayClass,
    pub time_bucket: usize,
    pub destination: usize,
    pub chance: f64,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayClass {
    Weekday,
    Weekend,
}

impl DayClass {
    fn index(self) -> usize {
        match self {
            Self::Weekday => 0,
            Self::Weekend => 1,
        }
    }
}

/// A scenario file overrides the engine defaults field by field. Rate
/// vectors are indexed by age bin and may be shorter than 18 entries;
/// missing tail entries keep their defaults.
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Scenario {
    pub step_hours: Option<u32>,
    pub locations_per_kind: Option<usize>,
    pub initially_infected: Option<f64>,
    /// `[age][strategy]` adoption probabilities.
    pub mitigation_adoption: Vec<Vec<f64>>,
    /// Per-strategy effectiveness.
    pub mitigation_effect: Vec<f64>,
    /// Per-location-category contact weight.
    pub location_risk: Vec<f64>,
    pub incubation_time: Vec<f64>,
    pub recovery_time: Vec<f64>,
    pub death_chance: Vec<f64>,
    pub icu_chance: Vec<f64>,
    pub needs_hospital: Vec<f64>,
    pub movement: Vec<MovementEntry>,
}

impl Scenario {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("cannot open scenario file {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("malformed scenario file {}", path.display()))
    }

    /// Materializes the parameter structs. Out-of-range values fall to the
    /// tables' fail-quiet setters and leave the defaults untouched.
    pub fn into_params(self) -> (WorldParams, RuntimeParams) {
        let defaults = WorldParams::default();
        let wp = WorldParams::new(
            self.step_hours.unwrap_or(defaults.step_hours()),
            self.locations_per_kind
                .unwrap_or(defaults.locations_per_kind()),
            self.initially_infected
                .unwrap_or(defaults.initially_infected()),
        );

        let mut rp = RuntimeParams::default();
        for (age, row) in self.mitigation_adoption.iter().enumerate() {
            for (strategy, &value) in row.iter().enumerate() {
                rp.mitigation_adoption.set(age, strategy, value);
            }
        }
        for (strategy, &value) in self.mitigation_effect.iter().enumerate() {
            rp.mitigation_effect.set(strategy, value);
        }
        for (location, &value) in self.location_risk.iter().enumerate() {
            rp.location_risk.set(location, value);
        }
        for (age, &value) in self.incubation_time.iter().enumerate() {
            rp.incubation_time.set(age, value);
        }
        for (age, &value) in self.recovery_time.iter().enumerate() {
            rp.recovery_time.set(age, value);
        }
        for (age, &value) in self.death_chance.iter().enumerate() {
            rp.death_chance.set(age, value);
        }
        for (age, &value) in self.icu_chance.iter().enumerate() {
            rp.icu_chance.set(age, value);
        }
        for (age, &value) in self.needs_hospital.iter().enumerate() {
            rp.needs_hospital.set(age, value);
        }
        for entry in &self.movement {
            rp.movement.set(
                entry.age_group,
                entry.day.index(),
                entry.time_bucket,
                entry.destination,
                entry.chance,
            );
        }
        (wp, rp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scenario_yields_defaults() {
        let scenario: Scenario = serde_json::from_str("{}").unwrap();
        let (wp, rp) = scenario.into_params();
        assert_eq!(wp.step_hours(), 4);
        assert_eq!(wp.locations_per_kind(), 3);
        assert_eq!(rp.recovery_time.get(0), 0.0);
    }

    #[test]
    fn partial_override_keeps_the_rest() {
        let scenario: Scenario = serde_json::from_str(
            r#"{
                "step_hours": 6,
                "recovery_time": [10.0, 12.0],
                "mitigation_effect": [0.4],
                "movement": [
                    {"age_group": 3, "day": "weekday", "time_bucket": 2,
                     "destination": 1, "chance": 0.25}
                ]
            }"#,
        )
        .unwrap();
        let (wp, rp) = scenario.into_params();
        assert_eq!(wp.step_hours(), 6);
        assert_eq!(wp.locations_per_kind(), 3);
        assert_eq!(rp.recovery_time.get(0), 10.0);
        assert_eq!(rp.recovery_time.get(1), 12.0);
        assert_eq!(rp.recovery_time.get(2), 0.0);
        assert_eq!(rp.mitigation_effect.get(0), 0.4);
        assert_eq!(rp.mitigation_effect.get(1), 0.0);
    }

    #[test]
    fn out_of_range_values_are_dropped_quietly() {
        let scenario: Scenario = serde_json::from_str(
            r#"{"death_chance": [1.5], "mitigation_effect": [-0.1]}"#,
        )
        .unwrap();
        let (_, rp) = scenario.into_params();
        assert_eq!(rp.death_chance.get(0), 0.0);
        assert_eq!(rp.mitigation_effect.get(0), 0.0);
    }

    #[test]
    fn unknown_field_is_an_error() {
        assert!(serde_json::from_str::<Scenario>(r#"{"recovery_days": []}"#).is_err());
    }
}
