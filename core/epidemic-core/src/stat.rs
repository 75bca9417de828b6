use crate::world::commons::HealthType;

use std::{
    collections::VecDeque,
    ops::{Index, IndexMut},
    path::Path,
};

use strum::{EnumCount, IntoEnumIterator};

pub struct HealthDiff {
    from: HealthType,
    to: HealthType,
}

impl HealthDiff {
    pub fn new(from: HealthType, to: HealthType) -> Self {
        Self { from, to }
    }
}

/// Per-state population counters, mutated only through state transitions.
#[derive(Clone, Default, Debug)]
pub struct HealthCount([u32; HealthType::COUNT]);

impl HealthCount {
    pub fn apply_difference(&mut self, hd: HealthDiff) {
        self[&hd.from] -= 1;
        self[&hd.to] += 1;
    }

    /// Everyone carrying the pathogen, confined or not.
    pub fn n_infected(&self) -> u32 {
        self[&HealthType::Incubating]
            + self[&HealthType::Infected]
            + self[&HealthType::Isolated]
            + self[&HealthType::Hospitalized]
            + self[&HealthType::Icu]
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
}

impl<'a> Index<&'a HealthType> for HealthCount {
    type Output = u32;

    fn index(&self, index: &'a HealthType) -> &Self::Output {
        &self.0[*index as usize]
    }
}

impl<'a> IndexMut<&'a HealthType> for HealthCount {
    fn index_mut(&mut self, index: &'a HealthType) -> &mut Self::Output {
        &mut self.0[*index as usize]
    }
}

/// Per-tick run history: health counts plus the newly-infected series.
#[derive(Default)]
pub struct StepLog {
    health_counts: VecDeque<HealthCount>,
    newly_infected: Vec<u32>,
}

impl StepLog {
    pub fn reset(&mut self, initial: HealthCount) {
        self.health_counts.clear();
        self.newly_infected.clear();
        self.health_counts.push_back(initial);
    }

    /// Returns true when the epidemic has died out.
    pub fn push(&mut self, count: HealthCount, newly_infected: u32) -> bool {
        let ended = count.n_infected() == 0;
        self.health_counts.push_back(count);
        self.newly_infected.push(newly_infected);
        ended
    }

    pub fn len(&self) -> usize {
        self.health_counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.health_counts.is_empty()
    }

    /// One row per tick, one column per health state plus new cases.
    pub fn write(&self, name: &str, dir: &Path) -> anyhow::Result<()> {
        let path = dir.join(format!("{}_log.csv", name));
        let mut wtr = csv::Writer::from_path(path)?;
        for ht in HealthType::iter() {
            wtr.write_field(ht.to_string())?;
        }
        wtr.write_field("NewCases")?;
        wtr.write_record(None::<&[u8]>)?;
        for (i, cnt) in self.health_counts.iter().enumerate() {
            for ht in HealthType::iter() {
                wtr.write_field(cnt[&ht].to_string())?;
            }
            let newly = if i == 0 {
                0
            } else {
                self.newly_infected[i - 1]
            };
            wtr.write_field(newly.to_string())?;
            wtr.write_record(None::<&[u8]>)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_difference_moves_one_agent() {
        let mut cnt = HealthCount::default();
        cnt[&HealthType::Susceptible] = 10;
        cnt.apply_difference(HealthDiff::new(
            HealthType::Susceptible,
            HealthType::Incubating,
        ));
        assert_eq!(cnt[&HealthType::Susceptible], 9);
        assert_eq!(cnt[&HealthType::Incubating], 1);
        assert_eq!(cnt.total(), 10);
    }

    #[test]
    fn n_infected_counts_confined_states() {
        let mut cnt = HealthCount::default();
        cnt[&HealthType::Incubating] = 1;
        cnt[&HealthType::Isolated] = 2;
        cnt[&HealthType::Icu] = 3;
        cnt[&HealthType::Recovered] = 100;
        assert_eq!(cnt.n_infected(), 6);
    }

    #[test]
    fn step_log_flags_extinction() {
        let mut log = StepLog::default();
        let mut cnt = HealthCount::default();
        cnt[&HealthType::Susceptible] = 5;
        cnt[&HealthType::Infected] = 1;
        log.reset(cnt.clone());
        assert!(!log.push(cnt.clone(), 0));
        cnt.apply_difference(HealthDiff::new(HealthType::Infected, HealthType::Recovered));
        assert!(log.push(cnt, 0));
        assert_eq!(log.len(), 3);
    }
}
