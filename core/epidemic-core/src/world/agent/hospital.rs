use rand::Rng;

use super::{AgentId, Population};
use crate::{
    stat::{HealthCount, HealthDiff},
    util::random,
    world::commons::{HealthType, ParamsForStep},
};

enum Outcome {
    Died,
    Recovered,
}

/// Capacity-unbounded hospital compartment: regular beds plus ICU.
/// Admission always succeeds (demand model). Output lists are drained by
/// the world each tick.
pub struct Hospital {
    patients: Vec<AgentId>,
    icu_current: u32,
    total_count: u32,
    icu_total: u32,
    pub newly_recovered: Vec<AgentId>,
    pub newly_deceased: Vec<AgentId>,
}

impl Hospital {
    pub fn new() -> Self {
        Self {
            patients: Vec::new(),
            icu_current: 0,
            total_count: 0,
            icu_total: 0,
            newly_recovered: Vec::new(),
            newly_deceased: Vec::new(),
        }
    }

    /// Beds currently occupied, ICU included.
    #[inline]
    pub fn bed_count(&self) -> u32 {
        self.patients.len() as u32
    }

    #[inline]
    pub fn icu_count(&self) -> u32 {
        self.icu_current
    }

    #[inline]
    pub fn total_count(&self) -> u32 {
        self.total_count
    }

    #[inline]
    pub fn icu_total(&self) -> u32 {
        self.icu_total
    }

    /// Admits an agent, starting a fresh clinical course.
    pub fn admit(
        &mut self,
        id: AgentId,
        agents: &mut Population,
        health_count: &mut HealthCount,
        pfs: &ParamsForStep,
    ) {
        let agent = agents.agent_mut(id);
        let from = agent.health();
        agent.enter_hospital(pfs);
        health_count.apply_difference(HealthDiff::new(from, HealthType::Hospitalized));
        self.patients.push(id);
        self.total_count += 1;
    }

    /// Advances every patient by one step: timers first, then outcome
    /// resolution (death, ICU escalation, recovery) on expiry. Decisions
    /// are collected before any patient leaves the list.
    pub fn step(
        &mut self,
        agents: &mut Population,
        health_count: &mut HealthCount,
        rng: &mut impl Rng,
        pfs: &ParamsForStep,
    ) {
        let mut departures: Vec<(usize, Outcome)> = Vec::new();
        for (pos, &id) in self.patients.iter().enumerate() {
            let agent = agents.agent_mut(id);
            if !agent.recovery_step(pfs) {
                continue;
            }
            let age = agent.age_group();
            if random::hit(rng, pfs.rp.death_chance.at(age)) {
                departures.push((pos, Outcome::Died));
            } else if agent.health() == HealthType::Hospitalized
                && random::hit(rng, pfs.rp.icu_chance.at(age))
            {
                agent.enter_icu(pfs);
                health_count.apply_difference(HealthDiff::new(
                    HealthType::Hospitalized,
                    HealthType::Icu,
                ));
                self.icu_current += 1;
                self.icu_total += 1;
            } else {
                departures.push((pos, Outcome::Recovered));
            }
        }

        for (pos, outcome) in departures.into_iter().rev() {
            let id = self.patients.swap_remove(pos);
            let agent = agents.agent_mut(id);
            let from = agent.health();
            if from == HealthType::Icu {
                self.icu_current -= 1;
            }
            match outcome {
                Outcome::Died => {
                    agent.set_health(HealthType::Deceased);
                    health_count.apply_difference(HealthDiff::new(from, HealthType::Deceased));
                    self.newly_deceased.push(id);
                }
                Outcome::Recovered => {
                    agent.set_health(HealthType::Recovered);
                    health_count.apply_difference(HealthDiff::new(from, HealthType::Recovered));
                    self.newly_recovered.push(id);
                }
            }
        }
    }
}

impl Default for Hospital {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::commons::{AgeGroup, RuntimeParams, WorldParams};
    use rand::{rngs::StdRng, SeedableRng};

    fn setup(recovery_days: f64, death: f64, icu: f64) -> (WorldParams, RuntimeParams) {
        let wp = WorldParams::default();
        let mut rp = RuntimeParams::default();
        rp.recovery_time.set(2, recovery_days);
        rp.death_chance.set(2, death);
        rp.icu_chance.set(2, icu);
        (wp, rp)
    }

    fn one_patient(
        hospital: &mut Hospital,
        health_count: &mut HealthCount,
        wp: &WorldParams,
        rp: &RuntimeParams,
    ) -> (Population, AgentId) {
        let mut pop = Population::default();
        let id = pop.push_new(AgeGroup::new(2).unwrap());
        health_count[&HealthType::Susceptible] = 1;
        let pfs = ParamsForStep::new(wp, rp);
        hospital.admit(id, &mut pop, health_count, &pfs);
        (pop, id)
    }

    #[test]
    fn one_tick_recovery_restores_occupancy() {
        // recovery timer of exactly one tick-equivalent, death chance 0
        let (wp, rp) = setup(4.0 / 24.0, 0.0, 0.0);
        let mut hospital = Hospital::new();
        let mut cnt = HealthCount::default();
        let (mut pop, id) = one_patient(&mut hospital, &mut cnt, &wp, &rp);
        assert_eq!(hospital.bed_count(), 1);

        let pfs = ParamsForStep::new(&wp, &rp);
        let mut rng = StdRng::seed_from_u64(1);
        hospital.step(&mut pop, &mut cnt, &mut rng, &pfs);

        assert_eq!(hospital.newly_recovered, vec![id]);
        assert!(hospital.newly_deceased.is_empty());
        assert_eq!(hospital.bed_count(), 0);
        assert_eq!(pop.agent(id).health(), HealthType::Recovered);
        assert_eq!(cnt[&HealthType::Recovered], 1);
    }

    #[test]
    fn certain_death_on_expiry() {
        let (wp, rp) = setup(4.0 / 24.0, 1.0, 0.0);
        let mut hospital = Hospital::new();
        let mut cnt = HealthCount::default();
        let (mut pop, id) = one_patient(&mut hospital, &mut cnt, &wp, &rp);

        let pfs = ParamsForStep::new(&wp, &rp);
        let mut rng = StdRng::seed_from_u64(1);
        hospital.step(&mut pop, &mut cnt, &mut rng, &pfs);

        assert_eq!(hospital.newly_deceased, vec![id]);
        assert_eq!(pop.agent(id).health(), HealthType::Deceased);
    }

    #[test]
    fn icu_escalation_keeps_patient_admitted() {
        let (wp, rp) = setup(4.0 / 24.0, 0.0, 1.0);
        let mut hospital = Hospital::new();
        let mut cnt = HealthCount::default();
        let (mut pop, id) = one_patient(&mut hospital, &mut cnt, &wp, &rp);

        let pfs = ParamsForStep::new(&wp, &rp);
        let mut rng = StdRng::seed_from_u64(1);
        hospital.step(&mut pop, &mut cnt, &mut rng, &pfs);

        assert_eq!(hospital.bed_count(), 1);
        assert_eq!(hospital.icu_count(), 1);
        assert_eq!(hospital.icu_total(), 1);
        assert_eq!(pop.agent(id).health(), HealthType::Icu);

        // an ICU patient resolves to recovery, never back to escalation
        hospital.step(&mut pop, &mut cnt, &mut rng, &pfs);
        assert_eq!(hospital.icu_count(), 0);
        assert_eq!(pop.agent(id).health(), HealthType::Recovered);
    }
}
