use rand::Rng;

use super::{AgentId, Population};
use crate::{
    stat::{HealthCount, HealthDiff},
    util::random,
    world::commons::{HealthType, ParamsForStep},
};

enum Outcome {
    Hospital,
    Recovered,
}

/// Home-isolation compartment: symptomatic agents outside any location,
/// advancing toward recovery unless a hospitalization draw fires first.
pub struct Isolation {
    isolated: Vec<AgentId>,
    total_count: u32,
    pub newly_recovered: Vec<AgentId>,
    pub newly_hospitalized: Vec<AgentId>,
}

impl Isolation {
    pub fn new() -> Self {
        Self {
            isolated: Vec::new(),
            total_count: 0,
            newly_recovered: Vec::new(),
            newly_hospitalized: Vec::new(),
        }
    }

    #[inline]
    pub fn count(&self) -> u32 {
        self.isolated.len() as u32
    }

    #[inline]
    pub fn total_count(&self) -> u32 {
        self.total_count
    }

    pub fn add(&mut self, id: AgentId, agents: &mut Population, health_count: &mut HealthCount) {
        let agent = agents.agent_mut(id);
        let from = agent.health();
        agent.set_health(HealthType::Isolated);
        health_count.apply_difference(HealthDiff::new(from, HealthType::Isolated));
        self.isolated.push(id);
        self.total_count += 1;
    }

    /// Per agent: a hospitalization-need draw, then the recovery timer.
    /// Agents flagged for the hospital keep their Isolated state until the
    /// world admits them.
    pub fn step(
        &mut self,
        agents: &mut Population,
        health_count: &mut HealthCount,
        rng: &mut impl Rng,
        pfs: &ParamsForStep,
    ) {
        let mut departures: Vec<(usize, Outcome)> = Vec::new();
        for (pos, &id) in self.isolated.iter().enumerate() {
            let agent = agents.agent_mut(id);
            if random::hit(rng, pfs.rp.needs_hospital.at(agent.age_group())) {
                departures.push((pos, Outcome::Hospital));
                continue;
            }
            if agent.recovery_step(pfs) {
                departures.push((pos, Outcome::Recovered));
            }
        }

        for (pos, outcome) in departures.into_iter().rev() {
            let id = self.isolated.swap_remove(pos);
            match outcome {
                Outcome::Hospital => self.newly_hospitalized.push(id),
                Outcome::Recovered => {
                    let agent = agents.agent_mut(id);
                    agent.set_health(HealthType::Recovered);
                    health_count
                        .apply_difference(HealthDiff::new(HealthType::Isolated, HealthType::Recovered));
                    self.newly_recovered.push(id);
                }
            }
        }
    }
}

impl Default for Isolation {
    fn default() -> Self {
        Self::new()
    }
}
