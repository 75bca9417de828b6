use rand::Rng;

use super::{
    agent::{AgentId, Population},
    commons::{ParamsForStep, RuntimeParams, N_AGE_GROUPS, N_STRATEGIES},
};
use crate::{
    stat::{HealthCount, HealthDiff},
    util::{random, DrainWhere},
    world::commons::HealthType,
};

/// Caps each strategy's contribution so a fully unmitigated five-strategy
/// sum reaches exactly 1.
const STRATEGY_WEIGHT: f64 = 0.20;

/// Fraction of co-located people with effective contact.
const CONTACT_FRACTION: f64 = 0.30;

/// Per-location infection-probability calculator and Bernoulli trial
/// executor. Probabilities are recomputed from current occupancy every
/// tick and never persisted.
pub struct GeographicalRisk {
    chance_of_infection: [f64; N_AGE_GROUPS],
    /// Reserved multiplier for a future density-policy weighting.
    #[allow(dead_code)]
    social_distancing_severity: f64,
}

impl GeographicalRisk {
    pub fn new() -> Self {
        Self {
            chance_of_infection: [0.0; N_AGE_GROUPS],
            social_distancing_severity: 8.0,
        }
    }

    #[inline]
    pub fn chance_for(&self, age: usize) -> f64 {
        self.chance_of_infection[age]
    }

    /// Infected-to-susceptible crowding ratio. Defined as 0 when nobody
    /// susceptible or nobody infected is present. No upper clamp: large
    /// infected counts push the ratio past 1 on purpose.
    pub fn density_risk(n_susceptible: usize, n_infected: usize) -> f64 {
        if n_susceptible == 0 || n_infected == 0 {
            return 0.0;
        }
        n_infected as f64 / (n_susceptible as f64 * CONTACT_FRACTION)
    }

    /// Recomputes each age group's infection probability:
    /// `Σ_s (1 − adoption[g][s]) × (1 − effectiveness[s]) × 0.20`,
    /// scaled by the location's density risk.
    pub fn update_risk(&mut self, n_susceptible: usize, n_infected: usize, rp: &RuntimeParams) {
        let density = Self::density_risk(n_susceptible, n_infected);
        let effects = rp.mitigation_effect.values();
        let rows = rp.mitigation_adoption.rows();
        for (g, chance) in self.chance_of_infection.iter_mut().enumerate() {
            let adoption = &rows[g];
            let mut base = 0.0;
            for s in 0..N_STRATEGIES {
                base += (1.0 - adoption[s]) * (1.0 - effects[s]) * STRATEGY_WEIGHT;
            }
            // location-category contact weighting (rp.location_risk) is a
            // recognized gap, not yet folded in
            *chance = base * density;
        }
    }

    /// Runs the infection trial: every susceptible agent is visited exactly
    /// once; those whose draw lands under their age group's probability
    /// turn Incubating and move to the infected set. Returns the count.
    pub fn infect_people(
        &mut self,
        susceptible: &mut Vec<AgentId>,
        infected: &mut Vec<AgentId>,
        agents: &mut Population,
        health_count: &mut HealthCount,
        rng: &mut impl Rng,
        pfs: &ParamsForStep,
    ) -> u32 {
        self.update_risk(susceptible.len(), infected.len(), pfs.rp);

        let newly = susceptible.drain_where(|id| {
            let age = agents.agent(*id).age_group().index();
            random::hit(rng, self.chance_of_infection[age])
        });

        let n = newly.len() as u32;
        for id in newly {
            agents.agent_mut(id).expose(pfs);
            health_count.apply_difference(HealthDiff::new(
                HealthType::Susceptible,
                HealthType::Incubating,
            ));
            infected.push(id);
        }
        n
    }
}

impl Default for GeographicalRisk {
    fn default() -> Self {
        Self::new()
    }
}
