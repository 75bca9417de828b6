use rand::Rng;
use strum::IntoEnumIterator;
use tracing::warn;

use super::{
    agent::{hospital::Hospital, isolation::Isolation, AgentId, Population},
    commons::{DayOfWeek, HealthType, LocationKind, ParamsForStep, N_LOCATION_KINDS},
    risk::GeographicalRisk,
};
use crate::{
    stat::{HealthCount, HealthDiff},
    util::{random, DrainWhere},
};

/// A place of one category with its present agents, split by health side.
/// Incubating and Infected members share the infected set.
pub struct Location {
    kind: LocationKind,
    susceptible: Vec<AgentId>,
    infected: Vec<AgentId>,
    risk: GeographicalRisk,
}

impl Location {
    pub fn new(kind: LocationKind) -> Self {
        Self {
            kind,
            susceptible: Vec::new(),
            infected: Vec::new(),
            risk: GeographicalRisk::new(),
        }
    }

    #[inline]
    pub fn kind(&self) -> LocationKind {
        self.kind
    }

    #[inline]
    pub fn n_susceptible(&self) -> usize {
        self.susceptible.len()
    }

    #[inline]
    pub fn n_infected(&self) -> usize {
        self.infected.len()
    }

    fn add(&mut self, id: AgentId, health: HealthType) {
        match health {
            HealthType::Susceptible => self.susceptible.push(id),
            HealthType::Incubating | HealthType::Infected => self.infected.push(id),
            _ => warn!(?health, "agent cannot be placed at a location"),
        }
    }

    /// One location tick: infection trial, incubation expirations (elapsed
    /// agents self-isolate), then hospitalization draws for symptomatic
    /// members. Returns this location's newly-infected count.
    pub fn time_step(
        &mut self,
        agents: &mut Population,
        hospital: &mut Hospital,
        isolation: &mut Isolation,
        health_count: &mut HealthCount,
        rng: &mut impl Rng,
        pfs: &ParamsForStep,
    ) -> u32 {
        let newly = self.risk.infect_people(
            &mut self.susceptible,
            &mut self.infected,
            agents,
            health_count,
            rng,
            pfs,
        );

        let symptomatic = self.infected.drain_where(|id| {
            let agent = agents.agent_mut(*id);
            agent.health() == HealthType::Incubating && agent.incubation_step(pfs)
        });
        for id in symptomatic {
            health_count.apply_difference(HealthDiff::new(
                HealthType::Incubating,
                HealthType::Infected,
            ));
            isolation.add(id, agents, health_count);
        }

        let flagged = self.infected.drain_where(|id| {
            let agent = agents.agent(*id);
            agent.health() == HealthType::Infected
                && random::hit(rng, pfs.rp.needs_hospital.at(agent.age_group()))
        });
        for id in flagged {
            hospital.admit(id, agents, health_count, pfs);
        }

        newly
    }
}

/// The full location graph plus the per-agent movement schedule.
pub struct Transportation {
    locations: Vec<Location>,
    by_kind: [Vec<usize>; N_LOCATION_KINDS],
}

impl Transportation {
    pub fn new(locations_per_kind: usize) -> Self {
        let mut locations = Vec::with_capacity(locations_per_kind * N_LOCATION_KINDS);
        let mut by_kind: [Vec<usize>; N_LOCATION_KINDS] = Default::default();
        for kind in LocationKind::iter() {
            for _ in 0..locations_per_kind {
                by_kind[kind as usize].push(locations.len());
                locations.push(Location::new(kind));
            }
        }
        Self { locations, by_kind }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Bounds-checked lookup; invalid indices are reported and yield None.
    pub fn get_location(&self, index: usize) -> Option<&Location> {
        if index >= self.locations.len() {
            warn!(index, len = self.locations.len(), "invalid location index");
            return None;
        }
        Some(&self.locations[index])
    }

    /// Agents present at locations (confined agents excluded).
    pub fn total_present(&self) -> usize {
        self.locations
            .iter()
            .map(|l| l.n_susceptible() + l.n_infected())
            .sum()
    }

    pub(crate) fn place(&mut self, id: AgentId, health: HealthType, location: usize) {
        self.locations[location].add(id, health);
    }

    pub(crate) fn random_residential(&self, rng: &mut impl Rng) -> usize {
        let pool = &self.by_kind[LocationKind::Residential as usize];
        pool[rng.gen_range(0..pool.len())]
    }

    /// Fans the per-location tick across every location exactly once,
    /// aggregating the newly-infected count.
    pub fn location_sweep(
        &mut self,
        agents: &mut Population,
        hospital: &mut Hospital,
        isolation: &mut Isolation,
        health_count: &mut HealthCount,
        rng: &mut impl Rng,
        pfs: &ParamsForStep,
    ) -> u32 {
        let mut newly_infected = 0;
        for location in &mut self.locations {
            newly_infected +=
                location.time_step(agents, hospital, isolation, health_count, rng, pfs);
        }
        newly_infected
    }

    /// Relocates agents between locations according to the movement table.
    /// Decisions are collected per location first, then applied as batch
    /// removals and insertions, preserving each mover's health side.
    pub fn simulate_movement(
        &mut self,
        time_bucket: usize,
        day: DayOfWeek,
        agents: &Population,
        rng: &mut impl Rng,
        pfs: &ParamsForStep,
    ) {
        let day_kind = day.kind();
        let mut moved_susceptible: Vec<(AgentId, usize)> = Vec::new();
        let mut moved_infected: Vec<(AgentId, usize)> = Vec::new();

        for li in 0..self.locations.len() {
            let mut departures: Vec<(usize, usize)> = Vec::new();
            for (pos, &id) in self.locations[li].susceptible.iter().enumerate() {
                if let Some(dest) = self.pick_destination(id, li, day_kind, time_bucket, agents, rng, pfs)
                {
                    departures.push((pos, dest));
                }
            }
            for (pos, dest) in departures.into_iter().rev() {
                let id = self.locations[li].susceptible.swap_remove(pos);
                moved_susceptible.push((id, dest));
            }

            let mut departures: Vec<(usize, usize)> = Vec::new();
            for (pos, &id) in self.locations[li].infected.iter().enumerate() {
                if let Some(dest) = self.pick_destination(id, li, day_kind, time_bucket, agents, rng, pfs)
                {
                    departures.push((pos, dest));
                }
            }
            for (pos, dest) in departures.into_iter().rev() {
                let id = self.locations[li].infected.swap_remove(pos);
                moved_infected.push((id, dest));
            }
        }

        for (id, dest) in moved_susceptible {
            self.locations[dest].susceptible.push(id);
        }
        for (id, dest) in moved_infected {
            self.locations[dest].infected.push(id);
        }
    }

    fn pick_destination(
        &self,
        id: AgentId,
        current: usize,
        day_kind: super::commons::DayKind,
        time_bucket: usize,
        agents: &Population,
        rng: &mut impl Rng,
        pfs: &ParamsForStep,
    ) -> Option<usize> {
        let age = agents.agent(id).age_group();
        let chances = pfs.rp.movement.chances(age, day_kind, time_bucket);
        let kind = random::pick_weighted(rng, chances)?;
        let pool = &self.by_kind[kind];
        if pool.is_empty() {
            return None;
        }
        let dest = pool[rng.gen_range(0..pool.len())];
        (dest != current).then_some(dest)
    }
}
