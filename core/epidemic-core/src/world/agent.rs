pub(super) mod hospital;
pub(super) mod isolation;

use tracing::warn;

use super::commons::{AgeGroup, HealthType, ParamsForStep};

/// Stable handle into the agent arena. Locations and compartments hold
/// these, never references.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct AgentId(usize);

impl AgentId {
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One simulated individual. Created once at population build, never
/// destroyed; terminal states remain in the arena.
#[derive(Debug)]
pub struct Agent {
    id: AgentId,
    age_group: AgeGroup,
    health: HealthType,
    days_to_onset: f64,
    days_to_recover: f64,
}

impl Agent {
    fn new(id: AgentId, age_group: AgeGroup) -> Self {
        Self {
            id,
            age_group,
            health: HealthType::Susceptible,
            days_to_onset: 0.0,
            days_to_recover: 0.0,
        }
    }

    #[inline]
    pub fn id(&self) -> AgentId {
        self.id
    }

    #[inline]
    pub fn age_group(&self) -> AgeGroup {
        self.age_group
    }

    #[inline]
    pub fn health(&self) -> HealthType {
        self.health
    }

    /// Susceptible → Incubating, with timers from the age tables.
    pub(crate) fn expose(&mut self, pfs: &ParamsForStep) {
        self.health = HealthType::Incubating;
        self.days_to_onset = pfs.rp.incubation_time.at(self.age_group);
        self.days_to_recover = pfs.rp.recovery_time.at(self.age_group);
    }

    /// Patient-zero seeding skips incubation.
    pub(crate) fn seed_infected(&mut self, pfs: &ParamsForStep) {
        self.health = HealthType::Infected;
        self.days_to_onset = 0.0;
        self.days_to_recover = pfs.rp.recovery_time.at(self.age_group);
    }

    /// Decrements the incubation timer by one step; on expiry the agent
    /// turns Infected and the call returns true.
    pub(crate) fn incubation_step(&mut self, pfs: &ParamsForStep) -> bool {
        self.days_to_onset -= pfs.days_per_step();
        if self.days_to_onset <= 0.0 {
            self.health = HealthType::Infected;
            true
        } else {
            false
        }
    }

    /// Decrements the recovery timer by one step; true on expiry.
    pub(crate) fn recovery_step(&mut self, pfs: &ParamsForStep) -> bool {
        self.days_to_recover -= pfs.days_per_step();
        self.days_to_recover <= 0.0
    }

    pub(crate) fn enter_hospital(&mut self, pfs: &ParamsForStep) {
        self.health = HealthType::Hospitalized;
        self.days_to_recover = pfs.rp.recovery_time.at(self.age_group);
    }

    /// ICU escalation restarts the clinical course.
    pub(crate) fn enter_icu(&mut self, pfs: &ParamsForStep) {
        self.health = HealthType::Icu;
        self.days_to_recover = pfs.rp.recovery_time.at(self.age_group);
    }

    pub(crate) fn set_health(&mut self, health: HealthType) {
        self.health = health;
    }
}

/// Arena of all agents, addressed by [`AgentId`].
#[derive(Default, Debug)]
pub struct Population(Vec<Agent>);

impl Population {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self(Vec::with_capacity(n))
    }

    pub(crate) fn push_new(&mut self, age_group: AgeGroup) -> AgentId {
        let id = AgentId(self.0.len());
        self.0.push(Agent::new(id, age_group));
        id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Bounds-checked lookup; invalid indices are reported and yield None.
    pub fn get(&self, index: usize) -> Option<&Agent> {
        if index >= self.0.len() {
            warn!(index, len = self.0.len(), "invalid agent index");
            return None;
        }
        Some(&self.0[index])
    }

    #[inline]
    pub(crate) fn agent(&self, id: AgentId) -> &Agent {
        &self.0[id.0]
    }

    #[inline]
    pub(crate) fn agent_mut(&mut self, id: AgentId) -> &mut Agent {
        &mut self.0[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.0.iter()
    }
}
