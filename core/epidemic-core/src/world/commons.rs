use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter};
use thiserror::Error;

pub const N_AGE_GROUPS: usize = 18;
pub const N_STRATEGIES: usize = 5;
pub const N_TIME_BUCKETS: usize = 6;
pub const N_DAY_KINDS: usize = 2;

/// Sentinel returned by table getters for an out-of-range index.
pub const OUT_OF_RANGE: f64 = -1.0;

/// Health state of an agent. Exactly one at a time; the same enumeration
/// keys the per-tick health counters.
#[derive(EnumCount, EnumIter, Display, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum HealthType {
    Susceptible,
    Incubating,
    Infected,
    Isolated,
    Hospitalized,
    Icu,
    Recovered,
    Deceased,
}

#[derive(EnumCount, EnumIter, Display, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum LocationKind {
    Residential,
    Workplace,
    School,
    Retail,
    Transit,
    Recreation,
    Healthcare,
    Entertainment,
    Worship,
}

pub const N_LOCATION_KINDS: usize = <LocationKind as EnumCount>::COUNT;

/// Five-year age bin, 0-4 through 85+.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct AgeGroup(usize);

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("age group {0} is out of range (0..{N_AGE_GROUPS})")]
pub struct InvalidAgeGroup(pub usize);

impl AgeGroup {
    pub fn new(bin: usize) -> Option<Self> {
        (bin < N_AGE_GROUPS).then_some(Self(bin))
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

impl TryFrom<usize> for AgeGroup {
    type Error = InvalidAgeGroup;

    fn try_from(bin: usize) -> Result<Self, Self::Error> {
        Self::new(bin).ok_or(InvalidAgeGroup(bin))
    }
}

impl From<AgeGroup> for usize {
    fn from(g: AgeGroup) -> usize {
        g.0
    }
}

#[derive(Display, Clone, Copy, PartialEq, Eq, Debug)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub fn next(self) -> Self {
        match self {
            Self::Monday => Self::Tuesday,
            Self::Tuesday => Self::Wednesday,
            Self::Wednesday => Self::Thursday,
            Self::Thursday => Self::Friday,
            Self::Friday => Self::Saturday,
            Self::Saturday => Self::Sunday,
            Self::Sunday => Self::Monday,
        }
    }

    pub fn kind(self) -> DayKind {
        match self {
            Self::Saturday | Self::Sunday => DayKind::Weekend,
            _ => DayKind::Weekday,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DayKind {
    Weekday,
    Weekend,
}

impl DayKind {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::Weekday => 0,
            Self::Weekend => 1,
        }
    }
}

/// Simulation clock: hour-of-day wrapping at 24 with a cyclic day-of-week
/// increment.
#[derive(Clone, Debug)]
pub struct Clock {
    hour: u32,
    day: DayOfWeek,
    hours_elapsed: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            hour: 0,
            day: DayOfWeek::Monday,
            hours_elapsed: 0,
        }
    }

    pub fn advance(&mut self, step_hours: u32) {
        self.hours_elapsed += u64::from(step_hours);
        self.hour += step_hours;
        while self.hour >= 24 {
            self.hour -= 24;
            self.day = self.day.next();
        }
    }

    #[inline]
    pub fn hour(&self) -> u32 {
        self.hour
    }

    #[inline]
    pub fn day(&self) -> DayOfWeek {
        self.day
    }

    #[inline]
    pub fn hours_elapsed(&self) -> u64 {
        self.hours_elapsed
    }

    #[inline]
    pub fn days_elapsed(&self) -> f64 {
        self.hours_elapsed as f64 / 24.0
    }

    #[inline]
    pub fn time_bucket(&self) -> usize {
        self.hour as usize * N_TIME_BUCKETS / 24
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct WorldParams {
    step_hours: u32,
    locations_per_kind: usize,
    initially_infected: f64,
    _days_per_step: f64,
    _steps_per_day: f64,
}

impl WorldParams {
    pub fn new(step_hours: u32, locations_per_kind: usize, initially_infected: f64) -> Self {
        let step_hours = step_hours.clamp(1, 24);
        Self {
            step_hours,
            locations_per_kind: locations_per_kind.max(1),
            initially_infected: initially_infected.clamp(0.0, 1.0),
            _days_per_step: f64::from(step_hours) / 24.0,
            _steps_per_day: 24.0 / f64::from(step_hours),
        }
    }

    #[inline]
    pub fn step_hours(&self) -> u32 {
        self.step_hours
    }

    #[inline]
    pub fn days_per_step(&self) -> f64 {
        self._days_per_step
    }

    #[inline]
    pub fn steps_per_day(&self) -> f64 {
        self._steps_per_day
    }

    #[inline]
    pub fn locations_per_kind(&self) -> usize {
        self.locations_per_kind
    }

    #[inline]
    pub fn initially_infected(&self) -> f64 {
        self.initially_infected
    }
}

impl Default for WorldParams {
    fn default() -> Self {
        Self::new(4, 3, 0.0005)
    }
}

/// Mitigation adoption probability per age group and strategy.
///
/// All tables below share the fail-quiet policy: out-of-range or
/// out-of-bounds writes are silently ignored, out-of-range reads return
/// [`OUT_OF_RANGE`].
#[derive(Clone, Debug)]
pub struct MitigationAdoption([[f64; N_STRATEGIES]; N_AGE_GROUPS]);

impl MitigationAdoption {
    pub fn set(&mut self, age: usize, strategy: usize, value: f64) {
        if age >= N_AGE_GROUPS || strategy >= N_STRATEGIES {
            return;
        }
        if !(0.0..=1.0).contains(&value) {
            return;
        }
        self.0[age][strategy] = value;
    }

    pub fn get(&self, age: usize, strategy: usize) -> f64 {
        if age >= N_AGE_GROUPS || strategy >= N_STRATEGIES {
            return OUT_OF_RANGE;
        }
        self.0[age][strategy]
    }

    #[inline]
    pub(crate) fn rows(&self) -> &[[f64; N_STRATEGIES]; N_AGE_GROUPS] {
        &self.0
    }
}

impl Default for MitigationAdoption {
    fn default() -> Self {
        Self([[0.0; N_STRATEGIES]; N_AGE_GROUPS])
    }
}

/// Mitigation effectiveness per strategy.
#[derive(Clone, Debug)]
pub struct MitigationEffect([f64; N_STRATEGIES]);

impl MitigationEffect {
    pub fn set(&mut self, strategy: usize, value: f64) {
        if strategy >= N_STRATEGIES || !(0.0..=1.0).contains(&value) {
            return;
        }
        self.0[strategy] = value;
    }

    pub fn get(&self, strategy: usize) -> f64 {
        if strategy >= N_STRATEGIES {
            return OUT_OF_RANGE;
        }
        self.0[strategy]
    }

    #[inline]
    pub(crate) fn values(&self) -> &[f64; N_STRATEGIES] {
        &self.0
    }
}

impl Default for MitigationEffect {
    fn default() -> Self {
        Self([0.0; N_STRATEGIES])
    }
}

/// Risk weight per location category. Reserved input to the risk model;
/// the current density formula does not weight by category yet.
#[derive(Clone, Debug)]
pub struct LocationRisk([f64; N_LOCATION_KINDS]);

impl LocationRisk {
    pub fn set(&mut self, location: usize, value: f64) {
        if location >= N_LOCATION_KINDS || !(0.0..=1.0).contains(&value) {
            return;
        }
        self.0[location] = value;
    }

    pub fn get(&self, location: usize) -> f64 {
        if location >= N_LOCATION_KINDS {
            return OUT_OF_RANGE;
        }
        self.0[location]
    }
}

impl Default for LocationRisk {
    fn default() -> Self {
        Self([0.0; N_LOCATION_KINDS])
    }
}

/// Per-age-group scalar table with a validated value range.
#[derive(Clone, Debug)]
pub struct AgeTable {
    values: [f64; N_AGE_GROUPS],
    max: f64,
}

impl AgeTable {
    /// Probabilities, bounded to [0, 1].
    pub fn probabilities() -> Self {
        Self {
            values: [0.0; N_AGE_GROUPS],
            max: 1.0,
        }
    }

    /// Durations in days, bounded to [0, 127].
    pub fn days() -> Self {
        Self {
            values: [0.0; N_AGE_GROUPS],
            max: 127.0,
        }
    }

    pub fn set(&mut self, age: usize, value: f64) {
        if age >= N_AGE_GROUPS || !(0.0..=self.max).contains(&value) {
            return;
        }
        self.values[age] = value;
    }

    pub fn get(&self, age: usize) -> f64 {
        if age >= N_AGE_GROUPS {
            return OUT_OF_RANGE;
        }
        self.values[age]
    }

    #[inline]
    pub(crate) fn at(&self, age: AgeGroup) -> f64 {
        self.values[age.index()]
    }
}

/// Movement probability per (age group, day type, time bucket, destination
/// category).
#[derive(Clone, Debug)]
pub struct MovementTable(
    Box<[[[[f64; N_LOCATION_KINDS]; N_TIME_BUCKETS]; N_DAY_KINDS]; N_AGE_GROUPS]>,
);

impl MovementTable {
    pub fn set(&mut self, age: usize, day: usize, time: usize, location: usize, value: f64) {
        if age >= N_AGE_GROUPS
            || day >= N_DAY_KINDS
            || time >= N_TIME_BUCKETS
            || location >= N_LOCATION_KINDS
        {
            return;
        }
        if !(0.0..=1.0).contains(&value) {
            return;
        }
        self.0[age][day][time][location] = value;
    }

    pub fn get(&self, age: usize, day: usize, time: usize, location: usize) -> f64 {
        if age >= N_AGE_GROUPS
            || day >= N_DAY_KINDS
            || time >= N_TIME_BUCKETS
            || location >= N_LOCATION_KINDS
        {
            return OUT_OF_RANGE;
        }
        self.0[age][day][time][location]
    }

    #[inline]
    pub(crate) fn chances(
        &self,
        age: AgeGroup,
        day: DayKind,
        bucket: usize,
    ) -> &[f64; N_LOCATION_KINDS] {
        &self.0[age.index()][day.index()][bucket]
    }
}

impl Default for MovementTable {
    fn default() -> Self {
        Self(Box::new(
            [[[[0.0; N_LOCATION_KINDS]; N_TIME_BUCKETS]; N_DAY_KINDS]; N_AGE_GROUPS],
        ))
    }
}

/// Mutable behavior/rate tables, constructed once and passed by reference
/// into the subsystems that need them.
#[derive(Clone, Debug)]
pub struct RuntimeParams {
    pub mitigation_adoption: MitigationAdoption,
    pub mitigation_effect: MitigationEffect,
    pub location_risk: LocationRisk,
    pub recovery_time: AgeTable,
    pub incubation_time: AgeTable,
    pub death_chance: AgeTable,
    pub icu_chance: AgeTable,
    pub needs_hospital: AgeTable,
    pub movement: MovementTable,
}

impl Default for RuntimeParams {
    fn default() -> Self {
        Self {
            mitigation_adoption: MitigationAdoption::default(),
            mitigation_effect: MitigationEffect::default(),
            location_risk: LocationRisk::default(),
            recovery_time: AgeTable::days(),
            incubation_time: AgeTable::days(),
            death_chance: AgeTable::probabilities(),
            icu_chance: AgeTable::probabilities(),
            needs_hospital: AgeTable::probabilities(),
            movement: MovementTable::default(),
        }
    }
}

pub struct ParamsForStep<'a> {
    pub wp: &'a WorldParams,
    pub rp: &'a RuntimeParams,
}

impl<'a> ParamsForStep<'a> {
    pub fn new(wp: &'a WorldParams, rp: &'a RuntimeParams) -> Self {
        Self { wp, rp }
    }

    #[inline]
    pub fn days_per_step(&self) -> f64 {
        self.wp.days_per_step()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_wraps_and_increments_day() {
        let mut clock = Clock::new();
        for _ in 0..5 {
            clock.advance(4);
        }
        // Monday 20:00 after five 4-hour ticks
        assert_eq!(clock.hour(), 20);
        assert_eq!(clock.day(), DayOfWeek::Monday);

        clock.advance(4);
        assert_eq!(clock.hour(), 0);
        assert_eq!(clock.day(), DayOfWeek::Tuesday);

        for _ in 0..6 {
            clock.advance(4);
        }
        assert_eq!(clock.hour(), 0);
        assert_eq!(clock.day(), DayOfWeek::Wednesday);
        assert_eq!(clock.hours_elapsed(), 48);
    }

    #[test]
    fn time_bucket_splits_day_into_six() {
        let mut clock = Clock::new();
        let mut buckets = Vec::new();
        for _ in 0..6 {
            buckets.push(clock.time_bucket());
            clock.advance(4);
        }
        assert_eq!(buckets, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(clock.time_bucket(), 0);
    }

    #[test]
    fn weekend_detection() {
        assert_eq!(DayOfWeek::Friday.kind(), DayKind::Weekday);
        assert_eq!(DayOfWeek::Saturday.kind(), DayKind::Weekend);
        assert_eq!(DayOfWeek::Sunday.kind(), DayKind::Weekend);
        assert_eq!(DayOfWeek::Sunday.next(), DayOfWeek::Monday);
    }

    #[test]
    fn adoption_table_round_trips_in_range() {
        let mut t = MitigationAdoption::default();
        for age in 0..N_AGE_GROUPS {
            for s in 0..N_STRATEGIES {
                let v = (age * N_STRATEGIES + s) as f64 / 100.0;
                t.set(age, s, v);
                assert_eq!(t.get(age, s), v);
            }
        }
    }

    #[test]
    fn adoption_table_rejects_out_of_range() {
        let mut t = MitigationAdoption::default();
        t.set(N_AGE_GROUPS, 0, 0.5);
        t.set(0, N_STRATEGIES, 0.5);
        t.set(0, 0, 1.5);
        t.set(0, 0, -0.1);
        assert_eq!(t.get(0, 0), 0.0);
        assert_eq!(t.get(N_AGE_GROUPS, 0), OUT_OF_RANGE);
        assert_eq!(t.get(0, N_STRATEGIES), OUT_OF_RANGE);
    }

    #[test]
    fn effect_and_location_risk_sentinels() {
        let mut e = MitigationEffect::default();
        e.set(2, 0.7);
        assert_eq!(e.get(2), 0.7);
        assert_eq!(e.get(N_STRATEGIES), OUT_OF_RANGE);

        let mut l = LocationRisk::default();
        l.set(8, 0.9);
        assert_eq!(l.get(8), 0.9);
        assert_eq!(l.get(N_LOCATION_KINDS), OUT_OF_RANGE);
    }

    #[test]
    fn age_table_bounds() {
        let mut days = AgeTable::days();
        days.set(3, 14.0);
        assert_eq!(days.get(3), 14.0);
        days.set(3, 128.0);
        assert_eq!(days.get(3), 14.0);
        assert_eq!(days.get(N_AGE_GROUPS), OUT_OF_RANGE);

        let mut p = AgeTable::probabilities();
        p.set(0, 2.0);
        assert_eq!(p.get(0), 0.0);
        p.set(0, 1.0);
        assert_eq!(p.get(0), 1.0);
    }

    #[test]
    fn movement_table_round_trips_and_sentinels() {
        let mut m = MovementTable::default();
        for age in 0..N_AGE_GROUPS {
            for day in 0..N_DAY_KINDS {
                for time in 0..N_TIME_BUCKETS {
                    for loc in 0..N_LOCATION_KINDS {
                        let v = ((age + day + time + loc) % 10) as f64 / 10.0;
                        m.set(age, day, time, loc, v);
                        assert_eq!(m.get(age, day, time, loc), v);
                    }
                }
            }
        }
        assert_eq!(m.get(N_AGE_GROUPS, 0, 0, 0), OUT_OF_RANGE);
        assert_eq!(m.get(0, N_DAY_KINDS, 0, 0), OUT_OF_RANGE);
        assert_eq!(m.get(0, 0, N_TIME_BUCKETS, 0), OUT_OF_RANGE);
        assert_eq!(m.get(0, 0, 0, N_LOCATION_KINDS), OUT_OF_RANGE);
        m.set(0, 0, 0, N_LOCATION_KINDS, 0.5);
        assert_eq!(m.get(0, 0, 0, 0), 0.0);
    }

    #[test]
    fn age_group_validation() {
        assert!(AgeGroup::new(17).is_some());
        assert!(AgeGroup::new(18).is_none());
        assert_eq!(AgeGroup::try_from(18), Err(InvalidAgeGroup(18)));
    }
}
