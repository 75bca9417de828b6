use serde::Deserialize;
use thiserror::Error;

use crate::world::commons::AgeGroup;

/// One demographic bucket: how many agents of a given five-year age bin
/// the world starts with.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct DemographicRecord {
    pub age_group: AgeGroup,
    pub count: u32,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BuildError {
    #[error("demographic records sum to zero agents")]
    EmptyPopulation,
}
