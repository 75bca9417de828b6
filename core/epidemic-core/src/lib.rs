pub mod population;
pub mod stat;
mod util;
pub mod world;
