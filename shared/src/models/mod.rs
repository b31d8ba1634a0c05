//! Domain models for the soil assessment pipeline

mod assessment;
mod confidence;
mod features;
mod job;
mod location;
mod nutrient;
mod soil;
mod vegetation;
mod weather;

pub use assessment::*;
pub use confidence::*;
pub use features::*;
pub use job::*;
pub use location::*;
pub use nutrient::*;
pub use soil::*;
pub use vegetation::*;
pub use weather::*;
