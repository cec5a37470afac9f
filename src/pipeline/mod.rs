pub mod harvest;
pub mod walk;

pub use harvest::{Harvest, HarvestConfig, HarvestSummary};
