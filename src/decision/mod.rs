//! Decision pipeline: Monte Carlo uncertainty propagation and the judge.

mod judge;
mod monte_carlo;
pub mod safety;

pub use judge::Judge;
pub use monte_carlo::{MonteCarloEngine, MonteCarloError, MonteCarloSummary};
