//! Post-processing for off-lattice granular door simulations: decodes
//! the simulator's JSON artifacts, estimates windowed outflow rates and
//! fits the aperture rate law.

pub mod error;
pub mod fit;
pub mod flow;
pub mod models;
pub mod plot;
pub mod stats;
