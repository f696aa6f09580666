//! Simulation harness: environment, range sensor, and tick driver.
//!
//! These are the external collaborators of the SLAM core — the world the
//! agent moves through, the sensor that observes it, and the driver that
//! owns the ground truth and calls the core components in order. The core
//! itself never touches the environment; it only ever sees scans and
//! displacement deltas.

mod driver;
mod environment;
mod sensor;

pub use driver::{MapReference, RunSummary, SimConfig, SimulationDriver, TickSummary};
pub use environment::Environment;
pub use sensor::{RaySensor, SensorConfig};
