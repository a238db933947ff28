//! Simulation driver, reheat scheduling and frame cadence.

mod driver;
mod frame;
mod reheat;

pub use driver::{Simulation, SimulationState, TickOutcome};
pub use frame::{FrameSink, FrameThrottle, NodeFrame};
pub use reheat::{ReheatPoll, ReheatScheduler, ReheatToken};
