mod loop_controller;
mod loop_state;
mod sim_clock;

pub use loop_controller::LoopController;
pub use loop_state::StepPolicy;

#[cfg(test)]
pub use loop_state::{LoopState, RunSummary, SimError, TickOutcome};
#[cfg(test)]
pub use sim_clock::SimulationClock;
