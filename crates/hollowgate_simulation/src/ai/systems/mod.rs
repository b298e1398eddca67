//! AI systems

pub mod fsm;
pub mod hopper;
pub mod phase;

// Re-export all systems
pub use fsm::*;
pub use hopper::*;
pub use phase::*;
