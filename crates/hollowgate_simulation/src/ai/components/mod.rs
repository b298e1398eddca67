//! AI components

pub mod fsm;
pub mod hopper;
pub mod phase;


// Re-export all components
pub use fsm::*;
pub use hopper::*;
pub use phase::*;
