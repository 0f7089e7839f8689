//! NetrSim - turn-based peace vs. chaos negotiation simulator

pub mod core;
pub mod llm;
pub mod simulation;
