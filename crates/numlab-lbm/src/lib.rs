//! D2Q9 lattice Boltzmann solver for NumLab.
//!
//! BGK bulk dynamics, bounce-back obstacles and Zou/He velocity or
//! pressure boundaries, driven by a channel-flow-past-a-cylinder setup.

pub mod channel;
pub mod dynamics;
pub mod lattice;
pub mod simulation;
