//! # Island Rules
//!
//! The world model of the island life-sim - identifiers, character records,
//! relationship metrics, inventory, equipment, built structures, flags and the
//! clock. This crate holds state and simple mutations only; every decision
//! about schedules, events and rival progression lives in `island_core`, which
//! reads the world exclusively through the [`WorldView`] trait.

pub mod entities;
pub mod mechanics;
pub mod world_state;

pub use entities::*;
pub use mechanics::*;
pub use world_state::*;
