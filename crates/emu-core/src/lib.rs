//! Core traits and types for the emulator crates.
//!
//! The CPU executes against the [`Bus`] trait; machines implement it and
//! route each address to the right device. Timing arithmetic is expressed
//! in [`Ticks`] of a [`MasterClock`].

mod bus;
mod clock;
mod ticks;

pub use bus::{Bus, SimpleBus};
pub use clock::MasterClock;
pub use ticks::Ticks;
