// State management module.
// Holds the availability gate that decides whether the display shows anything.

pub mod gate;

pub use gate::{AvailabilityState, Gate, TICK_INTERVAL, spawn_ticker};
