// Storage module for durable local state.
// Persists the display text across restarts.

pub mod display;
pub mod paths;

pub use display::DisplayStore;
