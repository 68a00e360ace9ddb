// Availability gate for display output.
// Decides whether anything is shown, by manual override or by local time of day.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{Local, Timelike};
use serde::Serialize;
use tokio::task::JoinHandle;

/// First hour (local time) the display is on in auto mode.
pub const ENABLED_FROM_HOUR: u32 = 8;
/// First hour (local time) the display is off in auto mode.
pub const DISABLED_FROM_HOUR: u32 = 22;
/// How often the auto-mode schedule is re-evaluated.
pub const TICK_INTERVAL: Duration = Duration::from_secs(60);

/// Whether auto mode would show output at `hour` (0-23).
pub fn compute_auto_enabled(hour: u32) -> bool {
    (ENABLED_FROM_HOUR..DISABLED_FROM_HOUR).contains(&hour)
}

/// Visibility flags shared between the ticker and request handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AvailabilityState {
    /// Whether output is currently shown.
    pub enabled: bool,
    /// Whether the ticker may overwrite `enabled`.
    pub auto_mode: bool,
}

impl Default for AvailabilityState {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_mode: false,
        }
    }
}

/// Thread-safe owner of the [`AvailabilityState`].
#[derive(Debug, Default)]
pub struct Gate {
    state: Mutex<AvailabilityState>,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a gate with auto mode already on. `enabled` stays true until the first tick.
    pub fn with_auto_mode() -> Self {
        Self {
            state: Mutex::new(AvailabilityState {
                enabled: true,
                auto_mode: true,
            }),
        }
    }

    // The state is two plain flags, so a poisoned lock still holds usable data.
    fn lock(&self) -> MutexGuard<'_, AvailabilityState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Copy of the current flags.
    pub fn snapshot(&self) -> AvailabilityState {
        *self.lock()
    }

    /// Whether output should be shown right now.
    pub fn is_enabled(&self) -> bool {
        self.lock().enabled
    }

    /// Re-evaluate the schedule against the local clock.
    pub fn tick(&self) {
        self.tick_at_hour(Local::now().hour());
    }

    /// Re-evaluate the schedule for a given local hour. No-op outside auto mode.
    pub fn tick_at_hour(&self, hour: u32) {
        let mut state = self.lock();
        if !state.auto_mode {
            return;
        }

        let enabled = compute_auto_enabled(hour);
        if state.enabled != enabled {
            tracing::info!(hour, enabled, "auto mode toggled display");
        }
        state.enabled = enabled;
    }

    /// Manual override. Holds until the next tick when auto mode is on.
    pub fn set_enabled(&self, enabled: bool) -> AvailabilityState {
        let mut state = self.lock();
        state.enabled = enabled;
        *state
    }

    /// Turn the schedule on or off.
    ///
    /// Turning it on waits for the next tick. Turning it off re-enables output
    /// so the display cannot be left dark with nothing scheduled to wake it.
    pub fn set_auto_mode(&self, auto_mode: bool) -> AvailabilityState {
        let mut state = self.lock();
        state.auto_mode = auto_mode;
        if !auto_mode {
            state.enabled = true;
        }
        *state
    }
}

/// Spawn the periodic schedule evaluation. The first tick fires immediately.
pub fn spawn_ticker(gate: std::sync::Arc<Gate>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            gate.tick();
        }
    })
}
