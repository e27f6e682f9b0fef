//! Mode-scoped input registration
//!
//! A mode registers for input when it is entered and receives a
//! [`ControlScope`]. Flags written through the scope are visible to the
//! simulation only while that scope is alive and current, so leaving a mode
//! (on any path) can't leave a key stuck down.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::debug;

use super::types::GameMode;
use super::vehicle::ControlFlags;

#[derive(Debug, Default)]
struct RegistryState {
    active: Option<(u64, GameMode)>,
    flags: ControlFlags,
    next_generation: u64,
}

/// Shared input registry. Cloning yields another handle to the same registry.
#[derive(Debug, Clone, Default)]
pub struct ControlRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl ControlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // Plain data, a panic mid-update can't leave it inconsistent
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take over input for `mode`. Any previous scope stops having effect.
    pub fn register(&self, mode: GameMode) -> ControlScope {
        let mut state = self.lock();
        state.next_generation += 1;
        let generation = state.next_generation;
        if let Some((_, previous)) = state.active.replace((generation, mode)) {
            debug!("Controls of {} superseded by {}", previous.label(), mode.label());
        }
        state.flags = ControlFlags::NONE;
        ControlScope {
            registry: self.clone(),
            generation,
            mode,
        }
    }

    /// Flags of the current scope, or all released when nothing is registered
    pub fn flags(&self) -> ControlFlags {
        let state = self.lock();
        match state.active {
            Some(_) => state.flags,
            None => ControlFlags::NONE,
        }
    }

    pub fn active_mode(&self) -> Option<GameMode> {
        self.lock().active.map(|(_, mode)| mode)
    }
}

/// Registration guard. Dropping it deregisters the mode's controls.
#[derive(Debug)]
pub struct ControlScope {
    registry: ControlRegistry,
    generation: u64,
    mode: GameMode,
}

impl ControlScope {
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Whether this scope still owns the registry
    pub fn is_current(&self) -> bool {
        matches!(self.registry.lock().active, Some((g, _)) if g == self.generation)
    }

    /// Publish this frame's flags. Ignored once the scope was superseded.
    pub fn set_flags(&self, flags: ControlFlags) -> bool {
        let mut state = self.registry.lock();
        match state.active {
            Some((g, _)) if g == self.generation => {
                state.flags = flags;
                true
            }
            _ => false,
        }
    }
}

impl Drop for ControlScope {
    fn drop(&mut self) {
        let mut state = self.registry.lock();
        if matches!(state.active, Some((g, _)) if g == self.generation) {
            state.active = None;
            state.flags = ControlFlags::NONE;
            debug!("Controls of {} released", self.mode.label());
        }
    }
}
