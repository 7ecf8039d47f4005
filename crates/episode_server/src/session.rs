use std::sync::{Mutex, PoisonError};

use episode_core::{update, AppState, AppViewModel, Effect, Msg};

use crate::effects::EffectRunner;

/// The harvest state machine shared between HTTP handlers and the event pump.
pub struct HarvestSession {
    state: Mutex<AppState>,
    runner: EffectRunner,
}

impl HarvestSession {
    pub fn new(runner: EffectRunner) -> Self {
        Self {
            state: Mutex::new(AppState::new()),
            runner,
        }
    }

    /// Applies one message and runs the effects it produced, which are
    /// also returned to the caller.
    pub fn dispatch(&self, msg: Msg) -> Vec<Effect> {
        let effects = {
            let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            let state = std::mem::take(&mut *guard);
            let (state, effects) = update(state, msg);
            *guard = state;
            effects
        };
        self.runner.enqueue(&effects);
        effects
    }

    pub fn view(&self) -> AppViewModel {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .view()
    }
}
