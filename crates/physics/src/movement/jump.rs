//! Edge-triggered jump input.
//!
//! A jump starts only on the rising edge of the jump key (not-held to held),
//! and only while grounded with a fully recharged jump counter. Holding the
//! key across ticks never retriggers.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use super::state::MovementState;

/// Jump key edge detector.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Encode, Decode)]
pub struct JumpTrigger {
    /// Previous tick's jump key state.
    prev_pressed: bool,
}

impl JumpTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Poll the jump key for this tick, arming the airborne flag on a valid
    /// rising edge. Pure function of the key edge and the movement state.
    pub fn poll(&mut self, pressed: bool, state: &mut MovementState) {
        if !state.airborne
            && pressed
            && !self.prev_pressed
            && state.jump_counter == state.jump_power
        {
            state.airborne = true;
        }

        self.prev_pressed = pressed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rising_edge_starts_jump() {
        let mut trigger = JumpTrigger::new();
        let mut state = MovementState::new(4, 14);

        trigger.poll(true, &mut state);
        assert!(state.airborne);
    }

    #[test]
    fn holding_does_not_retrigger() {
        let mut trigger = JumpTrigger::new();
        let mut state = MovementState::new(4, 14);

        trigger.poll(true, &mut state);
        assert!(state.airborne);

        // Simulate landing while the key is still held.
        state.airborne = false;
        for _ in 0..10 {
            trigger.poll(true, &mut state);
            assert!(!state.airborne);
        }
    }

    #[test]
    fn retrigger_requires_full_recharge() {
        let mut trigger = JumpTrigger::new();
        let mut state = MovementState::new(4, 14);

        trigger.poll(true, &mut state);
        state.airborne = false;
        state.jump_counter = 1; // expired sentinel, not yet recharged
        trigger.poll(false, &mut state);

        trigger.poll(true, &mut state);
        assert!(!state.airborne);

        // Recharged: the next rising edge triggers.
        state.jump_counter = state.jump_power;
        trigger.poll(false, &mut state);
        trigger.poll(true, &mut state);
        assert!(state.airborne);
    }

    #[test]
    fn no_trigger_while_airborne() {
        let mut trigger = JumpTrigger::new();
        let mut state = MovementState::new(4, 14);
        state.airborne = true;
        state.jump_counter = state.jump_power;

        trigger.poll(true, &mut state);
        state.airborne = false;

        // The key is still held from mid-air; landing must not auto-jump.
        trigger.poll(true, &mut state);
        assert!(!state.airborne);
    }
}
