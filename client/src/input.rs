//! Keyboard sampling and input sequencing.

use macroquad::prelude::*;
use shared::{Controls, InputCommand};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Minimum spacing between transmitted inputs while nothing changes.
const SEND_INTERVAL: Duration = Duration::from_millis(16);

/// Decides when a sampled control state becomes a timestamped, transmitted
/// input: on every change, and otherwise on a fixed keep-alive cadence so the
/// server's liveness tracking keeps seeing us.
pub struct InputManager {
    current_controls: Controls,
    last_input_sent: Instant,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            current_controls: Controls::default(),
            last_input_sent: Instant::now(),
        }
    }

    /// Reads the movement keys (WASD and arrows).
    pub fn sample() -> Controls {
        Controls {
            forward: is_key_down(KeyCode::W) || is_key_down(KeyCode::Up),
            backward: is_key_down(KeyCode::S) || is_key_down(KeyCode::Down),
            left: is_key_down(KeyCode::A) || is_key_down(KeyCode::Left),
            right: is_key_down(KeyCode::D) || is_key_down(KeyCode::Right),
        }
    }

    /// Turns the sampled controls into a command when it is time to send
    /// one. The render loop calls this every frame; the returned commands
    /// come out at the network cadence, not the frame rate.
    pub fn update(&mut self, controls: Controls) -> Option<InputCommand> {
        let changed = controls != self.current_controls;
        let time_to_send = self.last_input_sent.elapsed() >= SEND_INTERVAL;

        if changed || time_to_send {
            self.current_controls = controls;
            self.last_input_sent = Instant::now();
            return Some(InputCommand {
                controls,
                ts: Self::get_timestamp(),
            });
        }

        None
    }

    fn get_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::from_secs(0))
            .as_millis() as u64
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_triggers_send() {
        let mut manager = InputManager::new();

        let held = Controls {
            forward: true,
            ..Controls::default()
        };
        let command = manager.update(held);
        assert!(command.is_some());
        assert!(command.unwrap().controls.forward);
    }

    #[test]
    fn test_unchanged_controls_wait_for_cadence() {
        let mut manager = InputManager::new();
        let idle = Controls::default();

        // unchanged state right after construction: nothing to send yet
        assert!(manager.update(idle).is_none());

        // ... until the keep-alive cadence elapses
        manager.last_input_sent = Instant::now() - SEND_INTERVAL * 2;
        assert!(manager.update(idle).is_some());
    }

    #[test]
    fn test_release_is_transmitted() {
        let mut manager = InputManager::new();
        let held = Controls {
            right: true,
            ..Controls::default()
        };
        let _ = manager.update(held);

        // key released: the all-false state must go out so replay agrees
        let command = manager.update(Controls::default());
        assert!(command.is_some());
        assert!(!command.unwrap().controls.any());
    }

    #[test]
    fn test_timestamps_are_monotonic() {
        let a = InputManager::get_timestamp();
        std::thread::sleep(Duration::from_millis(2));
        let b = InputManager::get_timestamp();
        assert!(b > a);
    }
}
