//! Authoritative world state and the per-tick input drain.

use crate::session::SessionRegistry;
use log::info;
use shared::{resolve, PlayerSnapshot, Vec2, WorldConfig};
use std::collections::HashMap;
use std::sync::Arc;

/// Server-side state of one player. Mutated only by the tick drain.
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub position: Vec2,
    pub rotation: f32,
    /// Timestamp of the last applied input; clients reconcile against this.
    pub ts: u64,
}

impl PlayerState {
    pub fn spawn() -> Self {
        Self {
            position: Vec2::default(),
            rotation: 0.0,
            ts: 0,
        }
    }
}

/// The canonical simulation: every connected player's pose, advanced by
/// replaying buffered inputs through the shared movement resolver.
pub struct Simulation {
    world: Arc<WorldConfig>,
    players: HashMap<String, PlayerState>,
}

impl Simulation {
    pub fn new(world: WorldConfig) -> Self {
        Self {
            world: Arc::new(world),
            players: HashMap::new(),
        }
    }

    pub fn world(&self) -> &Arc<WorldConfig> {
        &self.world
    }

    /// Creates a fresh player at the origin.
    pub fn add_player(&mut self, user_id: &str) {
        info!("Spawned player {} at origin", user_id);
        self.players.insert(user_id.to_string(), PlayerState::spawn());
    }

    pub fn remove_player(&mut self, user_id: &str) {
        if self.players.remove(user_id).is_some() {
            info!("Removed player {}", user_id);
        }
    }

    pub fn player(&self, user_id: &str) -> Option<&PlayerState> {
        self.players.get(user_id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// One tick: drains every session's input queue completely, in FIFO
    /// order, stepping that player through the resolver once per input. A
    /// player submitting several inputs between ticks has all of them
    /// replayed, never coalesced. Inputs for identities without a player are
    /// discarded.
    pub fn advance(&mut self, sessions: &mut SessionRegistry, dt: f32) {
        for session in sessions.sessions_mut() {
            while let Some(command) = session.moves.pop_front() {
                let Some(player) = self.players.get_mut(&session.user_id) else {
                    continue;
                };

                let (position, rotation) = resolve(
                    player.position,
                    player.rotation,
                    &command.controls,
                    self.world.player_speed,
                    dt,
                    &self.world,
                );

                player.position = position;
                player.rotation = rotation;
                player.ts = command.ts;
            }
        }
    }

    /// The full per-player state map broadcast after every tick.
    pub fn snapshot(&self) -> HashMap<String, PlayerSnapshot> {
        self.players
            .iter()
            .map(|(user_id, player)| {
                (
                    user_id.clone(),
                    PlayerSnapshot {
                        position: player.position,
                        rotation: player.rotation,
                        ts: player.ts,
                    },
                )
            })
            .collect()
    }
}
