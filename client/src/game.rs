//! Client-side prediction and reconciliation.
//!
//! The local avatar is advanced immediately on input so movement feels
//! instant, while every sent input is kept in a bounded history. When an
//! authoritative snapshot arrives, the inputs it has confirmed are discarded
//! and the rest, still in flight, are replayed from the server's state
//! through the same movement resolver the server runs. The
//! on-screen pose is then eased toward that replayed pose, or snapped to it
//! outright when the gap is too wide to smooth believably (world-wrap
//! teleports, gross desync).

use log::debug;
use shared::{resolve, Controls, InputCommand, PlayerSnapshot, Vec2, WorldConfig};
use std::collections::{HashMap, VecDeque};

/// Divergence (per axis) beyond which correction snaps instead of easing.
pub const SNAP_DISTANCE: f32 = 10.0;
/// Per-frame exponential correction factor toward the replayed pose.
pub const CORRECTION_LERP: f32 = 0.2;
/// Within this distance the correction locks in exactly, killing drift.
pub const LOCK_IN_EPSILON: f32 = 0.1;
/// Sent inputs kept for replay; the oldest fall off first.
pub const INPUT_HISTORY_CAP: usize = 30;
/// Per-frame smoothing for remote avatars (never predicted).
pub const REMOTE_LERP: f32 = 0.2;

/// A remote player's avatar, eased toward its authoritative pose.
#[derive(Debug, Clone)]
pub struct RemoteAvatar {
    pub displayed: Vec2,
    pub target: Vec2,
    pub rotation: f32,
    /// Still traveling toward the target; drives the run/idle visual.
    pub moving: bool,
}

/// All world state the client holds: the immutable world description, the
/// local player's authoritative anchor and on-screen pose, the in-flight
/// input history, and the remote avatars.
pub struct ClientWorld {
    world: WorldConfig,
    user_id: String,

    /// Last authoritative (position, rotation, ts) received for the local
    /// player. Replay starts here.
    anchor: PlayerSnapshot,
    /// The pose actually drawn, and followed by the camera.
    pub displayed_position: Vec2,
    pub displayed_rotation: f32,

    /// Inputs sent to the server and not yet confirmed by a snapshot,
    /// oldest first.
    pending_inputs: VecDeque<InputCommand>,

    pub remotes: HashMap<String, RemoteAvatar>,
}

impl ClientWorld {
    pub fn new(world: WorldConfig, user_id: String) -> Self {
        Self {
            world,
            user_id,
            anchor: PlayerSnapshot::at_origin(),
            displayed_position: Vec2::default(),
            displayed_rotation: 0.0,
            pending_inputs: VecDeque::new(),
            remotes: HashMap::new(),
        }
    }

    pub fn world(&self) -> &WorldConfig {
        &self.world
    }

    /// Ingests an authoritative snapshot: re-anchors the local player,
    /// discards confirmed inputs, and retargets remote avatars. Remote
    /// entries missing from the snapshot are removed immediately.
    pub fn apply_snapshot(&mut self, players: HashMap<String, PlayerSnapshot>) {
        if let Some(me) = players.get(&self.user_id) {
            self.anchor = me.clone();
            // keep only the moves the server has not yet processed
            let confirmed = self.anchor.ts;
            self.pending_inputs.retain(|input| input.ts > confirmed);
        }

        self.remotes.retain(|user_id, _| players.contains_key(user_id));

        for (user_id, snapshot) in players {
            if user_id == self.user_id {
                continue;
            }

            match self.remotes.get_mut(&user_id) {
                Some(remote) => {
                    remote.target = snapshot.position;
                    remote.rotation = snapshot.rotation;
                }
                None => {
                    // new avatars appear directly at their authoritative spot
                    self.remotes.insert(
                        user_id,
                        RemoteAvatar {
                            displayed: snapshot.position,
                            target: snapshot.position,
                            rotation: snapshot.rotation,
                            moving: false,
                        },
                    );
                }
            }
        }
    }

    /// Replays every in-flight input from the anchor through the shared
    /// resolver, producing the pose the server is expected to confirm.
    /// Public because "replay equals the server's tick" is a property the
    /// integration suite checks directly.
    pub fn replayed_pose(&self, dt: f32) -> (Vec2, f32) {
        let mut position = self.anchor.position;
        let mut rotation = self.anchor.rotation;

        for input in &self.pending_inputs {
            let (p, r) = resolve(
                position,
                rotation,
                &input.controls,
                self.world.player_speed,
                dt,
                &self.world,
            );
            position = p;
            rotation = r;
        }

        (position, rotation)
    }

    /// Per-frame correction of the on-screen pose toward the replayed pose.
    pub fn reconcile(&mut self, dt: f32) {
        let (replayed, rotation) = self.replayed_pose(dt);

        let dx = (self.displayed_position.x - replayed.x).abs();
        let dz = (self.displayed_position.z - replayed.z).abs();

        if dx > SNAP_DISTANCE || dz > SNAP_DISTANCE {
            // way off, e.g. the player wrapped to the opposite world edge;
            // easing across the whole world would look worse than a cut
            debug!("Snapping to replayed position ({:.1}, {:.1})", replayed.x, replayed.z);
            self.displayed_position = replayed;
        } else {
            self.displayed_position = self.displayed_position.lerp(&replayed, CORRECTION_LERP);

            // close enough: lock in to keep residual drift from accumulating
            if (self.displayed_position.x - replayed.x).abs() < LOCK_IN_EPSILON {
                self.displayed_position.x = replayed.x;
            }
            if (self.displayed_position.z - replayed.z).abs() < LOCK_IN_EPSILON {
                self.displayed_position.z = replayed.z;
            }
        }

        self.displayed_rotation = rotation;
    }

    /// Advances the on-screen pose immediately from live input. This is what
    /// makes the avatar respond with zero round-trip latency; the server
    /// will confirm (or correct) later.
    pub fn predict_local(&mut self, controls: &Controls, dt: f32) {
        let (position, rotation) = resolve(
            self.displayed_position,
            self.displayed_rotation,
            controls,
            self.world.player_speed,
            dt,
            &self.world,
        );
        self.displayed_position = position;
        self.displayed_rotation = rotation;
    }

    /// Records a transmitted input for later replay. Bounded: once the
    /// history is full the oldest entry is discarded.
    pub fn record_input(&mut self, command: InputCommand) {
        if self.pending_inputs.len() >= INPUT_HISTORY_CAP {
            self.pending_inputs.pop_front();
        }
        self.pending_inputs.push_back(command);
    }

    pub fn pending_input_count(&self) -> usize {
        self.pending_inputs.len()
    }

    /// Eases every remote avatar toward its authoritative pose. Remotes are
    /// never predicted; they only ever chase the latest snapshot.
    pub fn update_remotes(&mut self) {
        for remote in self.remotes.values_mut() {
            remote.displayed = remote.displayed.lerp(&remote.target, REMOTE_LERP);

            if (remote.displayed.x - remote.target.x).abs() < LOCK_IN_EPSILON {
                remote.displayed.x = remote.target.x;
            }
            if (remote.displayed.z - remote.target.z).abs() < LOCK_IN_EPSILON {
                remote.displayed.z = remote.target.z;
            }

            remote.moving = remote.displayed != remote.target;
        }
    }
}
